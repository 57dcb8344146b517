// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use nom::branch::alt;
use nom::character::complete::{alpha1, digit1, one_of};
use nom::combinator::{map, map_res, opt, recognize};
use nom::error::{ContextError, FromExternalError, ParseError};
use nom::multi::many0;
use nom::sequence::pair;
use nom::IResult;
use nom_supreme::ParserExt;

use super::{Component, Version};

/// Parse a single numeric or alphabetic version component.
pub(crate) fn component<'a, E>(input: &'a str) -> IResult<&'a str, Component, E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>
        + FromExternalError<&'a str, std::num::ParseIntError>,
{
    alt((
        map_res(digit1, |n: &str| n.parse::<u64>().map(Component::Numeric)),
        map(alpha1, |s: &str| Component::Alpha(s.to_owned())),
    ))(input)
}

/// Parse a version string into a [`Version`].
///
/// Components are separated by `.`, `-` or `_`, or by a change
/// between digits and letters, so all of these are valid:
///
/// - `"1.12"`
/// - `"5.0.0rc1"`
/// - `"5.0.0rc12-peanuts"`
/// - `"master"`
pub fn version<'a, E>(input: &'a str) -> IResult<&'a str, Version, E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>
        + FromExternalError<&'a str, std::num::ParseIntError>,
{
    map(
        recognize(pair(
            component,
            many0(pair(opt(one_of(".-_")), component)),
        ))
        .context("version"),
        |text: &str| {
            // the recognized text was just validated by the same
            // component parser, so reparsing cannot fail
            let components = split_components(text);
            Version {
                text: text.to_owned(),
                components,
            }
        },
    )(input)
}

fn split_components(text: &str) -> Vec<Component> {
    let mut components = Vec::new();
    let mut current = String::new();
    let flush = |current: &mut String, components: &mut Vec<Component>| {
        if current.is_empty() {
            return;
        }
        let part = std::mem::take(current);
        match part.parse::<u64>() {
            Ok(n) => components.push(Component::Numeric(n)),
            Err(_) => components.push(Component::Alpha(part)),
        }
    };
    for c in text.chars() {
        if matches!(c, '.' | '-' | '_') {
            flush(&mut current, &mut components);
            continue;
        }
        if let Some(last) = current.chars().last() {
            if last.is_ascii_digit() != c.is_ascii_digit() {
                flush(&mut current, &mut components);
            }
        }
        current.push(c);
    }
    flush(&mut current, &mut components);
    components
}
