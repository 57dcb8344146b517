// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use nom::branch::alt;
use nom::character::complete::char;
use nom::combinator::{map, opt};
use nom::error::{ContextError, ErrorKind, FromExternalError, ParseError};
use nom::multi::separated_list1;
use nom::sequence::separated_pair;
use nom::{IResult, Parser};
use nom_supreme::ParserExt;

use super::{BoundedRange, VersionFilter, VersionRange};
use crate::version::parsing::version;

/// Parse a single range.
///
/// Examples:
/// - `"5.0.0"` (exactly this version)
/// - `"5:"` (5 or newer)
/// - `":1.12"` (up to and including any 1.12 release)
/// - `"5.0:5.2"`
/// - `":"` (any version)
pub fn version_range<'a, E>(input: &'a str) -> IResult<&'a str, VersionRange, E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>
        + FromExternalError<&'a str, super::Error>
        + FromExternalError<&'a str, std::num::ParseIntError>,
{
    alt((bounded_range, map(version, VersionRange::Exact)))
        .context("version range")
        .parse(input)
}

/// Parse a range with at least a `:` separator.
///
/// Once the separator is found the range is committed, so an inverted
/// range is reported as a failure rather than retried as a single version.
fn bounded_range<'a, E>(input: &'a str) -> IResult<&'a str, VersionRange, E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>
        + FromExternalError<&'a str, super::Error>
        + FromExternalError<&'a str, std::num::ParseIntError>,
{
    let (rest, (lower, upper)) = separated_pair(opt(version), char(':'), opt(version))(input)?;
    match BoundedRange::new(lower, upper) {
        Ok(range) => Ok((rest, VersionRange::Bounded(range))),
        Err(err) => Err(nom::Err::Failure(
            <E as FromExternalError<&'a str, super::Error>>::from_external_error(
                input,
                ErrorKind::Verify,
                err,
            ),
        )),
    }
}

/// Parse a comma-separated union of version ranges.
///
/// Example: `"1.0,2.0:"`
pub fn version_filter<'a, E>(input: &'a str) -> IResult<&'a str, VersionFilter, E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>
        + FromExternalError<&'a str, super::Error>
        + FromExternalError<&'a str, std::num::ParseIntError>,
{
    map(separated_list1(char(','), version_range), |rules| {
        VersionFilter { rules }
    })(input)
}
