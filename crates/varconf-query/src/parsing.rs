// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use nom::branch::alt;
use nom::bytes::complete::take_while1;
use nom::character::complete::{char, multispace0, multispace1};
use nom::combinator::{cut, map, map_res, opt};
use nom::error::{ContextError, FromExternalError, ParseError};
use nom::multi::{many0, separated_list1};
use nom::sequence::{pair, preceded, separated_pair, tuple};
use nom::{IResult, Parser};
use nom_supreme::ParserExt;
use varconf_foundation::name::{is_valid_pkg_name_char, PkgName, VariantName};
use varconf_foundation::variant::VariantValue;
use varconf_foundation::version_range::parsing::version_filter;
use varconf_foundation::{name, version_range};

use crate::Condition;

/// The reserved key that compares against the scheduler of a spec
/// rather than one of its variants.
pub const SCHEDULERS_KEY: &str = "schedulers";

/// A single whitespace separated piece of a conjunction.
enum Token {
    /// Something that holds or not for the current scope
    Atom(Condition),
    /// Starts a package scope, along with the atoms attached
    /// directly to the package name (eg: `pmdk+ndctl`)
    Scope {
        name: PkgName,
        attached: Vec<Condition>,
    },
}

/// Parse a complete query.
///
/// Alternatives are separated by `|`, each alternative is a
/// whitespace separated conjunction of atoms.
pub fn condition<'a, E>(input: &'a str) -> IResult<&'a str, Condition, E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>
        + FromExternalError<&'a str, name::Error>
        + FromExternalError<&'a str, version_range::Error>
        + FromExternalError<&'a str, std::num::ParseIntError>,
{
    map(
        separated_list1(tuple((multispace0, char('|'), multispace0)), conjunction),
        Condition::any,
    )(input)
}

/// Parse a whitespace separated list of atoms and package scopes.
///
/// Atoms apply to the spec itself until the first package scope,
/// after which they apply to the most recently named package.
fn conjunction<'a, E>(input: &'a str) -> IResult<&'a str, Condition, E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>
        + FromExternalError<&'a str, name::Error>
        + FromExternalError<&'a str, version_range::Error>
        + FromExternalError<&'a str, std::num::ParseIntError>,
{
    map(separated_list1(multispace1, token), |tokens| {
        let mut own = Vec::new();
        let mut scopes: Vec<(PkgName, Vec<Condition>)> = Vec::new();
        for token in tokens {
            match token {
                Token::Atom(atom) => match scopes.last_mut() {
                    Some((_, conditions)) => conditions.push(atom),
                    None => own.push(atom),
                },
                Token::Scope { name, attached } => scopes.push((name, attached)),
            }
        }
        own.extend(scopes.into_iter().map(|(name, conditions)| {
            Condition::Package {
                name,
                condition: Box::new(Condition::all(conditions)),
            }
        }));
        Condition::all(own)
    })(input)
}

fn token<'a, E>(input: &'a str) -> IResult<&'a str, Token, E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>
        + FromExternalError<&'a str, name::Error>
        + FromExternalError<&'a str, version_range::Error>
        + FromExternalError<&'a str, std::num::ParseIntError>,
{
    alt((
        // a negated scope is closed immediately and never
        // collects the atoms that follow it
        map(
            preceded(
                char('!'),
                cut(alt((
                    atom,
                    map(scope, |(name, attached)| Condition::Package {
                        name,
                        condition: Box::new(Condition::all(attached)),
                    }),
                ))),
            ),
            |c| Token::Atom(Condition::Not(Box::new(c))),
        ),
        map(atom, Token::Atom),
        map(scope, |(name, attached)| Token::Scope { name, attached }),
    ))(input)
}

/// Parse a single self-contained atom.
pub fn atom<'a, E>(input: &'a str) -> IResult<&'a str, Condition, E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>
        + FromExternalError<&'a str, name::Error>
        + FromExternalError<&'a str, version_range::Error>
        + FromExternalError<&'a str, std::num::ParseIntError>,
{
    alt((
        enabled_variant,
        preceded(
            alt((char('-'), char('~'))),
            cut(map(variant_name, |name| Condition::VariantEq {
                name,
                value: VariantValue::Bool(false),
            })),
        ),
        version_condition,
        compiler_condition,
        key_value,
    ))(input)
}

/// Parse an atom that may be attached directly to a package name.
///
/// A leading `-` is not accepted here because it cannot be told
/// apart from a hyphen in the name, `~` must be used instead.
fn attached_atom<'a, E>(input: &'a str) -> IResult<&'a str, Condition, E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>
        + FromExternalError<&'a str, name::Error>
        + FromExternalError<&'a str, version_range::Error>
        + FromExternalError<&'a str, std::num::ParseIntError>,
{
    alt((
        enabled_variant,
        preceded(
            char('~'),
            cut(map(variant_name, |name| Condition::VariantEq {
                name,
                value: VariantValue::Bool(false),
            })),
        ),
        version_condition,
        compiler_condition,
    ))(input)
}

fn enabled_variant<'a, E>(input: &'a str) -> IResult<&'a str, Condition, E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>
        + FromExternalError<&'a str, name::Error>,
{
    preceded(
        char('+'),
        cut(map(variant_name, |name| Condition::VariantEq {
            name,
            value: VariantValue::Bool(true),
        })),
    )(input)
}

fn version_condition<'a, E>(input: &'a str) -> IResult<&'a str, Condition, E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>
        + FromExternalError<&'a str, version_range::Error>
        + FromExternalError<&'a str, std::num::ParseIntError>,
{
    preceded(
        char('@'),
        cut(map(version_filter, Condition::VersionIn).context("version range")),
    )(input)
}

fn compiler_condition<'a, E>(input: &'a str) -> IResult<&'a str, Condition, E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>
        + FromExternalError<&'a str, name::Error>
        + FromExternalError<&'a str, version_range::Error>
        + FromExternalError<&'a str, std::num::ParseIntError>,
{
    preceded(
        char('%'),
        cut(map(
            pair(
                package_name,
                opt(preceded(char('@'), cut(version_filter))),
            ),
            |(family, versions)| Condition::Compiler { family, versions },
        ))
        .context("compiler"),
    )(input)
}

fn key_value<'a, E>(input: &'a str) -> IResult<&'a str, Condition, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>,
{
    map(
        separated_pair(
            take_while1(is_query_name_char),
            char('='),
            cut(take_while1(|c: char| !c.is_whitespace() && c != '|')),
        ),
        |(key, value): (&str, &str)| {
            if key == SCHEDULERS_KEY {
                return Condition::SchedulerEq(value.to_owned());
            }
            Condition::VariantEq {
                name: VariantName::new_unchecked(key),
                value: VariantValue::Str(value.to_owned()),
            }
        },
    )(input)
}

/// Parse a package name with optional `^` marker and attached atoms.
fn scope<'a, E>(input: &'a str) -> IResult<&'a str, (PkgName, Vec<Condition>), E>
where
    E: ParseError<&'a str>
        + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>
        + FromExternalError<&'a str, name::Error>
        + FromExternalError<&'a str, version_range::Error>
        + FromExternalError<&'a str, std::num::ParseIntError>,
{
    alt((
        preceded(char('^'), cut(pair(package_name, many0(attached_atom)))),
        pair(package_name, many0(attached_atom)),
    ))
    .context("package")
    .parse(input)
}

fn variant_name<'a, E>(input: &'a str) -> IResult<&'a str, VariantName, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str>,
{
    map(take_while1(is_query_name_char), VariantName::new_unchecked)
        .context("variant name")
        .parse(input)
}

/// Characters accepted in the variant names of a query.
///
/// Wider than what a declaration allows, names are matched
/// case sensitively and an undeclared one is simply unsatisfied.
pub fn is_query_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn package_name<'a, E>(input: &'a str) -> IResult<&'a str, PkgName, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>
        + nom_supreme::context::ContextError<&'a str, &'static str> + FromExternalError<&'a str, name::Error>,
{
    map_res(
        take_while1(is_valid_pkg_name_char),
        |s: &str| -> name::Result<PkgName> { PkgName::new(s) },
    )
    .context("package name")
    .parse(input)
}
