// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Write;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use varconf_foundation::compiler::COMPILER_VERSION_SEP;
use varconf_foundation::name::{PkgName, VariantName};
use varconf_foundation::spec::Queryable;
use varconf_foundation::variant::VariantValue;
use varconf_foundation::version_range::{Ranged, VersionFilter};
use varconf_foundation::Compatibility;

use crate::parsing::SCHEDULERS_KEY;
use crate::{Error, Result};

#[cfg(test)]
#[path = "./condition_test.rs"]
mod condition_test;

/// A parsed query which can be evaluated against any [`Queryable`].
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Condition {
    /// Holds for every spec, the result of parsing an empty query
    #[default]
    Always,
    /// The named variant holds exactly this value
    VariantEq {
        name: VariantName,
        value: VariantValue,
    },
    /// The version of the spec falls within the filter
    VersionIn(VersionFilter),
    /// The spec is built with a compiler of this family,
    /// optionally restricted to some versions of it
    Compiler {
        family: PkgName,
        versions: Option<VersionFilter>,
    },
    /// The scheduler requested for the spec has this name
    SchedulerEq(String),
    /// The inner condition holds for the named package, which is
    /// either the spec itself or one of its direct dependencies
    Package {
        name: PkgName,
        condition: Box<Condition>,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// Combine conditions that must all hold.
    pub fn all(mut conditions: Vec<Condition>) -> Self {
        match conditions.len() {
            0 => Condition::Always,
            1 => conditions.remove(0),
            _ => Condition::And(conditions),
        }
    }

    /// Combine conditions where any one of them holding is enough.
    pub fn any(mut conditions: Vec<Condition>) -> Self {
        match conditions.len() {
            0 => Condition::Always,
            1 => conditions.remove(0),
            _ => Condition::Or(conditions),
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Condition::Always)
    }

    /// Evaluate this condition against a spec.
    ///
    /// Variants that the spec does not carry never match, so both
    /// `+name` and `~name` are incompatible with a spec that lacks `name`.
    pub fn check<Q: Queryable + ?Sized>(&self, spec: &Q) -> Compatibility {
        match self {
            Condition::Always => Compatibility::Compatible,
            Condition::VariantEq { name, value } => match spec.variant(name) {
                None => Compatibility::incompatible(format!(
                    "{} has no value for variant '{name}'",
                    spec.name()
                )),
                Some(actual) if variant_values_match(actual, value) => Compatibility::Compatible,
                Some(actual) => Compatibility::incompatible(format!(
                    "{} has {name}={actual}, wanted {name}={value}",
                    spec.name()
                )),
            },
            Condition::VersionIn(filter) => match filter.is_applicable(spec.version()) {
                Compatibility::Compatible => Compatibility::Compatible,
                Compatibility::Incompatible(_) => Compatibility::incompatible(format!(
                    "{}@{} is not within @{filter}",
                    spec.name(),
                    spec.version()
                )),
            },
            Condition::Compiler { family, versions } => {
                let Some(compiler) = spec.compiler() else {
                    return Compatibility::incompatible(format!(
                        "{} has no compiler, wanted %{family}",
                        spec.name()
                    ));
                };
                if &compiler.family != family {
                    return Compatibility::incompatible(format!(
                        "{} is built with %{compiler}, wanted %{family}",
                        spec.name()
                    ));
                }
                match versions {
                    Some(filter) if !filter.is_applicable(&compiler.version).is_ok() => {
                        Compatibility::incompatible(format!(
                            "{} is built with %{compiler}, wanted %{family}@{filter}",
                            spec.name()
                        ))
                    }
                    _ => Compatibility::Compatible,
                }
            }
            Condition::SchedulerEq(wanted) => match spec.scheduler() {
                Some(actual) if actual == wanted => Compatibility::Compatible,
                Some(actual) => Compatibility::incompatible(format!(
                    "{} uses scheduler '{actual}', wanted '{wanted}'",
                    spec.name()
                )),
                None => Compatibility::incompatible(format!(
                    "{} has no scheduler, wanted '{wanted}'",
                    spec.name()
                )),
            },
            Condition::Package { name, condition } => {
                if spec.name() == name {
                    return condition.check(spec);
                }
                match spec.dependency(name) {
                    Some(dependency) => condition.check(dependency),
                    None => Compatibility::incompatible(format!(
                        "{} does not depend on {name}",
                        spec.name()
                    )),
                }
            }
            Condition::And(conditions) => {
                for condition in conditions {
                    let compat = condition.check(spec);
                    if !compat.is_ok() {
                        return compat;
                    }
                }
                Compatibility::Compatible
            }
            Condition::Or(conditions) => {
                let mut reasons = Vec::with_capacity(conditions.len());
                for condition in conditions {
                    match condition.check(spec) {
                        Compatibility::Compatible => return Compatibility::Compatible,
                        Compatibility::Incompatible(reason) => reasons.push(reason),
                    }
                }
                Compatibility::incompatible(reasons.join(", and "))
            }
            Condition::Not(inner) => match inner.check(spec) {
                Compatibility::Compatible => {
                    Compatibility::incompatible(format!("{} satisfies {inner}", spec.name()))
                }
                Compatibility::Incompatible(_) => Compatibility::Compatible,
            },
        }
    }

    /// The variants of the package called `own` that this condition reads.
    ///
    /// Unscoped atoms always refer to the package itself, scopes only
    /// count when they name it explicitly.
    pub fn referenced_variants<'a>(&'a self, own: &PkgName) -> Vec<&'a VariantName> {
        let mut found = Vec::new();
        self.collect_variants(own, &mut found);
        found
    }

    fn collect_variants<'a>(&'a self, own: &PkgName, found: &mut Vec<&'a VariantName>) {
        match self {
            Condition::VariantEq { name, .. } => {
                if !found.contains(&name) {
                    found.push(name);
                }
            }
            Condition::Package { name, condition } if name == own => {
                condition.collect_variants(own, found)
            }
            Condition::And(conditions) | Condition::Or(conditions) => conditions
                .iter()
                .for_each(|c| c.collect_variants(own, found)),
            Condition::Not(inner) => inner.collect_variants(own, found),
            Condition::Always
            | Condition::VersionIn(_)
            | Condition::Compiler { .. }
            | Condition::SchedulerEq(_)
            | Condition::Package { .. } => {}
        }
    }

    /// The names of all packages that this condition scopes into.
    pub fn referenced_packages(&self) -> Vec<&PkgName> {
        let mut found: Vec<&PkgName> = Vec::new();
        let mut stack = vec![self];
        while let Some(next) = stack.pop() {
            match next {
                Condition::Package { name, condition } => {
                    if !found.contains(&name) {
                        found.push(name);
                    }
                    stack.push(condition);
                }
                Condition::And(conditions) | Condition::Or(conditions) => {
                    stack.extend(conditions.iter())
                }
                Condition::Not(inner) => stack.push(inner),
                _ => {}
            }
        }
        found
    }

    /// Render an atom, or a conjunction of atoms, in the form that can
    /// be attached directly to a package name.
    fn fmt_attached(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::And(conditions) => conditions.iter().try_for_each(|c| c.fmt_attached(f)),
            Condition::Always => Ok(()),
            other => std::fmt::Display::fmt(other, f),
        }
    }
}

/// Strings compare exactly, a boolean spec value also
/// accepts the boolean words, eg: `romio=true`.
fn variant_values_match(actual: &VariantValue, wanted: &VariantValue) -> bool {
    match (actual, wanted) {
        (VariantValue::Str(actual), VariantValue::Str(wanted)) => actual == wanted,
        (VariantValue::Bool(actual), VariantValue::Bool(wanted)) => actual == wanted,
        (VariantValue::Bool(actual), VariantValue::Str(wanted)) => {
            VariantValue::bool_word(wanted) == Some(*actual)
        }
        (VariantValue::Str(_), VariantValue::Bool(_)) => false,
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Always => Ok(()),
            Condition::VariantEq { name, value } => match value {
                VariantValue::Bool(true) => write!(f, "+{name}"),
                VariantValue::Bool(false) => write!(f, "~{name}"),
                VariantValue::Str(s) => write!(f, "{name}={s}"),
            },
            Condition::VersionIn(filter) => write!(f, "@{filter}"),
            Condition::Compiler { family, versions } => {
                write!(f, "%{family}")?;
                if let Some(versions) = versions {
                    write!(f, "{COMPILER_VERSION_SEP}{versions}")?;
                }
                Ok(())
            }
            Condition::SchedulerEq(name) => write!(f, "{SCHEDULERS_KEY}={name}"),
            Condition::Package { name, condition } => {
                write!(f, "^{name}")?;
                if !condition.is_always() {
                    f.write_char(' ')?;
                    std::fmt::Display::fmt(condition, f)?;
                }
                Ok(())
            }
            Condition::And(conditions) => {
                // scopes collect every atom that follows them,
                // so the unscoped atoms must be written first
                let (scopes, atoms): (Vec<_>, Vec<_>) = conditions
                    .iter()
                    .partition(|c| matches!(c, Condition::Package { .. }));
                write!(f, "{}", atoms.into_iter().chain(scopes).format(" "))
            }
            Condition::Or(conditions) => write!(f, "{}", conditions.iter().format(" | ")),
            Condition::Not(inner) => {
                f.write_char('!')?;
                match &**inner {
                    Condition::Package { name, condition } => {
                        write!(f, "^{name}")?;
                        condition.fmt_attached(f)
                    }
                    other => std::fmt::Display::fmt(other, f),
                }
            }
        }
    }
}

impl FromStr for Condition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_condition(s)
    }
}

impl TryFrom<String> for Condition {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        parse_condition(value)
    }
}

impl From<Condition> for String {
    fn from(value: Condition) -> Self {
        value.to_string()
    }
}

/// Parse a query string into a condition tree.
///
/// An empty or whitespace-only query is [`Condition::Always`].
pub fn parse_condition<S: AsRef<str>>(query: S) -> Result<Condition> {
    use nom::combinator::all_consuming;
    use nom::error::{convert_error, VerboseError};

    let query = query.as_ref().trim();
    if query.is_empty() {
        return Ok(Condition::Always);
    }
    all_consuming(crate::parsing::condition::<VerboseError<&str>>)(query)
        .map(|(_, condition)| condition)
        .map_err(|err| match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => Error::QuerySyntaxError {
                query: query.to_owned(),
                message: convert_error(query, e),
            },
            nom::Err::Incomplete(_) => unreachable!(),
        })
}

/// Parse a query and evaluate it against the given spec.
pub fn satisfies<Q: Queryable + ?Sized>(spec: &Q, query: &str) -> Result<bool> {
    let condition = parse_condition(query)?;
    let compat = condition.check(spec);
    tracing::trace!(%query, %compat, "evaluated query against {}", spec.name());
    Ok(compat.is_ok())
}
