// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Display, Write};
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::version::Version;
use crate::Compatibility;

mod error;
pub mod parsing;

pub use error::{Error, Result};


pub const VERSION_RANGE_SEP: &str = ",";
pub const VERSION_BOUND_SEP: char = ':';

/// The generic trait for everything that can accept or reject a version.
pub trait Ranged: Display {
    /// Return compatible if the given version falls within this range
    fn is_applicable(&self, version: &Version) -> Compatibility;
}

impl<T: Ranged> Ranged for &T {
    fn is_applicable(&self, version: &Version) -> Compatibility {
        Ranged::is_applicable(*self, version)
    }
}

/// Specifies a single range of version numbers
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum VersionRange {
    /// Exactly one version, eg: `5.0.0`
    Exact(Version),
    /// Zero, one or two inclusive bounds, eg: `5:`, `:1.12`, `5.0:5.2`
    Bounded(BoundedRange),
}

impl VersionRange {
    /// A range that accepts any version, eg: `:`
    pub fn any_version() -> Self {
        VersionRange::Bounded(BoundedRange::default())
    }

    /// A range that accepts the given version and everything newer
    pub fn at_least(version: Version) -> Self {
        VersionRange::Bounded(BoundedRange {
            lower: Some(version),
            upper: None,
        })
    }

    /// A range that accepts the given version, its prefixed
    /// releases and anything older
    pub fn at_most(version: Version) -> Self {
        VersionRange::Bounded(BoundedRange {
            lower: None,
            upper: Some(version),
        })
    }
}

impl Ranged for VersionRange {
    fn is_applicable(&self, version: &Version) -> Compatibility {
        match self {
            VersionRange::Exact(v) => {
                if v == version {
                    Compatibility::Compatible
                } else {
                    Compatibility::Incompatible(format!("version {version} is not exactly {v}"))
                }
            }
            VersionRange::Bounded(r) => r.is_applicable(version),
        }
    }
}

impl Display for VersionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            VersionRange::Exact(v) => v.fmt(f),
            VersionRange::Bounded(r) => r.fmt(f),
        }
    }
}

impl FromStr for VersionRange {
    type Err = Error;

    fn from_str(rule_str: &str) -> Result<Self> {
        parse_all(rule_str, parsing::version_range)
    }
}

/// A range with optional inclusive lower and upper bounds.
///
/// The upper bound also admits every version that it is a prefix of,
/// so `:1.12` contains `1.12.3` but not `1.13`.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct BoundedRange {
    lower: Option<Version>,
    upper: Option<Version>,
}

impl BoundedRange {
    pub fn new(lower: Option<Version>, upper: Option<Version>) -> Result<Self> {
        if let (Some(lower), Some(upper)) = (&lower, &upper) {
            if lower > upper && !upper.is_prefix_of(lower) {
                return Err(Error::InvalidRange(format!(
                    "lower bound {lower} is greater than upper bound {upper}"
                )));
            }
        }
        Ok(Self { lower, upper })
    }

    /// The lower, inclusive bound for this range
    pub fn lower(&self) -> Option<&Version> {
        self.lower.as_ref()
    }

    /// The upper, inclusive bound for this range
    pub fn upper(&self) -> Option<&Version> {
        self.upper.as_ref()
    }
}

impl Ranged for BoundedRange {
    fn is_applicable(&self, version: &Version) -> Compatibility {
        if let Some(lower) = &self.lower {
            if version < lower {
                return Compatibility::Incompatible(format!("version {version} is older than {lower}"));
            }
        }
        if let Some(upper) = &self.upper {
            if version > upper && !upper.is_prefix_of(version) {
                return Compatibility::Incompatible(format!("version {version} is newer than {upper}"));
            }
        }
        Compatibility::Compatible
    }
}

impl Display for BoundedRange {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(lower) = &self.lower {
            lower.fmt(f)?;
        }
        f.write_char(VERSION_BOUND_SEP)?;
        if let Some(upper) = &self.upper {
            upper.fmt(f)?;
        }
        Ok(())
    }
}

/// A union of version ranges, satisfied when any one of them is.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionFilter {
    rules: Vec<VersionRange>,
}

impl VersionFilter {
    pub fn single(rule: VersionRange) -> Self {
        Self { rules: vec![rule] }
    }

    pub fn rules(&self) -> &[VersionRange] {
        &self.rules
    }
}

impl Ranged for VersionFilter {
    fn is_applicable(&self, version: &Version) -> Compatibility {
        let mut reasons = Vec::with_capacity(self.rules.len());
        for rule in self.rules.iter() {
            match rule.is_applicable(version) {
                Compatibility::Compatible => return Compatibility::Compatible,
                Compatibility::Incompatible(reason) => reasons.push(reason),
            }
        }
        Compatibility::Incompatible(reasons.join(" and "))
    }
}

impl From<VersionRange> for VersionFilter {
    fn from(rule: VersionRange) -> Self {
        Self::single(rule)
    }
}

impl Display for VersionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.rules.iter().join(VERSION_RANGE_SEP))
    }
}

impl FromStr for VersionFilter {
    type Err = Error;

    fn from_str(filter_str: &str) -> Result<Self> {
        parse_all(filter_str, parsing::version_filter)
    }
}

impl TryFrom<String> for VersionFilter {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<VersionFilter> for String {
    fn from(filter: VersionFilter) -> Self {
        filter.to_string()
    }
}

/// Parse a complete version range or filter string.
pub fn parse_version_range<S: AsRef<str>>(range: S) -> Result<VersionFilter> {
    range.as_ref().parse()
}

fn parse_all<'a, O, P>(input: &'a str, parser: P) -> Result<O>
where
    P: FnMut(&'a str) -> nom::IResult<&'a str, O, nom::error::VerboseError<&'a str>>,
{
    use nom::combinator::all_consuming;
    use nom::error::convert_error;

    if input.is_empty() {
        return Err(Error::InvalidRange("a version range cannot be empty".into()));
    }
    all_consuming(parser)(input)
        .map(|(_, out)| out)
        .map_err(|err| match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                Error::InvalidRange(convert_error(input, e))
            }
            nom::Err::Incomplete(_) => unreachable!(),
        })
}
