// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

mod error;
pub mod parsing;

use std::cmp::Ordering;
use std::convert::TryFrom;
use std::str::FromStr;

pub use error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[cfg(test)]
#[path = "./version_test.rs"]
mod version_test;

/// Version names that denote a development branch and
/// sort newer than any numbered release, lowest first.
pub const INFINITY_VERSIONS: &[&str] = &["stable", "trunk", "head", "master", "main", "develop"];

/// Parse a version from a string.
///
/// This will panic if the version is invalid,
/// and should only be used for testing.
#[macro_export]
macro_rules! version {
    ($version:literal) => {
        $crate::version::parse_version($version).unwrap()
    };
}

/// Denotes that an invalid version number was given.
#[derive(Debug, Error)]
#[error("Invalid version: {message}")]
pub struct InvalidVersionError {
    pub message: String,
}

impl InvalidVersionError {
    pub fn new_error(msg: String) -> Error {
        Error::InvalidVersionError(Self { message: msg })
    }
}

/// One segment of a version number.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Component {
    Numeric(u64),
    Alpha(String),
}

impl Component {
    /// The rank of this component among the development branch names, if any
    fn infinity_rank(&self) -> Option<usize> {
        match self {
            Component::Alpha(s) => INFINITY_VERSIONS.iter().position(|v| v == s),
            Component::Numeric(_) => None,
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Component::Numeric(n) => n.fmt(f),
            Component::Alpha(s) => f.write_str(s),
        }
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.infinity_rank(), other.infinity_rank()) {
            (Some(a), Some(b)) => return a.cmp(&b),
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => {}
        }
        match (self, other) {
            (Component::Numeric(a), Component::Numeric(b)) => a.cmp(b),
            // pre-release style words (rc, alpha, beta) sort below numbers
            (Component::Alpha(_), Component::Numeric(_)) => Ordering::Less,
            (Component::Numeric(_), Component::Alpha(_)) => Ordering::Greater,
            (Component::Alpha(a), Component::Alpha(b)) => a.cmp(b),
        }
    }
}

/// Version specifies a concrete package version.
///
/// The original text is kept for display, but equality and ordering
/// are decided by the parsed components alone.
#[derive(Clone, Debug)]
pub struct Version {
    text: String,
    components: Vec<Component>,
}

impl Version {
    /// Build a new version number from any number of digits
    pub fn from_parts<P: IntoIterator<Item = u64>>(parts: P) -> Self {
        let components: Vec<_> = parts.into_iter().map(Component::Numeric).collect();
        let text = components
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Self { text, components }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// The major version number, if the version starts with a number
    pub fn major(&self) -> Option<u64> {
        match self.components.first() {
            Some(Component::Numeric(n)) => Some(*n),
            _ => None,
        }
    }

    /// True if every component of this version is also the
    /// leading component of other, eg: `1.12` is a prefix of `1.12.3`
    pub fn is_prefix_of(&self, other: &Version) -> bool {
        self.components.len() <= other.components.len()
            && self
                .components
                .iter()
                .zip(other.components.iter())
                .all(|(a, b)| a == b)
    }

    /// True if this version names a development branch, eg: `master`
    pub fn is_development(&self) -> bool {
        self.components
            .first()
            .map(|c| c.infinity_rank().is_some())
            .unwrap_or_default()
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for Version {}

impl std::hash::Hash for Version {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.components.hash(state)
    }
}

impl PartialEq<str> for Version {
    fn eq(&self, other: &str) -> bool {
        match parse_version(other) {
            Ok(v) => self == &v,
            Err(_) => false,
        }
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        <Version as PartialEq<str>>::eq(self, other)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // a shorter version that is a prefix of a longer
        // one is lesser: 5 < 5.0 < 5.0.0rc1
        self.components.cmp(&other.components)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl TryFrom<&str> for Version {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        parse_version(value)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_version(s)
    }
}

/// Parse a string as a version specifier.
pub fn parse_version<S: AsRef<str>>(version: S) -> Result<Version> {
    use nom::combinator::all_consuming;
    use nom::error::convert_error;

    let version = version.as_ref();
    if version.is_empty() {
        return Err(InvalidVersionError::new_error(
            "a version cannot be empty".to_string(),
        ));
    }
    all_consuming(parsing::version::<nom::error::VerboseError<&str>>)(version)
        .map(|(_, v)| v)
        .map_err(|err| match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                InvalidVersionError::new_error(convert_error(version, e))
            }
            nom::Err::Incomplete(_) => unreachable!(),
        })
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VersionVisitor;
        impl serde::de::Visitor<'_> for VersionVisitor {
            type Value = Version;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a version number (eg: 1.12, 5.0.0rc1, master)")
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Version, E>
            where
                E: serde::de::Error,
            {
                Version::from_str(value).map_err(serde::de::Error::custom)
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Version, E>
            where
                E: serde::de::Error,
            {
                Ok(Version::from_parts([value]))
            }
        }
        deserializer.deserialize_any(VersionVisitor)
    }
}
