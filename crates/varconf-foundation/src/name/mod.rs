// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

mod error;

use std::borrow::Borrow;
use std::convert::TryFrom;
use std::str::FromStr;

pub use error::{Error, Result};
use thiserror::Error;

#[cfg(test)]
#[path = "./name_test.rs"]
mod name_test;

/// Parse a package name from a string.
///
/// This will panic if the name is invalid,
/// and should only be used for testing.
///
/// ```
/// # #[macro_use] extern crate varconf_foundation;
/// # fn main() {
/// pkg_name!("openmpi");
/// # }
/// ```
#[macro_export]
macro_rules! pkg_name {
    ($name:literal) => {
        $crate::name::PkgName::new($name).unwrap()
    };
}

/// Parse a variant name from a string.
///
/// This will panic if the name is invalid,
/// and should only be used for testing.
///
/// ```
/// # #[macro_use] extern crate varconf_foundation;
/// # fn main() {
/// var_name!("aggregate_read");
/// # }
/// ```
#[macro_export]
macro_rules! var_name {
    ($name:literal) => {
        $crate::name::VariantName::new($name).unwrap()
    };
}

/// Denotes that an invalid name was given.
#[derive(Debug, Error)]
#[error("Invalid name: {message}")]
pub struct InvalidNameError {
    pub message: String,
}

impl InvalidNameError {
    pub fn new_error(msg: String) -> Error {
        Error::InvalidNameError(Self { message: msg })
    }
}

/// Generate an owned, validated string type.
///
/// The type must provide a `validate(&str) -> Result<()>` function.
macro_rules! validated_name {
    ($type_name:ident, $what:literal) => {
        #[doc = concat!("An owned and validated ", $what, " name")]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
        pub struct $type_name(String);

        impl $type_name {
            #[doc = concat!("Validate and wrap the given string as a ", $what, " name")]
            pub fn new<S: Into<String>>(name: S) -> Result<Self> {
                let name = name.into();
                Self::validate(&name)?;
                Ok(Self(name))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::ops::Deref for $type_name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl AsRef<str> for $type_name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $type_name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $type_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $type_name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl TryFrom<&str> for $type_name {
            type Error = Error;

            fn try_from(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $type_name {
            type Error = Error;

            fn try_from(s: String) -> Result<Self> {
                Self::new(s)
            }
        }

        impl PartialEq<str> for $type_name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $type_name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl serde::Serialize for $type_name {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $type_name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::new(s).map_err(serde::de::Error::custom)
            }
        }
    };
}

validated_name!(PkgName, "package");
validated_name!(VariantName, "variant");

impl PkgName {
    pub const MIN_LEN: usize = 2;
    pub const MAX_LEN: usize = 64;

    /// Validate the given string as a package name
    pub fn validate<S: AsRef<str> + ?Sized>(s: &S) -> Result<()> {
        validate_name(s.as_ref(), "package", is_valid_pkg_name_char)
    }
}

impl VariantName {
    // variant names are constrained by the same
    // size limits as package names
    pub const MIN_LEN: usize = PkgName::MIN_LEN;
    pub const MAX_LEN: usize = PkgName::MAX_LEN;

    /// Validate the given string as a variant name
    pub fn validate<S: AsRef<str> + ?Sized>(s: &S) -> Result<()> {
        validate_name(s.as_ref(), "variant", is_valid_variant_name_char)
    }

    /// Wrap a name taken from a query without validating it.
    ///
    /// Such a name is only compared against declared variants,
    /// so a name that could never be declared matches nothing.
    pub fn new_unchecked<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    /// The name used for this variant in build tool flags,
    /// where underscores become hyphens (`aggregate_read` -> `aggregate-read`)
    pub fn flag_name(&self) -> String {
        self.0.replace('_', "-")
    }
}

/// A package name qualified by the repository namespace that
/// defines it, eg: `builtin.openmpi`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct NamespacedName {
    pub namespace: Option<PkgName>,
    pub name: PkgName,
}

impl NamespacedName {
    pub const SEP: char = '.';

    pub fn new(namespace: Option<PkgName>, name: PkgName) -> Self {
        Self { namespace, name }
    }
}

impl std::fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}{}{}", Self::SEP, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for NamespacedName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(Self::SEP) {
            Some((ns, name)) => Ok(Self::new(Some(ns.parse()?), name.parse()?)),
            None => Ok(Self::new(None, s.parse()?)),
        }
    }
}

impl serde::Serialize for NamespacedName {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for NamespacedName {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn validate_name(name: &str, what: &str, valid_char: fn(char) -> bool) -> Result<()> {
    let len = name.chars().count();
    if len < PkgName::MIN_LEN {
        return Err(InvalidNameError::new_error(format!(
            "Invalid {what} name, must be at least {} characters, got {len} [{name}]",
            PkgName::MIN_LEN,
        )));
    }
    if len > PkgName::MAX_LEN {
        return Err(InvalidNameError::new_error(format!(
            "Invalid {what} name, must be no more than {} characters, got {len} [{name}]",
            PkgName::MAX_LEN,
        )));
    }
    match name.chars().next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => {
            return Err(InvalidNameError::new_error(format!(
                "Invalid {what} name, must begin with a lowercase letter, got {name}"
            )));
        }
    }
    if let Some((index, c)) = name.char_indices().find(|(_, c)| !valid_char(*c)) {
        return Err(InvalidNameError::new_error(format!(
            "Invalid {what} name at pos {index}: {} > {c} < {}",
            &name[..index],
            &name[index + c.len_utf8()..]
        )));
    }
    Ok(())
}

pub fn is_valid_pkg_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
}

pub fn is_valid_variant_name_char(c: char) -> bool {
    // variant names are a superset of all valid package names
    is_valid_pkg_name_char(c) || c == '_'
}
