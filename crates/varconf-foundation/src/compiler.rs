// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use miette::Diagnostic;
use thiserror::Error;

use crate::name::PkgName;
use crate::version::Version;

pub const COMPILER_VERSION_SEP: char = '@';

#[derive(Diagnostic, Debug, Error)]
pub enum Error {
    #[error("Invalid compiler '{0}', expected <family>@<version>")]
    #[diagnostic(code(varconf::compiler::invalid))]
    InvalidCompiler(String),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    NameError(#[from] crate::name::Error),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    VersionError(#[from] crate::version::Error),
}

/// The concrete compiler used for a build, eg: `gcc@12.2.0`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CompilerSpec {
    pub family: PkgName,
    pub version: Version,
}

impl CompilerSpec {
    pub fn new(family: PkgName, version: Version) -> Self {
        Self { family, version }
    }
}

impl std::fmt::Display for CompilerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{COMPILER_VERSION_SEP}{}", self.family, self.version)
    }
}

impl FromStr for CompilerSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((family, version)) = s.split_once(COMPILER_VERSION_SEP) else {
            return Err(Error::InvalidCompiler(s.to_owned()));
        };
        Ok(Self {
            family: family.parse()?,
            version: version.parse()?,
        })
    }
}

impl serde::Serialize for CompilerSpec {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for CompilerSpec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
