// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;
use varconf_foundation::name::{NamespacedName, PkgName};
use varconf_schema::DefinitionError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Diagnostic, Debug, Error)]
pub enum Error {
    #[error("Package '{0}' was not found in any repository")]
    #[diagnostic(
        code(varconf::repo::not_found),
        help("check the configured repository paths, or qualify the name with its namespace")
    )]
    PackageNotFound(NamespacedName),
    #[error("No repository provides the namespace '{0}'")]
    #[diagnostic(code(varconf::repo::unknown_namespace))]
    UnknownNamespace(PkgName),
    #[error("{0:?} is not a repository, it has no packages directory")]
    #[diagnostic(code(varconf::repo::invalid))]
    NotARepository(PathBuf),
    #[error("{path:?} defines '{found}', expected '{expected}'")]
    #[diagnostic(code(varconf::repo::name_mismatch))]
    NameMismatch {
        path: PathBuf,
        expected: PkgName,
        found: PkgName,
    },
    #[error("Invalid package or namespace name '{0}'")]
    #[diagnostic(code(varconf::repo::invalid_name))]
    InvalidName(String, #[source] varconf_foundation::name::Error),
    #[error("Failed to read {0:?}")]
    ReadFailed(PathBuf, #[source] std::io::Error),
    #[error("Failed to load package definition {path:?}")]
    #[diagnostic(code(varconf::repo::invalid_definition))]
    InvalidDefinition {
        path: PathBuf,
        #[source]
        source: Box<varconf_schema::Error>,
    },
    #[error(transparent)]
    #[diagnostic(forward(0))]
    DefinitionError(#[from] DefinitionError),

    #[error("Cannot read loaded definitions, lock has been poisoned: {0}")]
    LockPoisonedRead(String),
    #[error("Cannot store loaded definitions, lock has been poisoned: {0}")]
    LockPoisonedWrite(String),
}
