// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use miette::Diagnostic;
use thiserror::Error;

#[derive(Diagnostic, Debug, Error)]
pub enum Error {
    #[error("Cannot load config, lock has been poisoned: {0}")]
    LockPoisonedRead(String),
    #[error("Cannot update config, lock has been poisoned: {0}")]
    LockPoisonedWrite(String),

    #[error(transparent)]
    #[diagnostic(code(varconf::config))]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
