// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Diagnostic, Debug, Error)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(code(varconf::name::invalid))]
    InvalidNameError(#[from] super::InvalidNameError),
}
