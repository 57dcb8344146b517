// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Diagnostic, Debug, Error)]
pub enum Error {
    #[error("Invalid version range: {0}")]
    #[diagnostic(
        code(varconf::version_range::invalid),
        help("ranges look like '5.0.0', '5:', ':1.12' or '5.0:5.2'")
    )]
    InvalidRange(String),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    VersionError(#[from] crate::version::Error),
}
