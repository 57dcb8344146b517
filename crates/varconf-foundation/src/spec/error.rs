// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Diagnostic, Debug, Error)]
pub enum Error {
    #[error("Invalid spec '{spec}': {reason}")]
    #[diagnostic(
        code(varconf::spec::invalid),
        help("specs look like 'openmpi@5.0.0 +romio ~debug fabrics=ucx schedulers=slurm %gcc@12.2.0'")
    )]
    InvalidSpecError { spec: String, reason: String },
    #[error(transparent)]
    #[diagnostic(forward(0))]
    NameError(#[from] crate::name::Error),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    VersionError(#[from] crate::version::Error),
    #[error(transparent)]
    #[diagnostic(forward(0))]
    CompilerError(#[from] crate::compiler::Error),
}
