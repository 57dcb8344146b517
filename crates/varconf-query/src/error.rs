// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Diagnostic, Debug, Error)]
pub enum Error {
    #[error("Invalid query '{query}':\n{message}")]
    #[diagnostic(
        code(varconf::query::syntax),
        help("queries are space separated atoms like '+name', '-name', 'name=value', '@5:', '%gcc@:9' or 'schedulers=tm'")
    )]
    QuerySyntaxError { query: String, message: String },
}
