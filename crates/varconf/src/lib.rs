// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

//! The `varconf` command line interface.

pub mod cmd_args;
pub mod cmd_check;
pub mod cmd_info;
pub mod cmd_ls;
mod env;
pub mod flags;

pub use env::configure_logging;

use miette::Result;

/// Trait all cli commands must implement to be runnable.
pub trait Run {
    fn run(&mut self) -> Result<i32>;
}

/// Trait all cli commands must implement to provide a list of the
/// package or spec values from their command lines.
pub trait CommandArgs {
    /// Get a string list of the important positional arguments for
    /// the command. If there are no positional arguments, this will
    /// return an empty list.
    fn get_positional_args(&self) -> Vec<String>;
}
