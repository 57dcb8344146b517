// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

mod config;
mod error;

pub use error::{Error, Result};

pub use self::config::*;
