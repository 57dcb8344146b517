// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

//! Loading of package definitions from namespaced repositories on disk.
//!
//! A repository is a directory named after its namespace:
//!
//! ```text
//! <root>/<namespace>/packages/<name>/package.yaml
//! ```

mod error;
mod repository;
mod stack;

pub use error::{Error, Result};
pub use repository::Repository;
pub use stack::RepositoryStack;
