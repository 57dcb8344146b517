// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

//! Core value types shared by every varconf crate: names, versions,
//! version ranges, compilers, variant values and concrete specs.

mod compat;
pub mod compiler;
mod from_yaml;
pub mod name;
pub mod spec;
pub mod variant;
pub mod version;
pub mod version_range;

pub use compat::Compatibility;
pub use from_yaml::{FromYaml, YamlError};
