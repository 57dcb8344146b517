// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

//! Package definitions and the resolution of specs into build arguments.

mod args;
mod environ;
mod error;
mod file;
mod package;
mod requirements;
mod schema;
mod variant;

pub use args::{ArgRule, CompositePart, ConfigArg, SchedulerRule};
pub use environ::{BuildEnvironment, EnvOp, SetEnv, UnsetEnv};
pub use error::{DefinitionError, Error, Result};
pub use file::{PackageDefinitionFile, SchedulerRuleEntry};
pub use package::{BuildPlan, PackageBuilder, PackageDefinition};
pub use requirements::{
    BuildSystem,
    ConflictDeclaration,
    DependencyDeclaration,
    DependencyEntry,
    SourceRef,
    VersionDeclaration,
};
pub use schema::VariantSchema;
pub use variant::{VariantDeclaration, VariantEntry, VariantKind};
pub use {varconf_foundation as foundation, varconf_query as query};
