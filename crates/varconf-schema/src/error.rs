// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use miette::Diagnostic;
use thiserror::Error;
use varconf_foundation::name::{PkgName, VariantName};
use varconf_foundation::version::Version;

#[cfg(test)]
#[path = "./error_test.rs"]
mod error_test;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A package definition that can never be resolved.
///
/// These are raised while a definition is being constructed, so a
/// malformed definition never reaches resolution.
#[derive(Diagnostic, Debug, Error, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("{package}: variant '{variant}' is declared more than once")]
    #[diagnostic(code(varconf::definition::duplicate_variant))]
    DuplicateVariant {
        package: PkgName,
        variant: VariantName,
    },
    #[error("{package}: cannot override '{variant}', no base definition declares it")]
    #[diagnostic(
        code(varconf::definition::override_missing),
        help("use a plain declaration to add a new variant")
    )]
    OverrideMissing {
        package: PkgName,
        variant: VariantName,
    },
    #[error("{package}: the condition of '{variant}' refers to '{reference}', which is declared after it")]
    #[diagnostic(
        code(varconf::definition::forward_reference),
        help("conditions may only refer to variants declared earlier")
    )]
    ForwardReference {
        package: PkgName,
        variant: VariantName,
        reference: VariantName,
    },
    #[error("{package}: the condition of '{variant}' depends on itself through '{reference}'")]
    #[diagnostic(code(varconf::definition::circular_reference))]
    CircularReference {
        package: PkgName,
        variant: VariantName,
        reference: VariantName,
    },
    #[error("{package}: {context} refers to undeclared variant '{reference}'")]
    #[diagnostic(code(varconf::definition::unknown_reference))]
    UnknownReference {
        package: PkgName,
        context: String,
        reference: VariantName,
    },
    #[error("{package}: '{variant}' is inherited as {inherited} but declared as {declared}")]
    #[diagnostic(code(varconf::definition::conflicting_kind))]
    ConflictingKind {
        package: PkgName,
        variant: VariantName,
        inherited: String,
        declared: String,
    },
    #[error("{package}: invalid default for '{variant}': {reason}")]
    #[diagnostic(code(varconf::definition::invalid_default))]
    InvalidDefault {
        package: PkgName,
        variant: VariantName,
        reason: String,
    },
    #[error("{package}: {rule} needs '{variant}' to be a boolean variant")]
    #[diagnostic(code(varconf::definition::rule_kind))]
    RuleKindMismatch {
        package: PkgName,
        variant: VariantName,
        rule: String,
    },
    #[error("{package}: invalid dependency '{spec}', expected a package name with optional constraints")]
    #[diagnostic(code(varconf::definition::invalid_dependency))]
    InvalidDependency { package: PkgName, spec: String },
    #[error("{package} extends {base}, which cannot be found")]
    #[diagnostic(code(varconf::definition::missing_base))]
    MissingBase { package: String, base: String },
    #[error("Definitions extend each other in a cycle: {chain}")]
    #[diagnostic(code(varconf::definition::cyclic_base))]
    CyclicBase { chain: String },
}

#[derive(Diagnostic, Debug, Error)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(forward(0))]
    DefinitionError(#[from] DefinitionError),
    #[error("Spec {spec} cannot be built by {package}: {reason}")]
    #[diagnostic(code(varconf::spec::invalid))]
    InvalidSpec {
        package: PkgName,
        spec: String,
        reason: String,
    },
    #[error("Spec for {found} cannot be built by the definition of {expected}")]
    #[diagnostic(code(varconf::spec::name_mismatch))]
    NameMismatch { expected: PkgName, found: PkgName },
    #[error("{package} does not declare version {version}")]
    #[diagnostic(code(varconf::spec::version_not_declared))]
    VersionNotDeclared { package: PkgName, version: Version },
    #[error("{package} requires {dependency}: {reason}")]
    #[diagnostic(code(varconf::spec::dependency))]
    DependencyViolation {
        package: PkgName,
        dependency: String,
        reason: String,
    },
    #[error("{package} conflicts with '{conflict}'{}", .msg.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    #[diagnostic(code(varconf::spec::conflict))]
    ConflictViolation {
        package: PkgName,
        conflict: String,
        msg: Option<String>,
    },
    #[error(transparent)]
    #[diagnostic(code(varconf::yaml))]
    InvalidYaml(#[from] format_serde_error::SerdeError),
}
