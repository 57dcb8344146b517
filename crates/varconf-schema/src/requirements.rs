// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use strum::Display;
use varconf_foundation::name::PkgName;
use varconf_foundation::spec::Queryable;
use varconf_foundation::variant::VariantValue;
use varconf_foundation::version::Version;
use varconf_foundation::Compatibility;
use varconf_query::{parse_condition, Condition};

#[cfg(test)]
#[path = "./requirements_test.rs"]
mod requirements_test;

/// The tool that consumes the generated arguments.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BuildSystem {
    /// `./configure` style arguments
    #[default]
    Autotools,
    /// `-D` cache definitions
    CMake,
}

impl BuildSystem {
    /// The program that the arguments are meant for.
    pub fn program(&self) -> &'static str {
        match self {
            BuildSystem::Autotools => "./configure",
            BuildSystem::CMake => "cmake",
        }
    }
}

/// Where the source of one version is fetched from.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceRef {
    Branch(String),
    Tag(String),
    Commit(String),
    Sha256(String),
}

impl std::fmt::Display for SourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceRef::Branch(b) => write!(f, "branch {b}"),
            SourceRef::Tag(t) => write!(f, "tag {t}"),
            SourceRef::Commit(c) => write!(f, "commit {c}"),
            SourceRef::Sha256(s) => write!(f, "sha256 {s}"),
        }
    }
}

/// One fetchable version of a package.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct VersionDeclaration {
    pub version: Version,
    #[serde(flatten)]
    pub source: SourceRef,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub submodules: bool,
}

impl VersionDeclaration {
    pub fn new(version: Version, source: SourceRef) -> Self {
        Self {
            version,
            source,
            submodules: false,
        }
    }

    pub fn with_submodules(mut self, submodules: bool) -> Self {
        self.submodules = submodules;
        self
    }
}

/// A package that must be part of the build, eg: `pmdk+ndctl`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DependencyEntry", into = "DependencyEntry")]
pub struct DependencyDeclaration {
    pub name: PkgName,
    /// What the resolved dependency must satisfy
    pub constraint: Condition,
    /// The dependency is only required when this holds for the dependent
    pub when: Condition,
}

impl DependencyDeclaration {
    pub fn new(name: PkgName) -> Self {
        Self {
            name,
            constraint: Condition::Always,
            when: Condition::Always,
        }
    }

    /// Parse a dependency from its query form, eg: `pmdk+ndctl@1.12:`
    pub fn parse<S: AsRef<str>>(spec: S) -> Option<Self> {
        match parse_condition(spec.as_ref()).ok()? {
            Condition::Package { name, condition } => Some(Self {
                name,
                constraint: *condition,
                when: Condition::Always,
            }),
            _ => None,
        }
    }

    pub fn with_when(mut self, when: Condition) -> Self {
        self.when = when;
        self
    }

    /// Check this declaration against the dependent spec.
    pub fn check<Q: Queryable + ?Sized>(&self, spec: &Q) -> Compatibility {
        if !self.when.check(spec).is_ok() {
            return Compatibility::Compatible;
        }
        match spec.dependency(&self.name) {
            None => Compatibility::incompatible(format!("{} is not a dependency", self.name)),
            Some(dependency) => self.constraint.check(dependency),
        }
    }
}

impl std::fmt::Display for DependencyDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        let parts: Vec<&Condition> = match &self.constraint {
            Condition::Always => return Ok(()),
            Condition::And(parts) => parts.iter().collect(),
            other => vec![other],
        };
        for part in parts {
            match part {
                // only these forms can be attached directly to the name
                Condition::VariantEq {
                    value: VariantValue::Bool(_),
                    ..
                }
                | Condition::VersionIn(_)
                | Condition::Compiler { .. } => write!(f, "{part}")?,
                _ => write!(f, " {part}")?,
            }
        }
        Ok(())
    }
}

/// How a dependency is written in a definition file.
///
/// ```yaml
/// dependencies:
///   - mpi
///   - spec: pmdk+ndctl
///     when: +rpmem
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyEntry {
    Plain(String),
    Conditional {
        spec: String,
        #[serde(default, skip_serializing_if = "Condition::is_always")]
        when: Condition,
    },
}

impl DependencyEntry {
    /// The dependency as written, without its condition.
    pub fn spec(&self) -> &str {
        match self {
            DependencyEntry::Plain(spec) => spec,
            DependencyEntry::Conditional { spec, .. } => spec,
        }
    }
}

impl TryFrom<DependencyEntry> for DependencyDeclaration {
    type Error = String;

    fn try_from(entry: DependencyEntry) -> std::result::Result<Self, Self::Error> {
        let (spec, when) = match entry {
            DependencyEntry::Plain(spec) => (spec, Condition::Always),
            DependencyEntry::Conditional { spec, when } => (spec, when),
        };
        match DependencyDeclaration::parse(&spec) {
            Some(dependency) => Ok(dependency.with_when(when)),
            None => Err(format!(
                "invalid dependency '{spec}', expected a package name with optional constraints"
            )),
        }
    }
}

impl From<DependencyDeclaration> for DependencyEntry {
    fn from(dependency: DependencyDeclaration) -> Self {
        let spec = dependency.to_string();
        if dependency.when.is_always() {
            DependencyEntry::Plain(spec)
        } else {
            DependencyEntry::Conditional {
                spec,
                when: dependency.when,
            }
        }
    }
}

/// A combination that the package can never be built with.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConflictDeclaration {
    pub spec: Condition,
    #[serde(default, skip_serializing_if = "Condition::is_always")]
    pub when: Condition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl ConflictDeclaration {
    pub fn new(spec: Condition) -> Self {
        Self {
            spec,
            when: Condition::Always,
            msg: None,
        }
    }

    pub fn with_when(mut self, when: Condition) -> Self {
        self.when = when;
        self
    }

    pub fn with_msg<S: Into<String>>(mut self, msg: S) -> Self {
        self.msg = Some(msg.into());
        self
    }

    /// True if the spec satisfies both sides of the conflict.
    pub fn is_violated_by<Q: Queryable + ?Sized>(&self, spec: &Q) -> bool {
        self.spec.check(spec).is_ok() && self.when.check(spec).is_ok()
    }
}

impl std::fmt::Display for ConflictDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.spec)?;
        if !self.when.is_always() {
            write!(f, " when {}", self.when)?;
        }
        Ok(())
    }
}
