// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use varconf_foundation::name::{NamespacedName, PkgName};
use varconf_foundation::FromYaml;

use crate::args::{ArgRule, SchedulerRule};
use crate::environ::EnvOp;
use crate::package::PackageDefinition;
use crate::requirements::{
    BuildSystem,
    ConflictDeclaration,
    DependencyDeclaration,
    DependencyEntry,
    VersionDeclaration,
};
use crate::variant::{VariantDeclaration, VariantEntry};
use crate::{DefinitionError, Result};

#[cfg(test)]
#[path = "./file_test.rs"]
mod file_test;

/// The on-disk form of a package definition.
///
/// ```yaml
/// name: openmpi
/// extends: builtin.openmpi
/// git: https://github.com/tsukuba-hpcs/ompi-peanuts.git
/// versions:
///   - version: 5.0.0rc12-peanuts
///     branch: peanuts
///     submodules: true
/// variants:
///   - name: peanuts
///     default: false
///     when: +romio
/// args:
///   - flag: --enable-debug
///     when: +debug
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageDefinitionFile {
    pub name: PkgName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<NamespacedName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintainers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_system: Option<BuildSystem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<VersionDeclaration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<VariantEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<ConflictDeclaration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<EnvOp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler_rule: Option<SchedulerRuleEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ArgRule>,
}

/// How a definition file configures its [`SchedulerRule`].
///
/// When omitted, derived definitions apply the default rule and
/// root definitions apply none.
///
/// ```yaml
/// scheduler_rule: false
/// scheduler_rule: {since: "5:", reserved: tm, flag: --without-pbs}
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchedulerRuleEntry {
    /// `true` applies the default rule, `false` removes any rule
    Enabled(bool),
    Rule(SchedulerRule),
}

impl PackageDefinitionFile {
    /// Read a definition file from yaml.
    pub fn from_yaml_str<S: Into<String>>(yaml: S) -> Result<Self> {
        Ok(<Self as FromYaml>::from_yaml(yaml)?)
    }

    /// Turn this file into a definition.
    ///
    /// When the file names a base with `extends`, the resolved base must
    /// be given, the lookup itself is up to the caller.
    pub fn into_definition(
        self,
        namespace: Option<PkgName>,
        base: Option<Arc<PackageDefinition>>,
    ) -> Result<PackageDefinition, DefinitionError> {
        let qualified = NamespacedName::new(namespace.clone(), self.name.clone());
        let mut builder = match (&self.extends, base) {
            (Some(_), Some(base)) => PackageDefinition::derive(self.name, base),
            (None, None) => PackageDefinition::builder(self.name),
            (Some(extends), None) => {
                return Err(DefinitionError::MissingBase {
                    package: qualified.to_string(),
                    base: extends.to_string(),
                })
            }
            (None, Some(base)) => {
                return Err(DefinitionError::MissingBase {
                    package: qualified.to_string(),
                    base: format!("{} (given but not named by 'extends')", base.qualified_name()),
                })
            }
        };
        if let Some(namespace) = namespace {
            builder = builder.namespace(namespace);
        }
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        if let Some(homepage) = self.homepage {
            builder = builder.homepage(homepage);
        }
        if let Some(git) = self.git {
            builder = builder.git(git);
        }
        for maintainer in self.maintainers {
            builder = builder.maintainer(maintainer);
        }
        if let Some(build_system) = self.build_system {
            builder = builder.build_system(build_system);
        }
        for version in self.versions {
            builder = builder.version(version);
        }
        for entry in self.variants {
            let is_override = entry.is_override;
            let declaration = VariantDeclaration::from(entry);
            builder = if is_override {
                builder.override_variant(declaration)
            } else {
                builder.variant(declaration)
            };
        }
        for entry in self.dependencies {
            let spec = entry.spec().to_owned();
            let dependency = DependencyDeclaration::try_from(entry).map_err(|_| {
                DefinitionError::InvalidDependency {
                    package: qualified.name.clone(),
                    spec,
                }
            })?;
            builder = builder.depends_on(dependency);
        }
        for conflict in self.conflicts {
            builder = builder.conflict(conflict);
        }
        for op in self.environment {
            builder = builder.env(op);
        }
        match self.scheduler_rule {
            None => {}
            Some(SchedulerRuleEntry::Enabled(false)) => builder = builder.scheduler_rule(None),
            Some(SchedulerRuleEntry::Enabled(true)) => {
                builder = builder.scheduler_rule(Some(SchedulerRule::default()))
            }
            Some(SchedulerRuleEntry::Rule(rule)) => builder = builder.scheduler_rule(Some(rule)),
        }
        for rule in self.args {
            builder = builder.arg(rule);
        }
        builder.build()
    }
}
