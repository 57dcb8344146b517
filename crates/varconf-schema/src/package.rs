// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use serde::Serialize;
use varconf_foundation::name::{NamespacedName, PkgName, VariantName};
use varconf_foundation::spec::Spec;
use varconf_foundation::version::Version;

use crate::args::{ArgRule, ConfigArg, SchedulerRule};
use crate::environ::{BuildEnvironment, EnvOp};
use crate::requirements::{
    BuildSystem,
    ConflictDeclaration,
    DependencyDeclaration,
    VersionDeclaration,
};
use crate::schema::VariantSchema;
use crate::variant::VariantDeclaration;
use crate::{DefinitionError, Error, Result};

#[cfg(test)]
#[path = "./package_test.rs"]
mod package_test;

/// Everything needed to turn a spec into build arguments for one package.
///
/// A definition may extend a base definition. The chain of bases is
/// walked from the root to this definition whenever arguments are
/// produced, each link appending to the output of the one before it.
#[derive(Clone, Debug)]
pub struct PackageDefinition {
    name: PkgName,
    namespace: Option<PkgName>,
    description: Option<String>,
    homepage: Option<String>,
    git: Option<String>,
    maintainers: Vec<String>,
    build_system: BuildSystem,
    versions: Vec<VersionDeclaration>,
    schema: VariantSchema,
    dependencies: Vec<DependencyDeclaration>,
    conflicts: Vec<ConflictDeclaration>,
    environment: Vec<EnvOp>,
    scheduler_rule: Option<SchedulerRule>,
    args: Vec<ArgRule>,
    base: Option<Arc<PackageDefinition>>,
}

impl PackageDefinition {
    /// Start a definition that has no base.
    pub fn builder(name: PkgName) -> PackageBuilder {
        PackageBuilder::new(name, None)
    }

    /// Start a definition that extends `base`.
    ///
    /// The new definition inherits every variant of the base and applies
    /// the default [`SchedulerRule`] unless another one is given.
    pub fn derive(name: PkgName, base: Arc<PackageDefinition>) -> PackageBuilder {
        PackageBuilder::new(name, Some(base))
    }

    pub fn name(&self) -> &PkgName {
        &self.name
    }

    pub fn namespace(&self) -> Option<&PkgName> {
        self.namespace.as_ref()
    }

    /// The name of this definition including its namespace, eg: `peanuts.openmpi`
    pub fn qualified_name(&self) -> NamespacedName {
        NamespacedName::new(self.namespace.clone(), self.name.clone())
    }

    /// The first description found from this definition to its root.
    pub fn description(&self) -> Option<&str> {
        self.chain()
            .into_iter()
            .rev()
            .find_map(|link| link.description.as_deref())
    }

    pub fn homepage(&self) -> Option<&str> {
        self.chain()
            .into_iter()
            .rev()
            .find_map(|link| link.homepage.as_deref())
    }

    pub fn git(&self) -> Option<&str> {
        self.chain()
            .into_iter()
            .rev()
            .find_map(|link| link.git.as_deref())
    }

    pub fn maintainers(&self) -> &[String] {
        self.chain()
            .into_iter()
            .rev()
            .map(|link| link.maintainers.as_slice())
            .find(|m| !m.is_empty())
            .unwrap_or_default()
    }

    pub fn build_system(&self) -> BuildSystem {
        self.build_system
    }

    /// The merged variant schema of this definition and its bases.
    pub fn schema(&self) -> &VariantSchema {
        &self.schema
    }

    pub fn base(&self) -> Option<&Arc<PackageDefinition>> {
        self.base.as_ref()
    }

    /// The rules added by this definition alone.
    pub fn local_args(&self) -> &[ArgRule] {
        &self.args
    }

    pub fn scheduler_rule(&self) -> Option<&SchedulerRule> {
        self.scheduler_rule.as_ref()
    }

    /// Every definition in the chain, starting with the root.
    pub fn chain(&self) -> Vec<&PackageDefinition> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(base) = current.base.as_deref() {
            chain.push(base);
            current = base;
        }
        chain.reverse();
        chain
    }

    /// All declared versions, those of this definition first.
    ///
    /// A version declared again by a derived definition hides the
    /// declaration of its base.
    pub fn versions(&self) -> Vec<&VersionDeclaration> {
        let mut versions: Vec<&VersionDeclaration> = Vec::new();
        for link in self.chain().into_iter().rev() {
            for declared in link.versions.iter() {
                if !versions.iter().any(|v| v.version == declared.version) {
                    versions.push(declared);
                }
            }
        }
        versions
    }

    pub fn get_version(&self, version: &Version) -> Option<&VersionDeclaration> {
        self.versions().into_iter().find(|v| &v.version == version)
    }

    /// The dependencies of every definition in the chain.
    pub fn dependencies(&self) -> Vec<&DependencyDeclaration> {
        self.chain()
            .into_iter()
            .flat_map(|link| link.dependencies.iter())
            .collect()
    }

    /// The conflicts of every definition in the chain.
    pub fn conflicts(&self) -> Vec<&ConflictDeclaration> {
        self.chain()
            .into_iter()
            .flat_map(|link| link.conflicts.iter())
            .collect()
    }

    /// The environment operations of every definition, root first.
    pub fn environment(&self) -> Vec<&EnvOp> {
        self.chain()
            .into_iter()
            .flat_map(|link| link.environment.iter())
            .collect()
    }

    /// Check that this definition can build the given spec.
    pub fn validate(&self, spec: &Spec) -> Result<()> {
        let spec = self.schema.normalized(spec);
        let spec = &*spec;
        if spec.name != self.name {
            return Err(Error::NameMismatch {
                expected: self.name.clone(),
                found: spec.name.clone(),
            });
        }
        let versions = self.versions();
        if !versions.is_empty() && !versions.iter().any(|v| v.version == spec.version) {
            return Err(Error::VersionNotDeclared {
                package: self.name.clone(),
                version: spec.version.clone(),
            });
        }
        self.schema.validate_spec(spec)?;
        for dependency in self.dependencies() {
            let compat = dependency.check(spec);
            if !compat.is_ok() {
                return Err(Error::DependencyViolation {
                    package: self.name.clone(),
                    dependency: dependency.to_string(),
                    reason: compat.to_string(),
                });
            }
        }
        for conflict in self.conflicts() {
            if conflict.is_violated_by(spec) {
                return Err(Error::ConflictViolation {
                    package: self.name.clone(),
                    conflict: conflict.to_string(),
                    msg: conflict.msg.clone(),
                });
            }
        }
        Ok(())
    }

    /// Produce the ordered build arguments for a spec.
    ///
    /// The spec is validated first, so an invalid spec never yields
    /// partial output. Each link of the chain then appends its
    /// scheduler rule followed by its own rules, starting at the root.
    pub fn build_args(&self, spec: &Spec) -> Result<Vec<ConfigArg>> {
        let spec = self.schema.normalized(spec);
        let spec = &*spec;
        self.validate(spec)?;
        let mut args = Vec::new();
        for link in self.chain() {
            let start = args.len();
            if let Some(arg) = link.scheduler_rule.as_ref().and_then(|r| r.apply(spec)) {
                args.push(arg);
            }
            for rule in link.args.iter() {
                rule.emit(spec, &mut args);
            }
            tracing::debug!(
                package = %link.qualified_name(),
                count = args.len() - start,
                "appended build arguments"
            );
        }
        Ok(args)
    }

    /// Apply the environment operations of the chain, root first.
    pub fn setup_build_environment<E: BuildEnvironment + ?Sized>(&self, env: &mut E) {
        for op in self.environment() {
            op.apply(env);
        }
    }

    /// Everything an external invoker needs to build the spec.
    pub fn plan(&self, spec: &Spec) -> Result<BuildPlan> {
        let args = self.build_args(spec)?;
        Ok(BuildPlan {
            package: self.qualified_name(),
            version: spec.version.clone(),
            build_system: self.build_system,
            program: self.build_system.program().to_owned(),
            environment: self.environment().into_iter().cloned().collect(),
            args,
        })
    }
}

/// The resolved result for one spec, ready to be handed to a build tool.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BuildPlan {
    pub package: NamespacedName,
    pub version: Version,
    pub build_system: BuildSystem,
    pub program: String,
    pub environment: Vec<EnvOp>,
    pub args: Vec<ConfigArg>,
}

impl BuildPlan {
    /// The full command line, program first.
    pub fn command_line(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(ToString::to_string))
            .collect()
    }
}

/// Assembles a [`PackageDefinition`], deferring validation to [`Self::build`].
#[derive(Debug)]
pub struct PackageBuilder {
    name: PkgName,
    namespace: Option<PkgName>,
    description: Option<String>,
    homepage: Option<String>,
    git: Option<String>,
    maintainers: Vec<String>,
    build_system: Option<BuildSystem>,
    versions: Vec<VersionDeclaration>,
    schema: VariantSchema,
    dependencies: Vec<DependencyDeclaration>,
    conflicts: Vec<ConflictDeclaration>,
    environment: Vec<EnvOp>,
    scheduler_rule: Option<SchedulerRule>,
    args: Vec<ArgRule>,
    base: Option<Arc<PackageDefinition>>,
    errors: Vec<DefinitionError>,
}

impl PackageBuilder {
    fn new(name: PkgName, base: Option<Arc<PackageDefinition>>) -> Self {
        let schema = match &base {
            Some(base) => base.schema.derive(name.clone()),
            None => VariantSchema::new(name.clone()),
        };
        Self {
            scheduler_rule: base.as_ref().map(|_| SchedulerRule::default()),
            name,
            namespace: None,
            description: None,
            homepage: None,
            git: None,
            maintainers: Vec::new(),
            build_system: None,
            versions: Vec::new(),
            schema,
            dependencies: Vec::new(),
            conflicts: Vec::new(),
            environment: Vec::new(),
            args: Vec::new(),
            base,
            errors: Vec::new(),
        }
    }

    pub fn namespace(mut self, namespace: PkgName) -> Self {
        self.namespace = Some(namespace);
        self
    }

    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn homepage<S: Into<String>>(mut self, homepage: S) -> Self {
        self.homepage = Some(homepage.into());
        self
    }

    pub fn git<S: Into<String>>(mut self, git: S) -> Self {
        self.git = Some(git.into());
        self
    }

    pub fn maintainer<S: Into<String>>(mut self, maintainer: S) -> Self {
        self.maintainers.push(maintainer.into());
        self
    }

    pub fn build_system(mut self, build_system: BuildSystem) -> Self {
        self.build_system = Some(build_system);
        self
    }

    pub fn version(mut self, version: VersionDeclaration) -> Self {
        self.versions.push(version);
        self
    }

    /// Declare a variant, see [`VariantSchema::declare`].
    pub fn variant(mut self, declaration: VariantDeclaration) -> Self {
        if let Err(err) = self.schema.declare(declaration) {
            self.errors.push(err);
        }
        self
    }

    /// Replace an inherited variant, see [`VariantSchema::override_variant`].
    pub fn override_variant(mut self, declaration: VariantDeclaration) -> Self {
        if let Err(err) = self.schema.override_variant(declaration) {
            self.errors.push(err);
        }
        self
    }

    pub fn depends_on(mut self, dependency: DependencyDeclaration) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn conflict(mut self, conflict: ConflictDeclaration) -> Self {
        self.conflicts.push(conflict);
        self
    }

    pub fn env(mut self, op: EnvOp) -> Self {
        self.environment.push(op);
        self
    }

    /// Replace the scheduler rule, or remove it with `None`.
    pub fn scheduler_rule(mut self, rule: Option<SchedulerRule>) -> Self {
        self.scheduler_rule = rule;
        self
    }

    pub fn arg(mut self, rule: ArgRule) -> Self {
        self.args.push(rule);
        self
    }

    /// Validate and finish the definition.
    pub fn build(self) -> Result<PackageDefinition, DefinitionError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        self.schema.validate()?;

        let unknown = |context: String, reference: &VariantName| {
            DefinitionError::UnknownReference {
                package: self.name.clone(),
                context,
                reference: reference.clone(),
            }
        };
        for rule in self.args.iter() {
            for (variant, needs_bool) in rule.referenced_variants(&self.name) {
                let Some(declaration) = self.schema.get(variant) else {
                    return Err(unknown(rule.describe(), variant));
                };
                if needs_bool && !declaration.kind.is_bool() {
                    return Err(DefinitionError::RuleKindMismatch {
                        package: self.name.clone(),
                        variant: variant.clone(),
                        rule: rule.describe(),
                    });
                }
            }
        }
        for dependency in self.dependencies.iter() {
            for variant in dependency.when.referenced_variants(&self.name) {
                if !self.schema.contains(variant) {
                    return Err(unknown(format!("dependency '{dependency}'"), variant));
                }
            }
        }
        for conflict in self.conflicts.iter() {
            let references = conflict
                .spec
                .referenced_variants(&self.name)
                .into_iter()
                .chain(conflict.when.referenced_variants(&self.name));
            for variant in references {
                if !self.schema.contains(variant) {
                    return Err(unknown(format!("conflict '{conflict}'"), variant));
                }
            }
        }

        let build_system = self
            .build_system
            .or_else(|| self.base.as_ref().map(|b| b.build_system))
            .unwrap_or_default();
        Ok(PackageDefinition {
            name: self.name,
            namespace: self.namespace,
            description: self.description,
            homepage: self.homepage,
            git: self.git,
            maintainers: self.maintainers,
            build_system,
            versions: self.versions,
            schema: self.schema,
            dependencies: self.dependencies,
            conflicts: self.conflicts,
            environment: self.environment,
            scheduler_rule: self.scheduler_rule,
            args: self.args,
            base: self.base,
        })
    }
}
