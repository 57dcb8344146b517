// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use varconf_foundation::compiler::CompilerSpec;
use varconf_foundation::name::{PkgName, VariantName};
use varconf_foundation::spec::{Queryable, Spec};
use varconf_foundation::variant::VariantValue;
use varconf_foundation::version::Version;

use crate::variant::VariantDeclaration;
use crate::{DefinitionError, Error, Result};

#[cfg(test)]
#[path = "./schema_test.rs"]
mod schema_test;

/// The ordered set of variants exposed by one package definition.
///
/// A schema derived from an ancestor starts with every inherited
/// entry, in the ancestor's order. Local declarations are appended,
/// while overrides replace an inherited entry in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantSchema {
    package: PkgName,
    entries: IndexMap<VariantName, VariantDeclaration>,
    inherited: HashSet<VariantName>,
    local: HashSet<VariantName>,
}

impl VariantSchema {
    pub fn new(package: PkgName) -> Self {
        Self {
            package,
            entries: IndexMap::new(),
            inherited: HashSet::new(),
            local: HashSet::new(),
        }
    }

    /// Declare every variant in order and validate the result.
    pub fn from_declarations<I>(package: PkgName, declarations: I) -> Result<Self, DefinitionError>
    where
        I: IntoIterator<Item = VariantDeclaration>,
    {
        let mut schema = Self::new(package);
        for declaration in declarations {
            schema.declare(declaration)?;
        }
        schema.validate()?;
        Ok(schema)
    }

    /// Start the schema of a package that extends this one.
    ///
    /// The ancestor itself is left untouched.
    pub fn derive(&self, package: PkgName) -> Self {
        Self {
            package,
            entries: self.entries.clone(),
            inherited: self.entries.keys().cloned().collect(),
            local: HashSet::new(),
        }
    }

    pub fn package(&self) -> &PkgName {
        &self.package
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&VariantDeclaration> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate the declarations in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &VariantDeclaration> {
        self.entries.values()
    }

    /// True if the named variant was declared or overridden by this
    /// package rather than inherited unchanged.
    pub fn is_local(&self, name: &str) -> bool {
        self.local.contains(name)
    }

    /// Register a new variant.
    ///
    /// Declaring an inherited name replaces the inherited entry, as long
    /// as the kind of variant stays the same.
    pub fn declare(&mut self, declaration: VariantDeclaration) -> Result<(), DefinitionError> {
        if self.local.contains(&declaration.name) {
            return Err(DefinitionError::DuplicateVariant {
                package: self.package.clone(),
                variant: declaration.name,
            });
        }
        self.check_default(&declaration)?;
        if self.inherited.contains(&declaration.name) {
            return self.replace(declaration);
        }
        self.local.insert(declaration.name.clone());
        self.entries.insert(declaration.name.clone(), declaration);
        Ok(())
    }

    /// Replace an inherited variant entirely.
    ///
    /// Nothing of the inherited entry is kept apart from its position.
    pub fn override_variant(
        &mut self,
        declaration: VariantDeclaration,
    ) -> Result<(), DefinitionError> {
        if !self.inherited.contains(&declaration.name) {
            return Err(DefinitionError::OverrideMissing {
                package: self.package.clone(),
                variant: declaration.name,
            });
        }
        if self.local.contains(&declaration.name) {
            return Err(DefinitionError::DuplicateVariant {
                package: self.package.clone(),
                variant: declaration.name,
            });
        }
        self.check_default(&declaration)?;
        self.replace(declaration)
    }

    fn replace(&mut self, declaration: VariantDeclaration) -> Result<(), DefinitionError> {
        if let Some(existing) = self.entries.get_mut(&declaration.name) {
            if existing.kind.conflicts_with(&declaration.kind) {
                return Err(DefinitionError::ConflictingKind {
                    package: self.package.clone(),
                    variant: declaration.name,
                    inherited: existing.kind.to_string(),
                    declared: declaration.kind.to_string(),
                });
            }
            self.local.insert(declaration.name.clone());
            *existing = declaration;
        }
        Ok(())
    }

    fn check_default(&self, declaration: &VariantDeclaration) -> Result<(), DefinitionError> {
        declaration
            .kind
            .check(&declaration.default)
            .map_err(|reason| DefinitionError::InvalidDefault {
                package: self.package.clone(),
                variant: declaration.name.clone(),
                reason,
            })
    }

    /// Check that every condition only refers to variants declared
    /// before it, so that the schema can be resolved in order.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        for (index, declaration) in self.entries.values().enumerate() {
            for reference in declaration.when.referenced_variants(&self.package) {
                match self.entries.get_index_of(reference.as_str()) {
                    Some(position) if position < index => continue,
                    Some(_) if self.reaches(reference, &declaration.name) => {
                        return Err(DefinitionError::CircularReference {
                            package: self.package.clone(),
                            variant: declaration.name.clone(),
                            reference: reference.clone(),
                        })
                    }
                    Some(_) => {
                        return Err(DefinitionError::ForwardReference {
                            package: self.package.clone(),
                            variant: declaration.name.clone(),
                            reference: reference.clone(),
                        })
                    }
                    None => {
                        return Err(DefinitionError::UnknownReference {
                            package: self.package.clone(),
                            context: format!("the condition of '{}'", declaration.name),
                            reference: reference.clone(),
                        })
                    }
                }
            }
        }
        Ok(())
    }

    /// True if the condition of `from` depends, directly or not, on `target`.
    fn reaches(&self, from: &VariantName, target: &VariantName) -> bool {
        let mut seen = HashSet::new();
        let mut pending = vec![from];
        while let Some(next) = pending.pop() {
            if next == target {
                return true;
            }
            if !seen.insert(next) {
                continue;
            }
            if let Some(declaration) = self.entries.get(next) {
                pending.extend(declaration.when.referenced_variants(&self.package));
            }
        }
        false
    }

    /// Decide which variants exist for the given spec, and their value.
    ///
    /// Declarations are evaluated in order, each one seeing only the
    /// variants that were already decided. An active variant takes
    /// its value from the spec, falling back to its default.
    fn decide<'a, Q>(&'a self, spec: &'a Q) -> Vec<(&'a VariantDeclaration, &'a VariantValue)>
    where
        Q: Queryable + ?Sized,
    {
        let mut view = DecidedView {
            spec,
            decided: HashMap::new(),
        };
        let mut active = Vec::with_capacity(self.entries.len());
        for declaration in self.entries.values() {
            let compat = declaration.when.check(&view);
            if !compat.is_ok() {
                tracing::debug!(
                    package = %self.package,
                    variant = %declaration.name,
                    "variant is inactive: {compat}"
                );
                continue;
            }
            let value = spec
                .variant(&declaration.name)
                .unwrap_or(&declaration.default);
            view.decided.insert(declaration.name.as_str(), value);
            active.push((declaration, value));
        }
        active
    }

    /// The names of the variants whose condition holds for the spec.
    pub fn resolve_active_variants<Q>(&self, spec: &Q) -> IndexSet<VariantName>
    where
        Q: Queryable + ?Sized,
    {
        self.decide(spec)
            .into_iter()
            .map(|(declaration, _)| declaration.name.clone())
            .collect()
    }

    /// Store each declared value in the form its kind expects.
    ///
    /// Single line specs keep `name=value` as a string, so `debug=true`
    /// only becomes a boolean once `debug` is known to be one.
    pub fn normalize_values(&self, spec: &mut Spec) {
        for (name, value) in spec.variants.iter_mut() {
            let normal = self
                .entries
                .get(name)
                .and_then(|declaration| declaration.kind.normalize(value));
            if let Some(normal) = normal {
                *value = normal;
            }
        }
    }

    /// The spec with its values normalized, borrowed when nothing changes.
    pub fn normalized<'a>(&self, spec: &'a Spec) -> Cow<'a, Spec> {
        let needed = spec.variants.iter().any(|(name, value)| {
            self.entries
                .get(name)
                .is_some_and(|declaration| declaration.kind.normalize(value).is_some())
        });
        if !needed {
            return Cow::Borrowed(spec);
        }
        let mut spec = spec.clone();
        self.normalize_values(&mut spec);
        Cow::Owned(spec)
    }

    /// Bring a spec in line with this schema.
    ///
    /// Values are normalized, active variants without a value receive
    /// their default, and values for inactive variants are removed.
    /// Variants that this schema does not declare are left for
    /// [`Self::validate_spec`] to report.
    pub fn fill_defaults(&self, spec: &mut Spec) {
        self.normalize_values(spec);
        let active: IndexMap<VariantName, VariantValue> = self
            .decide(&*spec)
            .into_iter()
            .map(|(declaration, value)| (declaration.name.clone(), value.clone()))
            .collect();
        spec.variants.retain(|name, _| {
            active.contains_key(name) || !self.entries.contains_key(name)
        });
        for (name, value) in active {
            spec.variants.entry(name).or_insert(value);
        }
    }

    /// Check that the spec has a valid value for exactly the variants
    /// that are active for it.
    pub fn validate_spec(&self, spec: &Spec) -> Result<()> {
        let spec = self.normalized(spec);
        let spec = &*spec;
        let invalid = |reason: String| Error::InvalidSpec {
            package: self.package.clone(),
            spec: spec.to_string(),
            reason,
        };
        let active = self.decide(spec);
        for (declaration, _) in active.iter() {
            let Some(value) = spec.variant(&declaration.name) else {
                return Err(invalid(format!(
                    "no value given for active variant '{}'",
                    declaration.name
                )));
            };
            declaration
                .kind
                .check(value)
                .map_err(|reason| invalid(format!("{}: {reason}", declaration.name)))?;
        }
        for name in spec.variants.keys() {
            if active.iter().any(|(declaration, _)| &declaration.name == name) {
                continue;
            }
            let reason = match self.entries.get(name) {
                Some(declaration) => format!(
                    "variant '{name}' is not active, it requires '{}'",
                    declaration.when
                ),
                None => format!("unknown variant '{name}'"),
            };
            return Err(invalid(reason));
        }
        Ok(())
    }
}

/// A view of a spec that only exposes the variants decided so far.
struct DecidedView<'a, Q: ?Sized> {
    spec: &'a Q,
    decided: HashMap<&'a str, &'a VariantValue>,
}

impl<Q: Queryable + ?Sized> Queryable for DecidedView<'_, Q> {
    fn name(&self) -> &PkgName {
        self.spec.name()
    }

    fn version(&self) -> &Version {
        self.spec.version()
    }

    fn compiler(&self) -> Option<&CompilerSpec> {
        self.spec.compiler()
    }

    fn scheduler(&self) -> Option<&str> {
        self.spec.scheduler()
    }

    fn variant(&self, name: &str) -> Option<&VariantValue> {
        self.decided.get(name).copied()
    }

    fn dependency(&self, name: &str) -> Option<&Spec> {
        self.spec.dependency(name)
    }
}
