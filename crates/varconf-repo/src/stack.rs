// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use itertools::Itertools;
use varconf_foundation::name::{NamespacedName, PkgName};
use varconf_schema::{DefinitionError, PackageDefinition, SchedulerRule, SchedulerRuleEntry};

use crate::{Error, Repository, Result};

#[cfg(test)]
#[path = "./stack_test.rs"]
mod stack_test;

/// An ordered set of repositories that definitions are loaded from.
///
/// Earlier repositories take priority when a plain package name is
/// looked up. Loaded definitions are kept for the life of the stack,
/// so a base shared by many definitions is only read once.
#[derive(Debug, Default)]
pub struct RepositoryStack {
    repositories: Vec<Repository>,
    default_scheduler_rule: Option<SchedulerRule>,
    loaded: RwLock<HashMap<NamespacedName, Arc<PackageDefinition>>>,
}

impl RepositoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stack from every repository found under the given roots.
    ///
    /// Roots are searched in order, and within one root repositories
    /// are ordered by namespace.
    pub fn discover<I, P>(roots: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut stack = Self::new();
        for root in roots {
            for repo in Repository::discover(root)? {
                stack.push(repo);
            }
        }
        Ok(stack)
    }

    /// Add a repository with the lowest priority.
    ///
    /// A namespace that is already present keeps its existing repository.
    pub fn push(&mut self, repo: Repository) {
        if let Some(existing) = self.get_repository(repo.namespace()) {
            tracing::warn!(
                namespace = %repo.namespace(),
                "{:?} is shadowed by {:?}",
                repo.root(),
                existing.root()
            );
            return;
        }
        self.repositories.push(repo);
        self.clear_loaded();
    }

    /// Move the named namespaces to the front, in the order given.
    pub fn prioritize<'a, I>(&mut self, namespaces: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a PkgName>,
    {
        let mut ordered = Vec::with_capacity(self.repositories.len());
        for namespace in namespaces {
            let Some(index) = self
                .repositories
                .iter()
                .position(|r| r.namespace() == namespace)
            else {
                if ordered.iter().any(|r: &Repository| r.namespace() == namespace) {
                    continue;
                }
                return Err(Error::UnknownNamespace(namespace.clone()));
            };
            ordered.push(self.repositories.remove(index));
        }
        ordered.append(&mut self.repositories);
        self.repositories = ordered;
        self.clear_loaded();
        Ok(())
    }

    /// Use this rule wherever a definition asks for the default one.
    pub fn with_default_scheduler_rule(mut self, rule: SchedulerRule) -> Self {
        self.default_scheduler_rule = Some(rule);
        self.clear_loaded();
        self
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn get_repository(&self, namespace: &PkgName) -> Option<&Repository> {
        self.repositories
            .iter()
            .find(|r| r.namespace() == namespace)
    }

    /// Determine the namespace that provides the named package.
    pub fn qualify(&self, name: &NamespacedName) -> Result<NamespacedName> {
        match &name.namespace {
            Some(namespace) => {
                let repo = self
                    .get_repository(namespace)
                    .ok_or_else(|| Error::UnknownNamespace(namespace.clone()))?;
                if !repo.contains(&name.name) {
                    return Err(Error::PackageNotFound(name.clone()));
                }
                Ok(name.clone())
            }
            None => self
                .repositories
                .iter()
                .find(|r| r.contains(&name.name))
                .map(|r| NamespacedName::new(Some(r.namespace().clone()), name.name.clone()))
                .ok_or_else(|| Error::PackageNotFound(name.clone())),
        }
    }

    /// Load a definition by its plain or qualified name, eg: `peanuts.openmpi`.
    pub fn load(&self, name: &str) -> Result<Arc<PackageDefinition>> {
        let name: NamespacedName = name
            .parse()
            .map_err(|err| Error::InvalidName(name.to_owned(), err))?;
        self.load_name(&name)
    }

    pub fn load_name(&self, name: &NamespacedName) -> Result<Arc<PackageDefinition>> {
        let qualified = self.qualify(name)?;
        self.load_qualified(qualified, &mut Vec::new())
    }

    /// Every package of every repository, in priority order.
    pub fn list_packages(&self) -> Result<Vec<NamespacedName>> {
        let mut names = Vec::new();
        for repo in self.repositories.iter() {
            for name in repo.list_packages()? {
                names.push(NamespacedName::new(Some(repo.namespace().clone()), name));
            }
        }
        Ok(names)
    }

    fn clear_loaded(&mut self) {
        self.loaded = RwLock::default();
    }

    fn get_loaded(&self, name: &NamespacedName) -> Result<Option<Arc<PackageDefinition>>> {
        let loaded = self
            .loaded
            .read()
            .map_err(|err| Error::LockPoisonedRead(err.to_string()))?;
        Ok(loaded.get(name).cloned())
    }

    fn load_qualified(
        &self,
        name: NamespacedName,
        chain: &mut Vec<NamespacedName>,
    ) -> Result<Arc<PackageDefinition>> {
        if let Some(definition) = self.get_loaded(&name)? {
            return Ok(definition);
        }
        if chain.contains(&name) {
            chain.push(name);
            return Err(DefinitionError::CyclicBase {
                chain: chain.iter().join(" -> "),
            }
            .into());
        }
        let Some(namespace) = name.namespace.clone() else {
            return Err(Error::PackageNotFound(name));
        };
        let repo = self
            .get_repository(&namespace)
            .ok_or_else(|| Error::UnknownNamespace(namespace.clone()))?;
        let path = repo.package_file(&name.name);
        let mut file = repo.read_file(&name.name)?;

        let base = match &file.extends {
            None => None,
            Some(extends) => {
                let base_name = match self.qualify(extends) {
                    Ok(base_name) => base_name,
                    Err(Error::PackageNotFound(_) | Error::UnknownNamespace(_)) => {
                        return Err(DefinitionError::MissingBase {
                            package: name.to_string(),
                            base: extends.to_string(),
                        }
                        .into());
                    }
                    Err(err) => return Err(err),
                };
                chain.push(name.clone());
                let base = self.load_qualified(base_name, chain)?;
                chain.pop();
                Some(base)
            }
        };
        if let Some(rule) = &self.default_scheduler_rule {
            let uses_default = match &file.scheduler_rule {
                None => base.is_some(),
                Some(SchedulerRuleEntry::Enabled(enabled)) => *enabled,
                Some(SchedulerRuleEntry::Rule(_)) => false,
            };
            if uses_default {
                file.scheduler_rule = Some(SchedulerRuleEntry::Rule(rule.clone()));
            }
        }

        let definition = Arc::new(file.into_definition(Some(namespace), base)?);
        tracing::debug!(package = %name, ?path, "loaded package definition");
        let mut loaded = self
            .loaded
            .write()
            .map_err(|err| Error::LockPoisonedWrite(err.to_string()))?;
        Ok(Arc::clone(loaded.entry(name).or_insert(definition)))
    }
}
