// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use varconf_foundation::name::PkgName;
use varconf_schema::PackageDefinitionFile;

use crate::{Error, Result};

#[cfg(test)]
#[path = "./repository_test.rs"]
mod repository_test;

/// One namespace of package definition files on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Repository {
    namespace: PkgName,
    root: PathBuf,
}

impl Repository {
    pub const PACKAGES_DIR: &'static str = "packages";
    pub const FILE_NAME: &'static str = "package.yaml";

    /// A repository rooted at the given directory, which is not checked.
    pub fn new<P: Into<PathBuf>>(namespace: PkgName, root: P) -> Self {
        Self {
            namespace,
            root: root.into(),
        }
    }

    /// Open the repository directory at `path`, named by its last component.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.join(Self::PACKAGES_DIR).is_dir() {
            return Err(Error::NotARepository(path.to_owned()));
        }
        let namespace = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .parse()
            .map_err(|err| Error::InvalidName(path.display().to_string(), err))?;
        Ok(Self::new(namespace, path))
    }

    /// Find every repository directly under `root`, sorted by namespace.
    pub fn discover<P: AsRef<Path>>(root: P) -> Result<Vec<Self>> {
        let root = root.as_ref();
        let entries =
            std::fs::read_dir(root).map_err(|err| Error::ReadFailed(root.to_owned(), err))?;
        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| Error::ReadFailed(root.to_owned(), err))?;
            let path = entry.path();
            if !path.join(Self::PACKAGES_DIR).is_dir() {
                continue;
            }
            match Self::open(&path) {
                Ok(repo) => found.push(repo),
                Err(err) => tracing::warn!("skipping {path:?}: {err}"),
            }
        }
        found.sort_by(|a, b| a.namespace.cmp(&b.namespace));
        Ok(found)
    }

    pub fn namespace(&self) -> &PkgName {
        &self.namespace
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The location of the definition file for `name`, which may not exist.
    pub fn package_file(&self, name: &PkgName) -> PathBuf {
        self.root
            .join(Self::PACKAGES_DIR)
            .join(name.as_str())
            .join(Self::FILE_NAME)
    }

    pub fn contains(&self, name: &PkgName) -> bool {
        self.package_file(name).is_file()
    }

    /// The names of all packages defined in this repository, sorted.
    pub fn list_packages(&self) -> Result<Vec<PkgName>> {
        let packages = self.root.join(Self::PACKAGES_DIR);
        let entries = std::fs::read_dir(&packages)
            .map_err(|err| Error::ReadFailed(packages.clone(), err))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| Error::ReadFailed(packages.clone(), err))?;
            let path = entry.path();
            if !path.join(Self::FILE_NAME).is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match name.parse::<PkgName>() {
                Ok(name) => names.push(name),
                Err(err) => tracing::warn!("skipping {path:?}: {err}"),
            }
        }
        names.sort();
        Ok(names)
    }

    /// Read the definition file of `name` from disk.
    pub fn read_file(&self, name: &PkgName) -> Result<PackageDefinitionFile> {
        let path = self.package_file(name);
        let yaml =
            std::fs::read_to_string(&path).map_err(|err| Error::ReadFailed(path.clone(), err))?;
        let file = PackageDefinitionFile::from_yaml_str(yaml).map_err(|err| {
            Error::InvalidDefinition {
                path: path.clone(),
                source: Box::new(err),
            }
        })?;
        if &file.name != name {
            return Err(Error::NameMismatch {
                path,
                expected: name.clone(),
                found: file.name,
            });
        }
        Ok(file)
    }
}
