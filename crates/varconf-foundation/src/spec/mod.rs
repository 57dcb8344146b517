// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::compiler::CompilerSpec;
use crate::name::{PkgName, VariantName};
use crate::variant::VariantValue;
use crate::version::Version;

mod error;

pub use error::{Error, Result};


/// Parse a spec from its single line form.
///
/// This will panic if the spec is invalid,
/// and should only be used for testing.
///
/// ```
/// # #[macro_use] extern crate varconf_foundation;
/// # fn main() {
/// spec!("openmpi@5.0.0rc1 +romio schedulers=slurm");
/// # }
/// ```
#[macro_export]
macro_rules! spec {
    ($spec:literal) => {
        $spec.parse::<$crate::spec::Spec>().unwrap()
    };
}

/// The read-only view of a build that conditions are evaluated against.
///
/// Conditions never need more than this, which allows partially
/// decided views of a spec to be queried the same way as a complete one.
pub trait Queryable {
    /// The name of the package being built
    fn name(&self) -> &PkgName;

    /// The concrete version being built
    fn version(&self) -> &Version;

    /// The compiler used for the build, if known
    fn compiler(&self) -> Option<&CompilerSpec>;

    /// The scheduler integration requested for the build, if any
    fn scheduler(&self) -> Option<&str>;

    /// The chosen value of the named variant, if it has one
    fn variant(&self, name: &str) -> Option<&VariantValue>;

    /// The resolved spec of the named dependency, if present
    fn dependency(&self, name: &str) -> Option<&Spec>;
}

impl<T: Queryable + ?Sized> Queryable for &T {
    fn name(&self) -> &PkgName {
        (**self).name()
    }

    fn version(&self) -> &Version {
        (**self).version()
    }

    fn compiler(&self) -> Option<&CompilerSpec> {
        (**self).compiler()
    }

    fn scheduler(&self) -> Option<&str> {
        (**self).scheduler()
    }

    fn variant(&self, name: &str) -> Option<&VariantValue> {
        (**self).variant(name)
    }

    fn dependency(&self, name: &str) -> Option<&Spec> {
        (**self).dependency(name)
    }
}

/// A fully resolved description of one package build.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    pub name: PkgName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<PkgName>,
    pub version: Version,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variants: IndexMap<VariantName, VariantValue>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dependencies: IndexMap<PkgName, Spec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<CompilerSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<String>,
}

impl Spec {
    pub fn new(name: PkgName, version: Version) -> Self {
        Self {
            name,
            namespace: None,
            version,
            variants: IndexMap::new(),
            dependencies: IndexMap::new(),
            compiler: None,
            scheduler: None,
        }
    }

    pub fn with_namespace(mut self, namespace: PkgName) -> Self {
        self.namespace = Some(namespace);
        self
    }

    pub fn with_variant<V: Into<VariantValue>>(mut self, name: VariantName, value: V) -> Self {
        self.variants.insert(name, value.into());
        self
    }

    pub fn with_dependency(mut self, name: PkgName, spec: Spec) -> Self {
        self.dependencies.insert(name, spec);
        self
    }

    pub fn with_compiler(mut self, compiler: CompilerSpec) -> Self {
        self.compiler = Some(compiler);
        self
    }

    pub fn with_scheduler<S: Into<String>>(mut self, scheduler: S) -> Self {
        self.scheduler = Some(scheduler.into());
        self
    }
}

impl std::fmt::Display for Spec {
    /// Renders the spec in query syntax, eg: `openmpi@5.0.0 +romio %gcc@12.2.0`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.version)?;
        for (name, value) in self.variants.iter() {
            match value {
                VariantValue::Bool(true) => write!(f, " +{name}")?,
                VariantValue::Bool(false) => write!(f, " ~{name}")?,
                VariantValue::Str(s) => write!(f, " {name}={s}")?,
            }
        }
        if let Some(scheduler) = &self.scheduler {
            write!(f, " schedulers={scheduler}")?;
        }
        if let Some(compiler) = &self.compiler {
            write!(f, " %{compiler}")?;
        }
        Ok(())
    }
}

impl FromStr for Spec {
    type Err = Error;

    /// Parses the form produced by [`std::fmt::Display`], dependencies
    /// cannot be expressed on a single line and must be added separately.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidSpecError {
            spec: s.to_owned(),
            reason,
        };
        let mut tokens = s.split_whitespace();
        let Some(ident) = tokens.next() else {
            return Err(invalid("a spec cannot be empty".into()));
        };
        let Some((name, version)) = ident.split_once('@') else {
            return Err(invalid(format!("expected <name>@<version>, got '{ident}'")));
        };
        let mut spec = Spec::new(name.parse()?, version.parse()?);
        for token in tokens {
            if let Some(name) = token.strip_prefix('+') {
                spec.variants.insert(name.parse()?, VariantValue::Bool(true));
            } else if let Some(name) = token.strip_prefix(['~', '-']) {
                spec.variants.insert(name.parse()?, VariantValue::Bool(false));
            } else if let Some(compiler) = token.strip_prefix('%') {
                spec.compiler = Some(compiler.parse()?);
            } else if let Some((key, value)) = token.split_once('=') {
                if key == "schedulers" {
                    spec.scheduler = Some(value.to_owned());
                } else {
                    spec
                        .variants
                        .insert(key.parse()?, VariantValue::Str(value.to_owned()));
                }
            } else {
                return Err(invalid(format!("unexpected token '{token}'")));
            }
        }
        Ok(spec)
    }
}

impl Queryable for Spec {
    fn name(&self) -> &PkgName {
        &self.name
    }

    fn version(&self) -> &Version {
        &self.version
    }

    fn compiler(&self) -> Option<&CompilerSpec> {
        self.compiler.as_ref()
    }

    fn scheduler(&self) -> Option<&str> {
        self.scheduler.as_deref()
    }

    fn variant(&self, name: &str) -> Option<&VariantValue> {
        self.variants.get(name)
    }

    fn dependency(&self, name: &str) -> Option<&Spec> {
        self.dependencies.get(name)
    }
}
