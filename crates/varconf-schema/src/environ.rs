// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "./environ_test.rs"]
mod environ_test;

/// The environment that a build will be started in.
///
/// Definitions never touch the process environment themselves, they
/// describe changes which the caller applies to its own collaborator.
pub trait BuildEnvironment {
    fn set(&mut self, name: &str, value: &str);
    fn unset(&mut self, name: &str);
}

impl BuildEnvironment for HashMap<String, String> {
    fn set(&mut self, name: &str, value: &str) {
        self.insert(name.to_owned(), value.to_owned());
    }

    fn unset(&mut self, name: &str) {
        self.remove(name);
    }
}

impl BuildEnvironment for std::process::Command {
    fn set(&mut self, name: &str, value: &str) {
        self.env(name, value);
    }

    fn unset(&mut self, name: &str) {
        self.env_remove(name);
    }
}

/// An operation performed to the build environment
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvOp {
    Unset(UnsetEnv),
    Set(SetEnv),
}

impl EnvOp {
    pub fn unset<S: Into<String>>(name: S) -> Self {
        Self::Unset(UnsetEnv { unset: name.into() })
    }

    pub fn set<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self::Set(SetEnv {
            set: name.into(),
            value: value.into(),
        })
    }

    /// The name of the variable this operation changes
    pub fn name(&self) -> &str {
        match self {
            Self::Unset(op) => &op.unset,
            Self::Set(op) => &op.set,
        }
    }

    pub fn apply<E: BuildEnvironment + ?Sized>(&self, env: &mut E) {
        tracing::debug!("build environment: {}", self.bash_source());
        match self {
            Self::Unset(op) => env.unset(&op.unset),
            Self::Set(op) => env.set(&op.set, &op.value),
        }
    }

    /// Construct the bash source representation for this operation
    pub fn bash_source(&self) -> String {
        match self {
            Self::Unset(op) => format!("unset {}", op.unset),
            Self::Set(op) => format!("export {}=\"{}\"", op.set, op.value),
        }
    }
}

/// Removes a variable from the environment, eg: `unset: CPM_SOURCE_CACHE`
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnsetEnv {
    pub unset: String,
}

/// Sets a variable to a value, eg: `{set: CC, value: gcc}`
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetEnv {
    pub set: String,
    pub value: String,
}
