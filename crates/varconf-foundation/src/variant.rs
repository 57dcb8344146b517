// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// The chosen value of a single variant in a concrete spec.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariantValue {
    Bool(bool),
    Str(String),
}

impl VariantValue {
    /// The boolean spelled by a command line word, if any.
    ///
    /// Values given on a single line are kept as strings, this is
    /// only consulted where a boolean is expected.
    pub fn bool_word(word: &str) -> Option<bool> {
        match word {
            "true" | "True" => Some(true),
            "false" | "False" => Some(false),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VariantValue::Bool(b) => Some(*b),
            VariantValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            VariantValue::Bool(_) => None,
            VariantValue::Str(s) => Some(s),
        }
    }
}

impl std::fmt::Display for VariantValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariantValue::Bool(b) => b.fmt(f),
            VariantValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for VariantValue {
    fn from(value: bool) -> Self {
        VariantValue::Bool(value)
    }
}

impl From<&str> for VariantValue {
    fn from(value: &str) -> Self {
        VariantValue::Str(value.to_owned())
    }
}

impl From<String> for VariantValue {
    fn from(value: String) -> Self {
        VariantValue::Str(value)
    }
}
