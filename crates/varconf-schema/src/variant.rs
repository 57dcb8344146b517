// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use varconf_foundation::name::VariantName;
use varconf_foundation::variant::VariantValue;
use varconf_query::Condition;

/// The set of values that a variant may take.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VariantKind {
    Bool,
    /// One of a fixed set of strings
    Enum(IndexSet<String>),
}

impl VariantKind {
    /// Create an enumerated kind from its allowed values.
    pub fn choices<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(values.into_iter().map(Into::into).collect())
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    /// True if the two kinds cannot describe the same variant.
    ///
    /// Enumerated kinds may change their choices when overridden,
    /// but a variant can never switch between boolean and enumerated.
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.is_bool() != other.is_bool()
    }

    /// The value as this kind stores it, if it was given in another form.
    ///
    /// Boolean words become booleans for a boolean kind, and a boolean
    /// becomes its word when that word is one of the choices.
    pub fn normalize(&self, value: &VariantValue) -> Option<VariantValue> {
        match (self, value) {
            (Self::Bool, VariantValue::Str(s)) => VariantValue::bool_word(s).map(VariantValue::Bool),
            (Self::Enum(choices), VariantValue::Bool(b)) => {
                let word = b.to_string();
                choices.contains(&word).then(|| VariantValue::Str(word))
            }
            _ => None,
        }
    }

    /// Check that the given value is allowed by this kind.
    pub fn check(&self, value: &VariantValue) -> std::result::Result<(), String> {
        match (self, value) {
            (Self::Bool, VariantValue::Bool(_)) => Ok(()),
            (Self::Bool, VariantValue::Str(s)) => {
                Err(format!("expected a boolean value, got '{s}'"))
            }
            (Self::Enum(choices), VariantValue::Str(s)) if choices.contains(s) => Ok(()),
            (Self::Enum(choices), other) => Err(format!(
                "'{other}' is not one of {}",
                choices.iter().map(|c| format!("'{c}'")).join(", ")
            )),
        }
    }
}

impl std::fmt::Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool => f.write_str("a boolean"),
            Self::Enum(choices) => write!(f, "one of [{}]", choices.iter().join(", ")),
        }
    }
}

/// One build option exposed by a package.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariantDeclaration {
    pub name: VariantName,
    pub kind: VariantKind,
    pub default: VariantValue,
    pub description: String,
    /// The variant only exists for specs that satisfy this condition
    pub when: Condition,
}

impl VariantDeclaration {
    /// A boolean variant with the given default.
    pub fn boolean(name: VariantName, default: bool) -> Self {
        Self {
            name,
            kind: VariantKind::Bool,
            default: VariantValue::Bool(default),
            description: String::new(),
            when: Condition::Always,
        }
    }

    /// An enumerated variant with the given default.
    pub fn choice<I, S, D>(name: VariantName, values: I, default: D) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        D: Into<String>,
    {
        Self {
            name,
            kind: VariantKind::choices(values),
            default: VariantValue::Str(default.into()),
            description: String::new(),
            when: Condition::Always,
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_when(mut self, when: Condition) -> Self {
        self.when = when;
        self
    }

    /// True if this variant may be inactive for some specs.
    pub fn is_conditional(&self) -> bool {
        !self.when.is_always()
    }
}

/// The serialized form of a variant declaration.
///
/// The presence of `values` makes the variant enumerated, otherwise it
/// is a boolean. `override: true` marks a replacement of an inherited entry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantEntry {
    pub name: VariantName,
    pub default: VariantValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<IndexSet<String>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Condition::is_always")]
    pub when: Condition,
    #[serde(default, rename = "override", skip_serializing_if = "std::ops::Not::not")]
    pub is_override: bool,
}

impl From<VariantEntry> for VariantDeclaration {
    fn from(entry: VariantEntry) -> Self {
        let kind = match entry.values {
            Some(values) => VariantKind::Enum(values),
            None => VariantKind::Bool,
        };
        // `default: true` reads as a boolean even when it names a choice
        let default = kind.normalize(&entry.default).unwrap_or(entry.default);
        Self {
            name: entry.name,
            kind,
            default,
            description: entry.description,
            when: entry.when,
        }
    }
}

impl From<&VariantDeclaration> for VariantEntry {
    fn from(decl: &VariantDeclaration) -> Self {
        Self {
            name: decl.name.clone(),
            default: decl.default.clone(),
            values: match &decl.kind {
                VariantKind::Bool => None,
                VariantKind::Enum(values) => Some(values.clone()),
            },
            description: decl.description.clone(),
            when: decl.when.clone(),
            is_override: false,
        }
    }
}
