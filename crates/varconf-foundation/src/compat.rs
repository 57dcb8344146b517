// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

/// Denotes whether or not something satisfies a predicate.
///
/// An incompatible result always carries the reason, which is what
/// gets logged when a condition does not hold.
#[derive(Clone, Debug, Eq, PartialEq)]
#[must_use = "this `Compatibility` may be an `Incompatible` variant, which should be handled"]
pub enum Compatibility {
    Compatible,
    Incompatible(String),
}

impl std::fmt::Display for Compatibility {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Compatibility::Compatible => f.write_str(""),
            Compatibility::Incompatible(msg) => f.write_str(msg),
        }
    }
}

impl Compatibility {
    /// Create an incompatible result with the given reason.
    pub fn incompatible<S: Into<String>>(reason: S) -> Self {
        Compatibility::Incompatible(reason.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, &Compatibility::Compatible)
    }

    pub fn message(&self) -> &str {
        match self {
            Compatibility::Compatible => "",
            Compatibility::Incompatible(msg) => msg.as_ref(),
        }
    }
}
