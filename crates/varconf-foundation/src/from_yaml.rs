// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use format_serde_error::{ErrorTypes, SerdeError};
use serde::de::DeserializeOwned;

#[cfg(test)]
#[path = "./from_yaml_test.rs"]
mod from_yaml_test;

/// Deserialize a whole yaml document.
///
/// A failure keeps the document, so that it can be shown
/// with the offending line highlighted.
pub trait FromYaml: Sized {
    fn from_yaml<S: Into<String>>(yaml: S) -> Result<Self, SerdeError>;
}

impl<T: DeserializeOwned> FromYaml for T {
    fn from_yaml<S: Into<String>>(yaml: S) -> Result<Self, SerdeError> {
        let source = yaml.into();
        match serde_yaml::from_str(&source) {
            Ok(value) => Ok(value),
            Err(err) => Err(SerdeError::new(source, YamlError::from(err))),
        }
    }
}

/// A [`serde_yaml::Error`] positioned for [`SerdeError`].
#[derive(Debug)]
pub struct YamlError {
    inner: serde_yaml::Error,
    line: Option<usize>,
    /// Zero based, unlike the location reported by serde_yaml
    column: Option<usize>,
}

impl From<serde_yaml::Error> for YamlError {
    fn from(inner: serde_yaml::Error) -> Self {
        let (line, column) = match inner.location() {
            Some(at) => (Some(at.line()), Some(at.column().saturating_sub(1))),
            None => (None, None),
        };
        Self {
            inner,
            line,
            column,
        }
    }
}

impl From<YamlError> for ErrorTypes {
    fn from(err: YamlError) -> Self {
        ErrorTypes::Custom {
            error: Box::new(err.inner),
            line: err.line,
            column: err.column,
        }
    }
}
