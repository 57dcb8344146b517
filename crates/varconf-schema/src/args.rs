// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use varconf_foundation::name::{PkgName, VariantName};
use varconf_foundation::spec::Queryable;
use varconf_foundation::variant::VariantValue;
use varconf_foundation::version::Version;
use varconf_foundation::version_range::{Ranged, VersionFilter, VersionRange};
use varconf_query::Condition;

#[cfg(test)]
#[path = "./args_test.rs"]
mod args_test;

/// One token of the argument list handed to the build tool.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigArg(String);

impl ConfigArg {
    pub fn new<S: Into<String>>(arg: S) -> Self {
        Self(arg.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ConfigArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ConfigArg {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ConfigArg {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ConfigArg {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<String> for ConfigArg {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ConfigArg {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// One piece of a composite argument.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompositePart {
    /// Emitted whenever the composite itself is
    Always(String),
    /// Emits `enable` or `disable` depending on a boolean variant,
    /// and nothing at all when that variant is not active
    Toggle {
        #[serde(rename = "toggle")]
        variant: VariantName,
        enable: String,
        disable: String,
    },
}

/// A declarative rule that appends arguments for a spec.
///
/// Rules only look at variants that have a value in the spec, so a
/// rule over an inactive variant emits nothing.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawArgRule", into = "RawArgRule")]
pub enum ArgRule {
    /// A fixed argument, emitted when the spec satisfies `when`
    Flag { flag: String, when: Condition },
    /// `--enable-<feature>` or `--disable-<feature>`
    EnableDisable {
        variant: VariantName,
        feature: Option<String>,
    },
    /// `--with-<package>` or `--without-<package>`
    WithWithout {
        variant: VariantName,
        package: Option<String>,
    },
    /// A CMake cache entry, `-D<name>:BOOL=ON` or `-D<name>:STRING=<value>`
    Define { name: String, variant: VariantName },
    /// A single `<key>=<part> <part>...` argument
    Composite {
        key: String,
        when: Condition,
        parts: Vec<CompositePart>,
    },
}

impl ArgRule {
    /// A rule that always emits the given argument.
    pub fn flag<S: Into<String>>(flag: S) -> Self {
        Self::Flag {
            flag: flag.into(),
            when: Condition::Always,
        }
    }

    /// A rule that emits the given argument when `when` holds.
    pub fn flag_when<S: Into<String>>(flag: S, when: Condition) -> Self {
        Self::Flag {
            flag: flag.into(),
            when,
        }
    }

    pub fn enable_disable(variant: VariantName) -> Self {
        Self::EnableDisable {
            variant,
            feature: None,
        }
    }

    pub fn with_without(variant: VariantName) -> Self {
        Self::WithWithout {
            variant,
            package: None,
        }
    }

    /// The variants that this rule reads from the spec, paired with
    /// whether the rule requires them to be boolean.
    pub fn referenced_variants<'a>(
        &'a self,
        own: &PkgName,
    ) -> Vec<(&'a VariantName, bool)> {
        match self {
            Self::Flag { when, .. } => when
                .referenced_variants(own)
                .into_iter()
                .map(|name| (name, false))
                .collect(),
            Self::EnableDisable { variant, .. } | Self::WithWithout { variant, .. } => {
                vec![(variant, true)]
            }
            Self::Define { variant, .. } => vec![(variant, false)],
            Self::Composite { when, parts, .. } => when
                .referenced_variants(own)
                .into_iter()
                .map(|name| (name, false))
                .chain(parts.iter().filter_map(|part| match part {
                    CompositePart::Always(_) => None,
                    CompositePart::Toggle { variant, .. } => Some((variant, true)),
                }))
                .collect(),
        }
    }

    /// A short description of the rule for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Flag { flag, .. } => format!("flag '{flag}'"),
            Self::EnableDisable { variant, .. } => format!("enable/disable rule for '{variant}'"),
            Self::WithWithout { variant, .. } => format!("with/without rule for '{variant}'"),
            Self::Define { name, .. } => format!("define '{name}'"),
            Self::Composite { key, .. } => format!("composite '{key}'"),
        }
    }

    /// Append the arguments of this rule for the given spec.
    pub fn emit<Q: Queryable + ?Sized>(&self, spec: &Q, args: &mut Vec<ConfigArg>) {
        let before = args.len();
        match self {
            Self::Flag { flag, when } => {
                if when.check(spec).is_ok() {
                    args.push(ConfigArg::new(flag.as_str()));
                }
            }
            Self::EnableDisable { variant, feature } => {
                if let Some(enabled) = bool_variant(spec, variant) {
                    let feature = feature.clone().unwrap_or_else(|| variant.flag_name());
                    let prefix = if enabled { "enable" } else { "disable" };
                    args.push(ConfigArg::new(format!("--{prefix}-{feature}")));
                }
            }
            Self::WithWithout { variant, package } => {
                if let Some(enabled) = bool_variant(spec, variant) {
                    let package = package.clone().unwrap_or_else(|| variant.flag_name());
                    let prefix = if enabled { "with" } else { "without" };
                    args.push(ConfigArg::new(format!("--{prefix}-{package}")));
                }
            }
            Self::Define { name, variant } => match spec.variant(variant) {
                Some(VariantValue::Bool(value)) => {
                    let value = if *value { "ON" } else { "OFF" };
                    args.push(ConfigArg::new(format!("-D{name}:BOOL={value}")));
                }
                Some(VariantValue::Str(value)) => {
                    args.push(ConfigArg::new(format!("-D{name}:STRING={value}")));
                }
                None => {}
            },
            Self::Composite { key, when, parts } => {
                if when.check(spec).is_ok() {
                    let mut pieces = Vec::with_capacity(parts.len());
                    for part in parts {
                        match part {
                            CompositePart::Always(text) => pieces.push(text.as_str()),
                            CompositePart::Toggle {
                                variant,
                                enable,
                                disable,
                            } => match bool_variant(spec, variant) {
                                Some(true) => pieces.push(enable.as_str()),
                                Some(false) => pieces.push(disable.as_str()),
                                None => {}
                            },
                        }
                    }
                    if !pieces.is_empty() {
                        args.push(ConfigArg::new(format!("{key}={}", pieces.join(" "))));
                    }
                }
            }
        }
        for arg in &args[before..] {
            tracing::trace!(%arg, "{} emitted", self.describe());
        }
    }
}

fn bool_variant<Q: Queryable + ?Sized>(spec: &Q, name: &VariantName) -> Option<bool> {
    spec.variant(name).and_then(VariantValue::as_bool)
}

/// The serialized form of an [`ArgRule`], keyed by the kind of rule.
///
/// ```yaml
/// - flag: --enable-debug
///   when: +debug
/// - enable_disable: shared
/// - composite: --with-io-romio-flags
///   when: +peanuts
///   parts:
///     - --with-file-system=testfs+ufs+peanuts
///     - toggle: aggregate_read
///       enable: --enable-peanuts-aggregate-read
///       disable: --disable-peanuts-aggregate-read
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawArgRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enable_disable: Option<VariantName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    with_without: Option<VariantName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    define: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    composite: Option<String>,
    #[serde(default, skip_serializing_if = "Condition::is_always")]
    when: Condition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    variant: Option<VariantName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    parts: Vec<CompositePart>,
}

impl TryFrom<RawArgRule> for ArgRule {
    type Error = String;

    fn try_from(raw: RawArgRule) -> std::result::Result<Self, Self::Error> {
        let kinds = [
            raw.flag.is_some(),
            raw.enable_disable.is_some(),
            raw.with_without.is_some(),
            raw.define.is_some(),
            raw.composite.is_some(),
        ];
        if kinds.iter().filter(|k| **k).count() != 1 {
            return Err(
                "an argument rule needs exactly one of: flag, enable_disable, with_without, define, composite"
                    .into(),
            );
        }
        let when_unused = |kind: &str| -> std::result::Result<(), String> {
            if raw.when.is_always() {
                Ok(())
            } else {
                Err(format!("'when' is not supported by {kind} rules"))
            }
        };
        if let Some(flag) = raw.flag {
            return Ok(Self::Flag {
                flag,
                when: raw.when,
            });
        }
        if let Some(variant) = raw.enable_disable {
            when_unused("enable_disable")?;
            return Ok(Self::EnableDisable {
                variant,
                feature: raw.feature,
            });
        }
        if let Some(variant) = raw.with_without {
            when_unused("with_without")?;
            return Ok(Self::WithWithout {
                variant,
                package: raw.package,
            });
        }
        if let Some(name) = raw.define {
            when_unused("define")?;
            let Some(variant) = raw.variant else {
                return Err(format!("define '{name}' needs a 'variant'"));
            };
            return Ok(Self::Define { name, variant });
        }
        match raw.composite {
            Some(key) => Ok(Self::Composite {
                key,
                when: raw.when,
                parts: raw.parts,
            }),
            None => Err("an argument rule needs a kind".into()),
        }
    }
}

impl From<ArgRule> for RawArgRule {
    fn from(rule: ArgRule) -> Self {
        match rule {
            ArgRule::Flag { flag, when } => Self {
                flag: Some(flag),
                when,
                ..Default::default()
            },
            ArgRule::EnableDisable { variant, feature } => Self {
                enable_disable: Some(variant),
                feature,
                ..Default::default()
            },
            ArgRule::WithWithout { variant, package } => Self {
                with_without: Some(variant),
                package,
                ..Default::default()
            },
            ArgRule::Define { name, variant } => Self {
                define: Some(name),
                variant: Some(variant),
                ..Default::default()
            },
            ArgRule::Composite { key, when, parts } => Self {
                composite: Some(key),
                when,
                parts,
                ..Default::default()
            },
        }
    }
}

/// Disables the integration of a traditional batch scheduler for
/// newer versions, unless that scheduler was explicitly requested.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerRule {
    #[serde(default = "SchedulerRule::default_since")]
    pub since: VersionFilter,
    #[serde(default = "SchedulerRule::default_reserved")]
    pub reserved: String,
    #[serde(default = "SchedulerRule::default_flag")]
    pub flag: String,
}

impl SchedulerRule {
    pub const DEFAULT_RESERVED: &'static str = "tm";
    pub const DEFAULT_FLAG: &'static str = "--without-pbs";

    fn default_since() -> VersionFilter {
        VersionRange::at_least(Version::from_parts([5])).into()
    }

    fn default_reserved() -> String {
        Self::DEFAULT_RESERVED.to_owned()
    }

    fn default_flag() -> String {
        Self::DEFAULT_FLAG.to_owned()
    }

    /// The argument to append for this spec, if any.
    pub fn apply<Q: Queryable + ?Sized>(&self, spec: &Q) -> Option<ConfigArg> {
        if !self.since.is_applicable(spec.version()).is_ok() {
            return None;
        }
        if spec.scheduler() == Some(self.reserved.as_str()) {
            return None;
        }
        Some(ConfigArg::new(self.flag.as_str()))
    }
}

impl Default for SchedulerRule {
    fn default() -> Self {
        Self {
            since: Self::default_since(),
            reserved: Self::default_reserved(),
            flag: Self::default_flag(),
        }
    }
}
