// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use config::builder::DefaultState;
use config::ConfigBuilder;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::Result;

#[cfg(test)]
#[path = "./config_test.rs"]
mod config_test;

static CONFIG: OnceCell<RwLock<Arc<Config>>> = OnceCell::new();

/// The environment variable prefix of configuration overrides.
pub const ENV_PREFIX: &str = "VARCONF_";

#[derive(Clone, Default, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Repository {
    /// Directories holding one repository per namespace, searched in order
    ///
    /// When set from the environment, entries are separated like `PATH`.
    pub paths: Vec<PathBuf>,

    /// Namespaces that take priority over all others, in order
    ///
    /// When set from the environment, entries are separated by commas.
    pub namespaces: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Resolve {
    /// The version range that the scheduler rule applies to
    pub scheduler_since: String,

    /// The scheduler whose integration is never disabled
    pub reserved_scheduler: String,

    /// The flag that disables the scheduler integration
    pub scheduler_flag: String,
}

impl Default for Resolve {
    fn default() -> Self {
        Self {
            scheduler_since: "5:".into(),
            reserved_scheduler: "tm".into(),
            scheduler_flag: "--without-pbs".into(),
        }
    }
}

/// Configuration values for varconf.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    // These sub-types should only have one level of values
    // so that each can be addressed with an environment variable.
    pub repository: Repository,
    pub resolve: Resolve,
}

impl Config {
    /// Get the current loaded config, loading it if needed
    pub fn current() -> Result<Arc<Self>> {
        get_config()
    }

    /// Load the config from disk, even if it's already been loaded before
    pub fn load() -> Result<Self> {
        load_config()
    }

    /// Read a config from a yaml string, ignoring all other sources
    pub fn load_string<S: AsRef<str>>(conf: S) -> Result<Self> {
        use config::{Config as RawConfig, File, FileFormat};

        let config = RawConfig::builder()
            .add_source(File::from_str(conf.as_ref(), FileFormat::Yaml))
            .build()?;
        Ok(Config::deserialize(config)?)
    }

    /// Make this config the current global one
    pub fn make_current(self) -> Result<Arc<Self>> {
        // we may not win the race to initialize the value,
        // so it still needs to be updated afterwards
        let config = CONFIG.get_or_try_init(|| -> Result<RwLock<Arc<Config>>> {
            Ok(RwLock::new(Arc::new(self.clone())))
        })?;

        let mut lock = config
            .write()
            .map_err(|err| crate::Error::LockPoisonedWrite(err.to_string()))?;
        *Arc::make_mut(&mut lock) = self;
        Ok(Arc::clone(&lock))
    }
}

/// Get the current varconf config, fetching it from disk if needed.
pub fn get_config() -> Result<Arc<Config>> {
    let config = CONFIG.get_or_try_init(|| -> Result<RwLock<Arc<Config>>> {
        Ok(RwLock::new(Arc::new(load_config()?)))
    })?;
    let lock = config
        .read()
        .map_err(|err| crate::Error::LockPoisonedRead(err.to_string()))?;
    Ok(Arc::clone(&*lock))
}

/// Load the varconf configuration from disk, even if it has already been loaded.
///
/// This includes the system and user configurations, if they exist,
/// followed by any `VARCONF_<SECTION>_<NAME>` environment variables.
pub fn load_config() -> Result<Config> {
    use config::{Config as RawConfig, File};

    // both files can be in any supported format: yaml, toml, json, ini, etc
    let mut config_builder =
        RawConfig::builder().add_source(File::with_name("/etc/varconf").required(false));
    if let Some(user_config) = dirs::config_dir().map(|dir| dir.join("varconf").join("varconf")) {
        config_builder = config_builder
            .add_source(File::with_name(&user_config.display().to_string()).required(false));
    }
    let config_builder = with_env_overrides(config_builder, std::env::vars())?;

    let config = config_builder.build()?;
    Ok(Config::deserialize(config)?)
}

fn with_env_overrides<I>(
    mut config_builder: ConfigBuilder<DefaultState>,
    vars: I,
) -> Result<ConfigBuilder<DefaultState>>
where
    I: IntoIterator<Item = (String, String)>,
{
    for (var, value) in vars {
        let Some(tail) = var.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let Some((section, name)) = tail.split_once('_') else {
            // a value with no section is not a configuration
            // value, and can be skipped (eg: VARCONF_LOG)
            continue;
        };

        let key = format!("{}.{}", section.to_lowercase(), name.to_lowercase());
        config_builder = match key.as_str() {
            "repository.paths" => {
                let paths: Vec<String> = std::env::split_paths(&value)
                    .map(|p| p.display().to_string())
                    .collect();
                config_builder.set_override(key, paths)?
            }
            "repository.namespaces" => {
                let namespaces: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect();
                config_builder.set_override(key, namespaces)?
            }
            _ => config_builder.set_override(key, value)?,
        };
    }
    Ok(config_builder)
}
