// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use rstest::rstest;

use super::{with_env_overrides, Config};

fn from_vars(vars: &[(&str, &str)]) -> Config {
    let vars = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<Vec<_>>();
    let builder = with_env_overrides(config::Config::builder(), vars).unwrap();
    let config = builder.build().unwrap();
    serde::Deserialize::deserialize(config).unwrap()
}

#[rstest]
fn test_config_defaults() {
    let config = Config::default();
    assert!(config.repository.paths.is_empty());
    assert_eq!(config.resolve.scheduler_since, "5:");
    assert_eq!(config.resolve.reserved_scheduler, "tm");
    assert_eq!(config.resolve.scheduler_flag, "--without-pbs");
}

#[rstest]
fn test_config_load_string() {
    let config = Config::load_string(
        r#"
repository:
  paths: [/opt/varconf/repos]
  namespaces: [peanuts]
resolve:
  scheduler_flag: --without-lsf
"#,
    )
    .unwrap();
    assert_eq!(config.repository.paths, [PathBuf::from("/opt/varconf/repos")]);
    assert_eq!(config.repository.namespaces, ["peanuts"]);
    assert_eq!(config.resolve.scheduler_flag, "--without-lsf");
    // unset values keep their defaults
    assert_eq!(config.resolve.reserved_scheduler, "tm");
}

#[rstest]
fn test_config_load_string_empty() {
    let config = Config::load_string("{}").unwrap();
    assert_eq!(config, Config::default());
}

#[rstest]
fn test_config_env_overrides() {
    let config = from_vars(&[
        ("VARCONF_REPOSITORY_PATHS", "/srv/repos:/home/user/repos"),
        ("VARCONF_REPOSITORY_NAMESPACES", "rpmbb, peanuts,"),
        ("VARCONF_RESOLVE_RESERVED_SCHEDULER", "slurm"),
        ("VARCONF_LOG", "debug"),
        ("RUST_LOG", "trace"),
    ]);
    assert_eq!(
        config.repository.paths,
        [PathBuf::from("/srv/repos"), PathBuf::from("/home/user/repos")]
    );
    assert_eq!(config.repository.namespaces, ["rpmbb", "peanuts"]);
    assert_eq!(config.resolve.reserved_scheduler, "slurm");
    assert_eq!(config.resolve.scheduler_since, "5:");
}

#[rstest]
fn test_config_make_current() {
    let mut config = Config::default();
    config.resolve.scheduler_flag = "--without-sge".into();
    let current = config.make_current().unwrap();
    assert_eq!(current.resolve.scheduler_flag, "--without-sge");
    assert_eq!(
        Config::current().unwrap().resolve.scheduler_flag,
        "--without-sge"
    );
}
