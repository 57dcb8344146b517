// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use rstest::{fixture, rstest};
use varconf_config::Config;
use varconf_foundation::spec::Queryable;
use varconf_foundation::{pkg_name, spec};

use super::{definition_name, read_spec, scheduler_rule, Repositories};

#[fixture]
fn tmpdir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("varconf-test-")
        .tempdir()
        .expect("create a temp directory for test files")
}

fn bundled_repos() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../repos")
}

#[rstest]
fn test_read_spec_inline() {
    let spec = read_spec("openmpi@5.0.0 +romio schedulers=tm").unwrap();
    assert_eq!(spec, spec!("openmpi@5.0.0 +romio schedulers=tm"));
    read_spec("openmpi +romio").expect_err("version is required");
}

#[rstest]
fn test_read_spec_yaml(tmpdir: tempfile::TempDir) {
    let path = tmpdir.path().join("spec.yaml");
    std::fs::write(
        &path,
        "name: rpmbb\nversion: 0.4.0\ndependencies:\n  pmdk: {name: pmdk, version: 1.12.1}\n",
    )
    .unwrap();
    let spec = read_spec(&path.display().to_string()).unwrap();
    assert_eq!(spec.name(), &pkg_name!("rpmbb"));
    assert!(spec.dependency("pmdk").is_some());

    let missing = tmpdir.path().join("missing.yaml");
    read_spec(&missing.display().to_string()).expect_err("file does not exist");

    std::fs::write(&path, "name: rpmbb\n").unwrap();
    read_spec(&path.display().to_string()).expect_err("version is missing");
}

#[rstest]
#[case("openmpi@5.0.0", "openmpi")]
#[case("openmpi@5.0.0rc12-peanuts +peanuts", "openmpi")]
fn test_definition_name(#[case] spec: &str, #[case] expected: &str) {
    let spec = read_spec(spec).unwrap();
    assert_eq!(definition_name(&spec), expected);
    let qualified = spec.with_namespace(pkg_name!("peanuts"));
    assert_eq!(definition_name(&qualified), format!("peanuts.{expected}"));
}

#[rstest]
fn test_get_stack_requires_repositories() {
    let err = Repositories::default()
        .get_stack(&Config::default())
        .expect_err("nothing is configured");
    assert!(err.to_string().contains("No package repositories"), "{err}");
}

#[rstest]
fn test_get_stack_priority() {
    let mut config = Config::default();
    config.repository.paths = vec![bundled_repos()];
    config.repository.namespaces = vec!["rpmbb".into()];
    let flags = Repositories {
        repos: Vec::new(),
        namespaces: vec!["peanuts".into()],
    };
    let stack = flags.get_stack(&config).unwrap();
    let namespaces: Vec<_> = stack
        .repositories()
        .iter()
        .map(|r| r.namespace().to_string())
        .collect();
    assert_eq!(namespaces, ["peanuts", "rpmbb", "builtin", "rpmembb"]);
    let openmpi = stack.load("openmpi").unwrap();
    assert_eq!(openmpi.qualified_name().to_string(), "peanuts.openmpi");
}

#[rstest]
#[case("Peanuts")]
#[case("missing")]
fn test_get_stack_bad_namespace(#[case] namespace: &str) {
    let flags = Repositories {
        repos: vec![bundled_repos()],
        namespaces: vec![namespace.into()],
    };
    flags
        .get_stack(&Config::default())
        .expect_err("namespace cannot be prioritized");
}

#[rstest]
fn test_scheduler_rule_from_config() {
    let mut config = Config::default();
    let rule = scheduler_rule(&config).unwrap();
    assert_eq!(rule.since.to_string(), "5:");
    assert_eq!(rule.reserved, "tm");
    assert_eq!(rule.flag, "--without-pbs");

    config.resolve.scheduler_since = "4.1:".into();
    config.resolve.scheduler_flag = "--without-lsf".into();
    let rule = scheduler_rule(&config).unwrap();
    assert_eq!(rule.flag, "--without-lsf");
    assert!(rule.apply(&spec!("openmpi@4.1.5")).is_some());

    config.resolve.scheduler_since = "5:4:3".into();
    scheduler_rule(&config).expect_err("invalid version range");
}
