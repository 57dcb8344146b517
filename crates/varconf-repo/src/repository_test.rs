// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use rstest::{fixture, rstest};
use varconf_foundation::pkg_name;

use super::Repository;
use crate::Error;

#[fixture]
pub fn tmpdir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("varconf-test-")
        .tempdir()
        .expect("create a temp directory for test files")
}

pub fn write_package(root: &Path, namespace: &str, name: &str, yaml: &str) {
    let dir = root.join(namespace).join(Repository::PACKAGES_DIR).join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(Repository::FILE_NAME), yaml).unwrap();
}

#[rstest]
fn test_open_and_list(tmpdir: tempfile::TempDir) {
    let root = tmpdir.path();
    write_package(root, "builtin", "openmpi", "name: openmpi\n");
    write_package(root, "builtin", "pmdk", "name: pmdk\n");
    // directories without a definition file are not packages
    std::fs::create_dir_all(root.join("builtin/packages/notes")).unwrap();

    let repo = Repository::open(root.join("builtin")).unwrap();
    assert_eq!(repo.namespace(), &pkg_name!("builtin"));
    assert_eq!(repo.list_packages().unwrap(), [pkg_name!("openmpi"), pkg_name!("pmdk")]);
    assert!(repo.contains(&pkg_name!("pmdk")));
    assert!(!repo.contains(&pkg_name!("notes")));
}

#[rstest]
fn test_open_not_a_repository(tmpdir: tempfile::TempDir) {
    let err = Repository::open(tmpdir.path()).expect_err("no packages directory");
    assert!(matches!(err, Error::NotARepository(_)), "{err}");
}

#[rstest]
fn test_discover(tmpdir: tempfile::TempDir) {
    let root = tmpdir.path();
    write_package(root, "peanuts", "openmpi", "name: openmpi\n");
    write_package(root, "builtin", "openmpi", "name: openmpi\n");
    std::fs::create_dir_all(root.join("docs")).unwrap();

    let namespaces: Vec<_> = Repository::discover(root)
        .unwrap()
        .into_iter()
        .map(|r| r.namespace().to_string())
        .collect();
    assert_eq!(namespaces, ["builtin", "peanuts"]);
}

#[rstest]
fn test_read_file(tmpdir: tempfile::TempDir) {
    let root = tmpdir.path();
    write_package(root, "rpmbb", "rpmbb", "name: rpmbb\nbuild_system: cmake\n");
    write_package(root, "rpmbb", "pmdk", "name: openmpi\n");
    write_package(root, "rpmbb", "broken", "name: broken\nrecipe: true\n");
    let repo = Repository::open(root.join("rpmbb")).unwrap();

    let file = repo.read_file(&pkg_name!("rpmbb")).unwrap();
    assert_eq!(file.name, pkg_name!("rpmbb"));

    let err = repo.read_file(&pkg_name!("pmdk")).expect_err("file defines another package");
    assert!(matches!(err, Error::NameMismatch { .. }), "{err}");

    let err = repo.read_file(&pkg_name!("broken")).expect_err("unknown field");
    assert!(matches!(err, Error::InvalidDefinition { .. }), "{err}");

    let err = repo.read_file(&pkg_name!("missing")).expect_err("no such file");
    assert!(matches!(err, Error::ReadFailed(..)), "{err}");
}
