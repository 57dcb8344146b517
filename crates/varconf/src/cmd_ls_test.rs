// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use rstest::rstest;
use varconf_config::Config;

use super::Ls;
use crate::flags::Repositories;

fn bundled_repos() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../repos")
}

fn list(long: bool, filter: Option<&str>) -> Vec<String> {
    let mut config = Config::default();
    config.repository.paths = vec![bundled_repos()];
    let ls = Ls {
        repos: Repositories::default(),
        long,
        filter: filter.map(String::from),
    };
    ls.list(&config).unwrap()
}

#[rstest]
fn test_ls() {
    assert_eq!(
        list(false, None),
        [
            "builtin.openmpi",
            "builtin.pmdk",
            "peanuts.openmpi",
            "rpmbb.openmpi",
            "rpmbb.rpmbb",
            "rpmembb.openmpi",
            "rpmembb.pmdk",
            "rpmembb.rpmembb",
        ]
    );
}

#[rstest]
fn test_ls_long_filtered() {
    assert_eq!(
        list(true, Some("pmdk")),
        ["builtin.pmdk", "rpmembb.pmdk (extends builtin.pmdk)"]
    );
}
