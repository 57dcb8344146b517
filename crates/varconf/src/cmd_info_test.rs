// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use rstest::rstest;
use varconf_config::Config;

use super::Info;
use crate::flags::Repositories;

fn bundled_repos() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../repos")
}

fn render(package: &str) -> miette::Result<String> {
    let info = Info {
        repos: Repositories {
            repos: vec![bundled_repos()],
            namespaces: Vec::new(),
        },
        package: package.into(),
    };
    info.render(&Config::default())
}

#[rstest]
fn test_info_derived() {
    let out = render("peanuts.openmpi").unwrap();
    for expected in [
        "builtin.openmpi -> peanuts.openmpi",
        "https://github.com/tsukuba-hpcs/ompi-peanuts.git",
        "5.0.0rc12-peanuts (branch peanuts with submodules)",
        "4.1.5 (tag v4.1.5)",
        "aggregate_read = true (a boolean) when +peanuts",
        "fabrics = auto (one of [auto, ucx, ofi])",
        "[inherited]",
        "--without-pbs @5: unless schedulers=tm",
        "composite '--with-io-romio-flags'",
        "flag '--disable-io-romio'",
    ] {
        assert!(out.contains(expected), "missing '{expected}' in:\n{out}");
    }
}

#[rstest]
fn test_info_root() {
    let out = render("rpmbb.rpmbb").unwrap();
    for expected in [
        "cmake (cmake)",
        "range3",
        "unset CPM_SOURCE_CACHE",
        "pmdk+ndctl",
        "%gcc@:9",
    ] {
        assert!(out.contains(expected), "missing '{expected}' in:\n{out}");
    }
    assert!(!out.contains(" -> "), "a root definition has no chain:\n{out}");
    assert!(!out.contains("unless schedulers"), "{out}");
}

#[rstest]
fn test_info_not_found() {
    render("builtin.hdf5").expect_err("package does not exist");
}
