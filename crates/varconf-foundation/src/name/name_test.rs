// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::{NamespacedName, PkgName, VariantName};

#[rstest]
#[case("openmpi", true)]
#[case("rpmembb", true)]
#[case("mpi", true)]
#[case("my-pkg", true)]
#[case("p", false)]
#[case("-pkg", false)]
#[case("Openmpi", false)]
#[case("my_pkg", false)]
#[case("1pkg", false)]
fn test_pkg_name_validation(#[case] name: &str, #[case] valid: bool) {
    assert_eq!(PkgName::new(name).is_ok(), valid, "{name}");
}

#[rstest]
#[case("aggregate_read", true)]
#[case("debug", true)]
#[case("deferred-open", true)]
#[case("x", false)]
#[case("_hidden", false)]
#[case("has space", false)]
fn test_variant_name_validation(#[case] name: &str, #[case] valid: bool) {
    assert_eq!(VariantName::new(name).is_ok(), valid, "{name}");
}

#[rstest]
fn test_variant_flag_name() {
    assert_eq!(crate::var_name!("aggregate_read").flag_name(), "aggregate-read");
}

#[rstest]
#[case("builtin.openmpi", Some("builtin"), "openmpi")]
#[case("openmpi", None, "openmpi")]
fn test_namespaced_name_parse(
    #[case] input: &str,
    #[case] namespace: Option<&str>,
    #[case] name: &str,
) {
    let parsed: NamespacedName = input.parse().unwrap();
    assert_eq!(parsed.namespace.as_deref(), namespace);
    assert_eq!(parsed.name, name);
    assert_eq!(parsed.to_string(), input);
}

#[rstest]
fn test_invalid_name_error_position() {
    let err = PkgName::new("open$mpi").unwrap_err();
    assert!(err.to_string().contains("pos 4"), "{err}");
}
