// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use proptest::prelude::*;
use rstest::{fixture, rstest};
use varconf_foundation::compiler::CompilerSpec;
use varconf_foundation::spec::Spec;
use varconf_foundation::version::Version;
use varconf_foundation::{pkg_name, var_name, version};

use super::{parse_condition, satisfies, Condition};

#[fixture]
fn openmpi() -> Spec {
    let pmdk = Spec::new(pkg_name!("pmdk"), version!("1.12.1")).with_variant(var_name!("ndctl"), true);
    Spec::new(pkg_name!("openmpi"), version!("5.0.0"))
        .with_variant(var_name!("romio"), true)
        .with_variant(var_name!("debug"), false)
        .with_variant(var_name!("fabrics"), "ucx")
        .with_scheduler("slurm")
        .with_compiler(CompilerSpec::new(pkg_name!("gcc"), version!("12.2.0")))
        .with_dependency(pkg_name!("pmdk"), pmdk)
}

#[rstest]
#[case("", true)]
#[case("   ", true)]
#[case("+romio", true)]
#[case("-debug", true)]
#[case("~debug", true)]
#[case("+debug", false)]
#[case("~romio", false)]
#[case("romio=true", true)]
#[case("fabrics=ucx", true)]
#[case("fabrics=ofi", false)]
#[case("+romio ~debug fabrics=ucx", true)]
#[case("+romio +debug", false)]
// variants that the spec does not carry never match
#[case("+unknown", false)]
#[case("~unknown", false)]
#[case("unknown=value", false)]
// names are matched case sensitively
#[case("+Romio", false)]
#[case("~Debug", false)]
#[case("Fabrics=ucx", false)]
#[case("romio=True", true)]
#[case("romio=yes", false)]
#[case("@5.0.0", true)]
#[case("@5.0", false)]
#[case("@5:", true)]
#[case("@:5", true)]
#[case("@:5.0.0", true)]
#[case("@4.9:5.0.0", true)]
#[case("@:4.9", false)]
#[case("@5.0.1:", false)]
#[case("@:4,5:", true)]
#[case("schedulers=slurm", true)]
#[case("schedulers=tm", false)]
#[case("%gcc", true)]
#[case("%gcc@12:", true)]
#[case("%gcc@:11", false)]
#[case("%clang", false)]
#[case("!+debug", true)]
#[case("!+romio", false)]
#[case("!schedulers=tm", true)]
#[case("+debug | +romio", true)]
#[case("+debug|~romio", false)]
#[case("+debug | @:4 | schedulers=slurm", true)]
#[case("openmpi+romio", true)]
#[case("^openmpi ~romio", false)]
#[case("^pmdk+ndctl", true)]
#[case("pmdk +ndctl", true)]
#[case("pmdk ~ndctl", false)]
#[case("pmdk@:1.12", true)]
#[case("pmdk@2:", false)]
#[case("+romio ^pmdk +ndctl", true)]
// atoms that follow a scope belong to it
#[case("^pmdk +romio", false)]
#[case("^libfabric", false)]
#[case("!^libfabric", true)]
// a negated scope does not collect the following atoms
#[case("!^pmdk~ndctl +romio", true)]
#[case("!^pmdk+ndctl +romio", false)]
fn test_satisfies(openmpi: Spec, #[case] query: &str, #[case] expected: bool) {
    let actual = satisfies(&openmpi, query).expect("query should be valid");
    assert_eq!(actual, expected, "{openmpi} satisfies '{query}'");
}

#[rstest]
#[case("fabrics=True", true)]
#[case("fabrics=true", false)]
#[case("+fabrics", false)]
#[case("mode=true", true)]
#[case("mode=True", false)]
fn test_string_values_match_exactly(#[case] query: &str, #[case] expected: bool) {
    let spec = Spec::new(pkg_name!("openmpi"), version!("5.0.0"))
        .with_variant(var_name!("fabrics"), "True")
        .with_variant(var_name!("mode"), "true");
    assert_eq!(satisfies(&spec, query).unwrap(), expected, "{spec} satisfies '{query}'");
}

#[rstest]
#[case("+")]
#[case("~")]
#[case("@")]
#[case("@5:4")]
#[case("@5.2:5.0")]
#[case("@5::6")]
#[case("@1.0,")]
#[case("%")]
#[case("%gcc@")]
#[case("fabrics=")]
#[case("+romio |")]
#[case("| +romio")]
#[case("!")]
#[case("^")]
#[case("+fast_path@")]
fn test_parse_condition_invalid(#[case] query: &str) {
    let err = parse_condition(query).expect_err("query should be invalid");
    assert!(matches!(err, super::Error::QuerySyntaxError { .. }), "{err}");
}

#[rstest]
#[case("+romio", Condition::VariantEq { name: var_name!("romio"), value: true.into() })]
#[case("~romio", Condition::VariantEq { name: var_name!("romio"), value: false.into() })]
#[case("fabrics=ucx", Condition::VariantEq { name: var_name!("fabrics"), value: "ucx".into() })]
#[case("romio=true", Condition::VariantEq { name: var_name!("romio"), value: "true".into() })]
#[case("schedulers=tm", Condition::SchedulerEq("tm".into()))]
#[case("", Condition::Always)]
fn test_parse_atoms(#[case] query: &str, #[case] expected: Condition) {
    assert_eq!(parse_condition(query).unwrap(), expected);
}

#[rstest]
fn test_parse_scope_collects_following_atoms() {
    let condition = parse_condition("+alpha pmdk+ndctl ~rpmem").unwrap();
    let expected = Condition::And(vec![
        Condition::VariantEq {
            name: var_name!("alpha"),
            value: true.into(),
        },
        Condition::Package {
            name: pkg_name!("pmdk"),
            condition: Box::new(Condition::And(vec![
                Condition::VariantEq {
                    name: var_name!("ndctl"),
                    value: true.into(),
                },
                Condition::VariantEq {
                    name: var_name!("rpmem"),
                    value: false.into(),
                },
            ])),
        },
    ]);
    assert_eq!(condition, expected);
}

#[rstest]
#[case("+romio ~debug fabrics=ucx")]
#[case("@5:")]
#[case("@:4.9,5.0.1:")]
#[case("%gcc")]
#[case("%gcc@12:")]
#[case("schedulers=tm")]
#[case("+debug | ~romio @:4")]
#[case("!+debug")]
#[case("^pmdk")]
#[case("+romio ^pmdk +ndctl ~rpmem")]
#[case("!^pmdk+ndctl +romio")]
fn test_display_round_trip(#[case] query: &str) {
    let condition = parse_condition(query).unwrap();
    assert_eq!(condition.to_string(), query);
    assert_eq!(parse_condition(condition.to_string()).unwrap(), condition);
}

#[rstest]
fn test_referenced_variants() {
    let condition =
        parse_condition("+alpha fabrics=ucx ^pmdk +ndctl | ~beta ^openmpi +gamma").unwrap();
    let own = pkg_name!("openmpi");
    let names: Vec<_> = condition
        .referenced_variants(&own)
        .into_iter()
        .map(|n| n.as_str())
        .collect();
    assert_eq!(names, vec!["alpha", "fabrics", "beta", "gamma"]);
    let packages: Vec<_> = condition
        .referenced_packages()
        .into_iter()
        .map(|n| n.as_str())
        .collect();
    assert!(packages.contains(&"pmdk"));
    assert!(packages.contains(&"openmpi"));
}

#[rstest]
fn test_condition_from_yaml() {
    let conditions: Vec<Condition> =
        serde_yaml::from_str("['+alpha', '@5:', '', 'pmdk+rpmem']").unwrap();
    assert_eq!(conditions.len(), 4);
    assert!(conditions[2].is_always());
    serde_yaml::from_str::<Condition>("'@5:4'").expect_err("inverted range");
}

#[rstest]
fn test_incompatible_reason_names_the_package() {
    let spec = Spec::new(pkg_name!("pmdk"), version!("2.0.0"));
    let compat = parse_condition("@:1.12").unwrap().check(&spec);
    assert!(!compat.is_ok());
    assert!(compat.message().contains("pmdk@2.0.0"), "{compat}");
}

proptest! {
    #[test]
    fn prop_bounds_are_inclusive(major in 0u64..50, minor in 0u64..50, patch in 0u64..50) {
        let version = Version::from_parts([major, minor, patch]);
        let spec = Spec::new(pkg_name!("openmpi"), version.clone());
        for query in [
            format!("@{version}"),
            format!("@{version}:"),
            format!("@:{version}"),
            format!("@{major}:{major}.{minor}"),
            format!("@:{major}"),
        ] {
            prop_assert!(satisfies(&spec, &query).unwrap(), "{} should satisfy {}", version, query);
        }
        let next = Version::from_parts([major, minor, patch + 1]);
        let newer = format!("@{next}:");
        prop_assert!(!satisfies(&spec, &newer).unwrap());
    }
}
