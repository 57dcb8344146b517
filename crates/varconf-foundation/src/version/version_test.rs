// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;

use rstest::rstest;

use super::{parse_version, Component, Version};

#[rstest]
#[case("1.12", vec![Component::Numeric(1), Component::Numeric(12)])]
#[case(
    "5.0.0rc1",
    vec![
        Component::Numeric(5),
        Component::Numeric(0),
        Component::Numeric(0),
        Component::Alpha("rc".into()),
        Component::Numeric(1),
    ]
)]
#[case(
    "5.0.0rc12-peanuts",
    vec![
        Component::Numeric(5),
        Component::Numeric(0),
        Component::Numeric(0),
        Component::Alpha("rc".into()),
        Component::Numeric(12),
        Component::Alpha("peanuts".into()),
    ]
)]
#[case("master", vec![Component::Alpha("master".into())])]
#[case("2_0", vec![Component::Numeric(2), Component::Numeric(0)])]
fn test_parse_version_components(#[case] input: &str, #[case] expected: Vec<Component>) {
    let v = parse_version(input).unwrap();
    assert_eq!(v.components(), expected.as_slice());
    assert_eq!(v.to_string(), input, "display should keep the original text");
}

#[rstest]
#[case("")]
#[case(".1")]
#[case("1..2")]
#[case("1.2.")]
#[case("1.2:3")]
#[case("1 2")]
fn test_parse_version_invalid(#[case] input: &str) {
    parse_version(input).expect_err("expected version parsing to fail");
}

#[rstest]
#[case("1.0", "1.0", Ordering::Equal)]
#[case("1.0", "1-0", Ordering::Equal)]
#[case("1.12", "1.13", Ordering::Less)]
#[case("1.12", "1.12.1", Ordering::Less)]
#[case("5", "5.0.0rc1", Ordering::Less)]
#[case("5.0.0", "5.0.0rc1", Ordering::Less)]
#[case("4.9.0", "5.0.0", Ordering::Less)]
#[case("1.0a", "1.0.1", Ordering::Less)]
#[case("master", "99.0", Ordering::Greater)]
#[case("develop", "master", Ordering::Greater)]
#[case("stable", "trunk", Ordering::Less)]
fn test_version_ordering(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
    let a = parse_version(a).unwrap();
    let b = parse_version(b).unwrap();
    assert_eq!(a.cmp(&b), expected, "{a} vs {b}");
}

#[rstest]
#[case("1.12", "1.12.3", true)]
#[case("5", "5.0.0rc1", true)]
#[case("1.12", "1.12", true)]
#[case("1.12", "1.1", false)]
#[case("1.1", "1.12", false)]
fn test_version_is_prefix_of(#[case] a: &str, #[case] b: &str, #[case] expected: bool) {
    let a = parse_version(a).unwrap();
    let b = parse_version(b).unwrap();
    assert_eq!(a.is_prefix_of(&b), expected);
}

#[rstest]
fn test_version_major() {
    assert_eq!(crate::version!("5.0.0rc1").major(), Some(5));
    assert_eq!(crate::version!("master").major(), None);
    assert!(crate::version!("master").is_development());
}

#[rstest]
fn test_version_from_parts() {
    let v = Version::from_parts([4, 9, 0]);
    assert_eq!(v, "4.9.0");
    assert_eq!(v.to_string(), "4.9.0");
}

#[rstest]
fn test_version_yaml() {
    let v: Version = serde_yaml::from_str("\"5.0.0rc12-peanuts\"").unwrap();
    assert_eq!(v, "5.0.0rc12-peanuts");
    let v: Version = serde_yaml::from_str("5").unwrap();
    assert_eq!(v, "5");
}
