// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;
use rstest::{fixture, rstest};
use varconf_foundation::spec::Spec;
use varconf_foundation::{pkg_name, spec, var_name, version};
use varconf_query::parse_condition;

use super::PackageDefinition;
use crate::{
    ArgRule,
    BuildSystem,
    CompositePart,
    ConflictDeclaration,
    DefinitionError,
    DependencyDeclaration,
    EnvOp,
    Error,
    SchedulerRule,
    SourceRef,
    VariantDeclaration,
    VersionDeclaration,
};

fn when(query: &str) -> varconf_query::Condition {
    parse_condition(query).unwrap()
}

#[fixture]
fn base() -> Arc<PackageDefinition> {
    let definition = PackageDefinition::builder(pkg_name!("openmpi"))
        .namespace(pkg_name!("builtin"))
        .description("An open source Message Passing Interface implementation")
        .homepage("https://www.open-mpi.org")
        .variant(VariantDeclaration::boolean(var_name!("romio"), true))
        .arg(ArgRule::flag_when("--disable-io-romio", when("~romio")))
        .build()
        .unwrap();
    Arc::new(definition)
}

#[fixture]
fn derived(base: Arc<PackageDefinition>) -> PackageDefinition {
    PackageDefinition::derive(pkg_name!("openmpi"), base)
        .namespace(pkg_name!("alpha"))
        .variant(VariantDeclaration::boolean(var_name!("alpha"), false).with_when(when("+romio")))
        .variant(
            VariantDeclaration::boolean(var_name!("fast_path"), true).with_when(when("+alpha")),
        )
        .arg(ArgRule::Composite {
            key: "--with-io-romio-flags".into(),
            when: when("+alpha"),
            parts: vec![
                CompositePart::Always("--with-file-system=testfs+ufs+alpha".into()),
                CompositePart::Toggle {
                    variant: var_name!("fast_path"),
                    enable: "--enable-alpha-fast-path".into(),
                    disable: "--disable-alpha-fast-path".into(),
                },
            ],
        })
        .build()
        .unwrap()
}

fn args(definition: &PackageDefinition, spec: &Spec) -> Vec<String> {
    definition
        .build_args(spec)
        .unwrap()
        .into_iter()
        .map(|a| a.into_inner())
        .collect()
}

#[rstest]
fn test_build_args_end_to_end(derived: PackageDefinition) {
    let mut spec = spec!("openmpi@5.0.0rc1 +alpha +fast_path schedulers=slurm");
    derived.schema().fill_defaults(&mut spec);
    assert_eq!(
        args(&derived, &spec),
        [
            "--without-pbs",
            "--with-io-romio-flags=--with-file-system=testfs+ufs+alpha --enable-alpha-fast-path",
        ]
    );
}

#[rstest]
fn test_build_args_reads_boolean_words(derived: PackageDefinition) {
    let spec = spec!("openmpi@5.0.0rc1 romio=true alpha=True fast_path=true schedulers=slurm");
    assert_eq!(
        args(&derived, &spec),
        [
            "--without-pbs",
            "--with-io-romio-flags=--with-file-system=testfs+ufs+alpha --enable-alpha-fast-path",
        ]
    );
}

#[rstest]
#[case("openmpi@5.0.0 +romio +alpha ~fast_path", &[
    "--without-pbs",
    "--with-io-romio-flags=--with-file-system=testfs+ufs+alpha --disable-alpha-fast-path",
])]
#[case("openmpi@5.0.0 +romio ~alpha schedulers=tm", &[])]
#[case("openmpi@4.1.5 ~romio", &["--disable-io-romio"])]
#[case("openmpi@5.0.0 ~romio", &["--disable-io-romio", "--without-pbs"])]
fn test_build_args_chain_order(
    derived: PackageDefinition,
    #[case] source: &str,
    #[case] expected: &[&str],
) {
    let spec: Spec = source.parse().unwrap();
    assert_eq!(args(&derived, &spec), expected);
}

#[rstest]
fn test_base_has_no_scheduler_rule(base: Arc<PackageDefinition>) {
    assert!(base.scheduler_rule().is_none());
    assert_eq!(args(&base, &spec!("openmpi@5.0.0 +romio")), Vec::<String>::new());
}

#[rstest]
fn test_scheduler_rule_replaced_or_removed(base: Arc<PackageDefinition>) {
    let removed = PackageDefinition::derive(pkg_name!("openmpi"), base.clone())
        .scheduler_rule(None)
        .build()
        .unwrap();
    assert!(args(&removed, &spec!("openmpi@5.0.0 +romio")).is_empty());

    let replaced = PackageDefinition::derive(pkg_name!("openmpi"), base)
        .scheduler_rule(Some(SchedulerRule {
            flag: "--without-lsf".into(),
            reserved: "lsf".into(),
            ..Default::default()
        }))
        .build()
        .unwrap();
    assert_eq!(
        args(&replaced, &spec!("openmpi@5.0.0 +romio schedulers=tm")),
        ["--without-lsf"]
    );
}

#[rstest]
fn test_chain_and_inherited_metadata(derived: PackageDefinition) {
    let names: Vec<_> = derived
        .chain()
        .into_iter()
        .map(|link| link.qualified_name().to_string())
        .collect();
    assert_eq!(names, ["builtin.openmpi", "alpha.openmpi"]);
    assert_eq!(
        derived.description(),
        Some("An open source Message Passing Interface implementation")
    );
    assert_eq!(derived.homepage(), Some("https://www.open-mpi.org"));
    assert_eq!(derived.git(), None);
    assert_eq!(derived.local_args().len(), 1);
    let variants: Vec<_> = derived.schema().iter().map(|d| d.name.as_str()).collect();
    assert_eq!(variants, ["romio", "alpha", "fast_path"]);
}

#[rstest]
fn test_validate_runs_before_emission(derived: PackageDefinition) {
    // fast_path is active but has no value
    let err = derived
        .build_args(&spec!("openmpi@5.0.0 +romio +alpha"))
        .expect_err("incomplete spec");
    assert!(matches!(err, Error::InvalidSpec { .. }), "{err}");

    let err = derived
        .build_args(&spec!("rpmbb@0.4.0"))
        .expect_err("wrong package");
    assert!(matches!(err, Error::NameMismatch { .. }), "{err}");
}

#[fixture]
fn rpmbb() -> PackageDefinition {
    PackageDefinition::builder(pkg_name!("rpmbb"))
        .namespace(pkg_name!("rpmbb"))
        .build_system(BuildSystem::CMake)
        .git("https://github.com/tsukuba-hpcs/rpmembb.git")
        .maintainer("range3")
        .version(VersionDeclaration::new(
            version!("master"),
            SourceRef::Branch("master".into()),
        ))
        .version(VersionDeclaration::new(
            version!("0.4.0"),
            SourceRef::Tag("v0.4.0".into()),
        ))
        .variant(VariantDeclaration::boolean(var_name!("tests"), false))
        .depends_on(DependencyDeclaration::parse("mpi").unwrap())
        .depends_on(DependencyDeclaration::parse("pmdk+ndctl").unwrap())
        .conflict(ConflictDeclaration::new(when("%gcc@:9")).with_msg("C++20 is required"))
        .env(EnvOp::unset("CPM_SOURCE_CACHE"))
        .arg(ArgRule::Define {
            name: "RPMBB_BUILD_TESTS".into(),
            variant: var_name!("tests"),
        })
        .build()
        .unwrap()
}

fn rpmbb_spec(source: &str) -> Spec {
    let mpi = spec!("openmpi@5.0.0 +romio");
    let pmdk = spec!("pmdk@1.12.1 +ndctl");
    source
        .parse::<Spec>()
        .unwrap()
        .with_dependency(pkg_name!("mpi"), mpi)
        .with_dependency(pkg_name!("pmdk"), pmdk)
}

#[rstest]
fn test_validate_accepts(rpmbb: PackageDefinition) {
    rpmbb
        .validate(&rpmbb_spec("rpmbb@0.4.0 ~tests %gcc@12.2.0"))
        .expect("spec is valid");
    assert_eq!(
        args(&rpmbb, &rpmbb_spec("rpmbb@master +tests")),
        ["-DRPMBB_BUILD_TESTS:BOOL=ON"]
    );
}

#[rstest]
fn test_validate_version_not_declared(rpmbb: PackageDefinition) {
    let err = rpmbb
        .validate(&rpmbb_spec("rpmbb@0.3.0 ~tests"))
        .expect_err("0.3.0 is not declared");
    assert!(matches!(err, Error::VersionNotDeclared { .. }), "{err}");
}

#[rstest]
fn test_validate_dependency_violation(rpmbb: PackageDefinition) {
    let missing = spec!("rpmbb@0.4.0 ~tests");
    let err = rpmbb.validate(&missing).expect_err("no mpi given");
    assert!(matches!(err, Error::DependencyViolation { .. }), "{err}");

    let plain_pmdk = spec!("rpmbb@0.4.0 ~tests")
        .with_dependency(pkg_name!("mpi"), spec!("openmpi@5.0.0 +romio"))
        .with_dependency(pkg_name!("pmdk"), spec!("pmdk@1.12.1 ~ndctl"));
    match rpmbb.validate(&plain_pmdk) {
        Err(Error::DependencyViolation { dependency, .. }) => {
            assert_eq!(dependency, "pmdk+ndctl")
        }
        other => panic!("expected a dependency violation, got {other:?}"),
    }
}

#[rstest]
#[case("rpmbb@0.4.0 ~tests %gcc@9.4.0", true)]
#[case("rpmbb@0.4.0 ~tests %gcc@9", true)]
#[case("rpmbb@0.4.0 ~tests %gcc@10.1.0", false)]
#[case("rpmbb@0.4.0 ~tests %clang@9.0.0", false)]
#[case("rpmbb@0.4.0 ~tests", false)]
fn test_validate_conflict(
    rpmbb: PackageDefinition,
    #[case] source: &str,
    #[case] violated: bool,
) {
    match (rpmbb.validate(&rpmbb_spec(source)), violated) {
        (Ok(()), false) => {}
        (Err(Error::ConflictViolation { msg, .. }), true) => {
            assert_eq!(msg.as_deref(), Some("C++20 is required"))
        }
        (result, _) => panic!("unexpected result for {source}: {result:?}"),
    }
}

#[rstest]
fn test_plan(rpmbb: PackageDefinition) {
    let plan = rpmbb.plan(&rpmbb_spec("rpmbb@0.4.0 ~tests")).unwrap();
    assert_eq!(plan.package.to_string(), "rpmbb.rpmbb");
    assert_eq!(plan.build_system, BuildSystem::CMake);
    assert_eq!(plan.environment, [EnvOp::unset("CPM_SOURCE_CACHE")]);
    assert_eq!(plan.command_line(), ["cmake", "-DRPMBB_BUILD_TESTS:BOOL=OFF"]);
    let yaml = serde_yaml::to_string(&plan).unwrap();
    assert!(yaml.contains("program: cmake"), "{yaml}");
}

#[rstest]
fn test_setup_build_environment(rpmbb: PackageDefinition) {
    let base = Arc::new(rpmbb);
    let derived = PackageDefinition::derive(pkg_name!("rpmbb"), base)
        .env(EnvOp::set("CPM_SOURCE_CACHE", "/opt/cpm"))
        .build()
        .unwrap();

    let mut env = HashMap::from([("CPM_SOURCE_CACHE".to_string(), "/tmp/cpm".to_string())]);
    derived.base().unwrap().setup_build_environment(&mut env);
    assert!(env.get("CPM_SOURCE_CACHE").is_none());

    // operations of the base apply first
    let mut env = HashMap::from([("CPM_SOURCE_CACHE".to_string(), "/tmp/cpm".to_string())]);
    derived.setup_build_environment(&mut env);
    assert_eq!(env.get("CPM_SOURCE_CACHE").map(String::as_str), Some("/opt/cpm"));
}

#[rstest]
fn test_inherited_requirements(rpmbb: PackageDefinition) {
    let derived = PackageDefinition::derive(pkg_name!("rpmbb"), Arc::new(rpmbb))
        .version(VersionDeclaration::new(
            version!("0.4.0"),
            SourceRef::Tag("v0.4.0-fixed".into()),
        ))
        .build()
        .unwrap();
    assert_eq!(derived.build_system(), BuildSystem::CMake);
    assert_eq!(derived.maintainers(), ["range3"]);
    assert_eq!(derived.dependencies().len(), 2);
    assert_eq!(derived.conflicts().len(), 1);
    let versions: Vec<_> = derived.versions().iter().map(|v| v.version.to_string()).collect();
    assert_eq!(versions, ["0.4.0", "master"]);
    assert_eq!(
        derived.get_version(&version!("0.4.0")).map(|v| &v.source),
        Some(&SourceRef::Tag("v0.4.0-fixed".into()))
    );
}

#[rstest]
fn test_definition_errors(base: Arc<PackageDefinition>) {
    let err = PackageDefinition::builder(pkg_name!("rpmbb"))
        .arg(ArgRule::enable_disable(var_name!("tests")))
        .build()
        .expect_err("tests is not declared");
    assert!(matches!(err, DefinitionError::UnknownReference { .. }), "{err}");

    let err = PackageDefinition::builder(pkg_name!("openmpi"))
        .variant(VariantDeclaration::choice(var_name!("fabrics"), ["ucx", "ofi"], "ucx"))
        .arg(ArgRule::with_without(var_name!("fabrics")))
        .build()
        .expect_err("fabrics is not a boolean");
    assert!(matches!(err, DefinitionError::RuleKindMismatch { .. }), "{err}");

    let err = PackageDefinition::builder(pkg_name!("rpmbb"))
        .depends_on(DependencyDeclaration::parse("pmdk").unwrap().with_when(when("+rpmem")))
        .build()
        .expect_err("rpmem is not declared");
    assert!(matches!(err, DefinitionError::UnknownReference { .. }), "{err}");

    let err = PackageDefinition::derive(pkg_name!("openmpi"), base)
        .override_variant(VariantDeclaration::boolean(var_name!("peanuts"), false))
        .build()
        .expect_err("peanuts is not inherited");
    assert!(matches!(err, DefinitionError::OverrideMissing { .. }), "{err}");
}

proptest! {
    #[test]
    fn prop_build_args_deterministic_and_prefixed(
        romio in any::<bool>(),
        alpha in any::<bool>(),
        fast_path in any::<bool>(),
        newer in any::<bool>(),
    ) {
        let base = base();
        let derived = derived(base.clone());
        let version = if newer { version!("5.0.0") } else { version!("4.1.5") };
        let mut spec = Spec::new(pkg_name!("openmpi"), version)
            .with_variant(var_name!("romio"), romio)
            .with_variant(var_name!("alpha"), alpha)
            .with_variant(var_name!("fast_path"), fast_path);
        derived.schema().fill_defaults(&mut spec);

        let first = derived.build_args(&spec).unwrap();
        let second = derived.build_args(&spec).unwrap();
        prop_assert_eq!(&first, &second);

        let mut base_spec = spec.clone();
        base.schema().fill_defaults(&mut base_spec);
        base_spec.variants.retain(|name, _| base.schema().contains(name));
        let prefix = base.build_args(&base_spec).unwrap();
        prop_assert!(first.starts_with(&prefix), "{:?} should start with {:?}", first, prefix);
    }
}
