// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use varconf_config::Config;
use varconf_foundation::name::PkgName;
use varconf_foundation::spec::Spec;
use varconf_foundation::FromYaml;
use varconf_repo::RepositoryStack;
use varconf_schema::SchedulerRule;

#[cfg(test)]
#[path = "./flags_test.rs"]
mod flags_test;

/// Where package definitions are loaded from.
#[derive(Args, Clone, Debug, Default)]
pub struct Repositories {
    /// A directory of repositories to search before the configured ones
    ///
    /// Each repository is a subdirectory named after its namespace.
    #[clap(long = "repo", short = 'r', value_name = "DIR")]
    pub repos: Vec<PathBuf>,

    /// Prefer packages from this namespace when a name is not qualified
    #[clap(long = "namespace", short = 'n', value_name = "NAMESPACE")]
    pub namespaces: Vec<String>,
}

impl Repositories {
    /// Open every repository named on the command line or in the config.
    pub fn get_stack(&self, config: &Config) -> Result<RepositoryStack> {
        let roots: Vec<_> = self
            .repos
            .iter()
            .chain(config.repository.paths.iter())
            .collect();
        if roots.is_empty() {
            return Err(miette!(
                help = "pass --repo or set repository.paths in the varconf config",
                "No package repositories are configured"
            ));
        }
        tracing::debug!(?roots, "discovering repositories");
        let mut stack = RepositoryStack::discover(roots)?
            .with_default_scheduler_rule(scheduler_rule(config)?);

        let namespaces = self
            .namespaces
            .iter()
            .chain(config.repository.namespaces.iter())
            .map(|ns| {
                ns.parse::<PkgName>()
                    .into_diagnostic()
                    .wrap_err_with(|| format!("Invalid namespace '{ns}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        stack.prioritize(namespaces.iter())?;
        Ok(stack)
    }
}

/// The scheduler rule that definitions receive unless they declare their own.
pub fn scheduler_rule(config: &Config) -> Result<SchedulerRule> {
    let since = config
        .resolve
        .scheduler_since
        .parse()
        .into_diagnostic()
        .wrap_err("Invalid resolve.scheduler_since in the varconf config")?;
    Ok(SchedulerRule {
        since,
        reserved: config.resolve.reserved_scheduler.clone(),
        flag: config.resolve.scheduler_flag.clone(),
    })
}

/// The name of the package definition that builds a spec, qualified
/// when the spec carries a namespace.
pub fn definition_name(spec: &Spec) -> String {
    match &spec.namespace {
        Some(namespace) => format!("{namespace}.{}", spec.name),
        None => spec.name.to_string(),
    }
}

/// Read a spec given on the command line.
///
/// Values ending in `.yaml` or `.yml` are read as a yaml file, which is
/// the only form that can carry dependencies. Anything else is parsed
/// as a single line spec, eg: `openmpi@5.0.0 +romio schedulers=tm`.
pub fn read_spec(source: &str) -> Result<Spec> {
    if source.ends_with(".yaml") || source.ends_with(".yml") {
        let yaml = std::fs::read_to_string(source)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read spec file: {source}"))?;
        return Spec::from_yaml(yaml)
            .into_diagnostic()
            .wrap_err_with(|| format!("Invalid spec file: {source}"));
    }
    source
        .parse()
        .into_diagnostic()
        .wrap_err_with(|| format!("Invalid spec: {source}"))
}
