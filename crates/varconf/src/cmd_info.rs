// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Write;

use clap::Args;
use colored::Colorize;
use itertools::Itertools;
use miette::{IntoDiagnostic, Result};
use varconf_config::Config;
use varconf_schema::PackageDefinition;

use crate::{flags, CommandArgs, Run};

#[cfg(test)]
#[path = "./cmd_info_test.rs"]
mod cmd_info_test;

/// Show the variants, versions and rules of a package definition
#[derive(Args, Clone, Debug)]
pub struct Info {
    #[clap(flatten)]
    pub repos: flags::Repositories,

    /// The package to show, eg: openmpi or peanuts.openmpi
    #[clap(name = "PKG")]
    pub package: String,
}

impl Info {
    pub fn render(&self, config: &Config) -> Result<String> {
        let stack = self.repos.get_stack(config)?;
        let definition = stack.load(&self.package)?;
        format_definition(&definition).into_diagnostic()
    }
}

impl Run for Info {
    fn run(&mut self) -> Result<i32> {
        let config = varconf_config::get_config()?;
        print!("{}", self.render(&config)?);
        Ok(0)
    }
}

impl CommandArgs for Info {
    fn get_positional_args(&self) -> Vec<String> {
        vec![self.package.clone()]
    }
}

/// Describe a definition and everything it inherits.
pub fn format_definition(definition: &PackageDefinition) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let chain = definition.chain();
    writeln!(out, "{}", definition.qualified_name().to_string().bold())?;
    if chain.len() > 1 {
        let names = chain.iter().map(|link| link.qualified_name()).join(" -> ");
        writeln!(out, "  {} {names}", "chain:".cyan())?;
    }
    if let Some(description) = definition.description() {
        writeln!(out, "  {} {description}", "description:".cyan())?;
    }
    if let Some(homepage) = definition.homepage() {
        writeln!(out, "  {} {homepage}", "homepage:".cyan())?;
    }
    if let Some(git) = definition.git() {
        writeln!(out, "  {} {git}", "git:".cyan())?;
    }
    if !definition.maintainers().is_empty() {
        writeln!(
            out,
            "  {} {}",
            "maintainers:".cyan(),
            definition.maintainers().join(", ")
        )?;
    }
    writeln!(
        out,
        "  {} {} ({})",
        "build system:".cyan(),
        definition.build_system(),
        definition.build_system().program()
    )?;

    let versions = definition.versions();
    if !versions.is_empty() {
        writeln!(out, "{}", "versions:".green())?;
        for declared in versions {
            let submodules = if declared.submodules {
                " with submodules"
            } else {
                ""
            };
            writeln!(out, "  {} ({}{submodules})", declared.version, declared.source)?;
        }
    }

    let schema = definition.schema();
    if !schema.is_empty() {
        writeln!(out, "{}", "variants:".green())?;
        for declaration in schema.iter() {
            write!(
                out,
                "  {} = {} ({})",
                declaration.name, declaration.default, declaration.kind
            )?;
            if declaration.is_conditional() {
                write!(out, " when {}", declaration.when)?;
            }
            if !schema.is_local(&declaration.name) {
                write!(out, " {}", "[inherited]".dimmed())?;
            }
            writeln!(out)?;
            if !declaration.description.is_empty() {
                writeln!(out, "      {}", declaration.description.dimmed())?;
            }
        }
    }

    let dependencies = definition.dependencies();
    if !dependencies.is_empty() {
        writeln!(out, "{}", "dependencies:".green())?;
        for dependency in dependencies {
            writeln!(out, "  {dependency}")?;
        }
    }
    let conflicts = definition.conflicts();
    if !conflicts.is_empty() {
        writeln!(out, "{}", "conflicts:".green())?;
        for conflict in conflicts {
            writeln!(out, "  {conflict}")?;
        }
    }
    let environment = definition.environment();
    if !environment.is_empty() {
        writeln!(out, "{}", "environment:".green())?;
        for op in environment {
            writeln!(out, "  {}", op.bash_source())?;
        }
    }

    writeln!(out, "{}", "arguments:".green())?;
    for link in chain {
        writeln!(out, "  {}", link.qualified_name().to_string().bold())?;
        if let Some(rule) = link.scheduler_rule() {
            writeln!(
                out,
                "    {} @{} unless schedulers={}",
                rule.flag, rule.since, rule.reserved
            )?;
        }
        for rule in link.local_args() {
            writeln!(out, "    {}", rule.describe())?;
        }
    }
    Ok(out)
}
