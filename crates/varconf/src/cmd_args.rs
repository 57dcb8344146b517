// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use clap::{Args, ValueEnum};
use miette::{IntoDiagnostic, Result};
use varconf_config::Config;
use varconf_schema::BuildPlan;

use crate::{flags, CommandArgs, Run};

#[cfg(test)]
#[path = "./cmd_args_test.rs"]
mod cmd_args_test;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// One argument per line
    #[default]
    Lines,
    /// A bash script that prepares the environment and runs the build tool
    Shell,
    /// The complete build plan
    Yaml,
}

/// Resolve a spec into the arguments of its build tool
#[derive(Args, Clone, Debug)]
pub struct CmdArgs {
    #[clap(flatten)]
    pub repos: flags::Repositories,

    /// Load this package definition instead of the one the spec names
    ///
    /// This may be qualified by a namespace, eg: peanuts.openmpi
    #[clap(long, short)]
    pub package: Option<String>,

    /// Do not fill in default values for unset variants
    #[clap(long)]
    pub no_defaults: bool,

    /// How to print the result
    #[clap(long, short, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// The spec to resolve, as a yaml file or a single line spec
    #[clap(name = "SPEC")]
    pub spec: String,
}

impl CmdArgs {
    /// Load the definition and produce the build plan of the spec.
    pub fn plan(&self, config: &Config) -> Result<BuildPlan> {
        let mut spec = flags::read_spec(&self.spec)?;
        let stack = self.repos.get_stack(config)?;
        let package = match &self.package {
            Some(package) => package.clone(),
            None => flags::definition_name(&spec),
        };
        let definition = stack.load(&package)?;
        tracing::debug!(package = %definition.qualified_name(), "loaded definition");
        if !self.no_defaults {
            definition.schema().fill_defaults(&mut spec);
        }
        tracing::debug!(%spec, "resolving");
        Ok(definition.plan(&spec)?)
    }

    /// The plan of the spec, formatted for output.
    pub fn render(&self, config: &Config) -> Result<String> {
        let plan = self.plan(config)?;
        let out = match self.format {
            OutputFormat::Lines => plan
                .args
                .iter()
                .map(|arg| format!("{arg}\n"))
                .collect(),
            OutputFormat::Shell => {
                let mut out = String::new();
                for op in plan.environment.iter() {
                    out.push_str(&op.bash_source());
                    out.push('\n');
                }
                let command: Vec<_> = plan.command_line().iter().map(|a| shell_quote(a)).collect();
                out.push_str(&command.join(" "));
                out.push('\n');
                out
            }
            OutputFormat::Yaml => serde_yaml::to_string(&plan).into_diagnostic()?,
        };
        Ok(out)
    }
}

impl Run for CmdArgs {
    fn run(&mut self) -> Result<i32> {
        let config = varconf_config::get_config()?;
        print!("{}", self.render(&config)?);
        Ok(0)
    }
}

impl CommandArgs for CmdArgs {
    fn get_positional_args(&self) -> Vec<String> {
        vec![self.spec.clone()]
    }
}

/// Quote an argument for bash, if needed.
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_=+./,:@%".contains(c));
    if plain {
        return arg.to_owned();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}
