// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use clap::Args;
use colored::Colorize;
use miette::Result;
use varconf_config::Config;
use varconf_foundation::Compatibility;
use varconf_query::parse_condition;

use crate::{flags, CommandArgs, Run};

#[cfg(test)]
#[path = "./cmd_check_test.rs"]
mod cmd_check_test;

/// Test whether a spec satisfies one or more queries
///
/// Exits with a non-zero status unless every query is satisfied.
#[derive(Args, Clone, Debug)]
pub struct Check {
    #[clap(flatten)]
    pub repos: flags::Repositories,

    /// Fill in the default values of unset variants before checking
    ///
    /// This loads the package definition that the spec names.
    #[clap(long, short)]
    pub defaults: bool,

    /// The spec to test, as a yaml file or a single line spec
    #[clap(name = "SPEC")]
    pub spec: String,

    /// Queries to evaluate, eg: '+romio @5: schedulers=tm'
    #[clap(name = "QUERY", required = true)]
    pub queries: Vec<String>,
}

impl Check {
    /// Evaluate every query, in the order given.
    ///
    /// All queries are parsed before any of them is evaluated.
    pub fn evaluate(&self, config: &Config) -> Result<Vec<(String, Compatibility)>> {
        let conditions = self
            .queries
            .iter()
            .map(parse_condition)
            .collect::<varconf_query::Result<Vec<_>>>()?;

        let mut spec = flags::read_spec(&self.spec)?;
        if self.defaults {
            let stack = self.repos.get_stack(config)?;
            let definition = stack.load(&flags::definition_name(&spec))?;
            definition.schema().fill_defaults(&mut spec);
        }
        tracing::debug!(%spec, "checking");

        Ok(self
            .queries
            .iter()
            .cloned()
            .zip(conditions.iter().map(|c| c.check(&spec)))
            .collect())
    }
}

impl Run for Check {
    fn run(&mut self) -> Result<i32> {
        let config = varconf_config::get_config()?;
        let mut code = 0;
        for (query, compat) in self.evaluate(&config)? {
            match compat {
                Compatibility::Compatible => println!("{} {query}", "OK".green()),
                Compatibility::Incompatible(reason) => {
                    println!("{} {query}: {reason}", "NO".red());
                    code = 1;
                }
            }
        }
        Ok(code)
    }
}

impl CommandArgs for Check {
    fn get_positional_args(&self) -> Vec<String> {
        std::iter::once(self.spec.clone())
            .chain(self.queries.iter().cloned())
            .collect()
    }
}
