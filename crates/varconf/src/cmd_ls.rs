// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0

use clap::Args;
use miette::Result;
use varconf_config::Config;

use crate::{flags, CommandArgs, Run};

#[cfg(test)]
#[path = "./cmd_ls_test.rs"]
mod cmd_ls_test;

/// List the packages of every repository, in priority order
#[derive(Args, Clone, Debug)]
pub struct Ls {
    #[clap(flatten)]
    pub repos: flags::Repositories,

    /// Also load each definition and show the package it extends
    #[clap(long, short)]
    pub long: bool,

    /// Only show packages whose name contains this text
    #[clap(name = "FILTER")]
    pub filter: Option<String>,
}

impl Ls {
    pub fn list(&self, config: &Config) -> Result<Vec<String>> {
        let stack = self.repos.get_stack(config)?;
        let mut lines = Vec::new();
        for name in stack.list_packages()? {
            if let Some(filter) = &self.filter {
                if !name.name.contains(filter.as_str()) {
                    continue;
                }
            }
            if !self.long {
                lines.push(name.to_string());
                continue;
            }
            let definition = stack.load_name(&name)?;
            match definition.base() {
                Some(base) => lines.push(format!("{name} (extends {})", base.qualified_name())),
                None => lines.push(name.to_string()),
            }
        }
        Ok(lines)
    }
}

impl Run for Ls {
    fn run(&mut self) -> Result<i32> {
        let config = varconf_config::get_config()?;
        for line in self.list(&config)? {
            println!("{line}");
        }
        Ok(0)
    }
}

impl CommandArgs for Ls {
    fn get_positional_args(&self) -> Vec<String> {
        self.filter.iter().cloned().collect()
    }
}
