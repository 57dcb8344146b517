// Copyright (c) Contributors to the varconf project.
// SPDX-License-Identifier: Apache-2.0
//! Main entry point for the varconf command line interface.

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::Result;
use varconf::{cmd_args, cmd_check, cmd_info, cmd_ls, configure_logging, CommandArgs, Run};

/// Resolve variant-conditioned package definitions into build arguments
#[derive(Parser)]
#[clap(about, version)]
pub struct Opt {
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[clap(subcommand)]
    pub cmd: Command,
}

impl Opt {
    pub fn run(&mut self) -> Result<i32> {
        if let Err(err) = configure_logging(self.verbose) {
            eprintln!("{}", format!("Failed to initialize output log: {err}").red());
            return Ok(1);
        }
        tracing::trace!(args = ?self.cmd.get_positional_args(), "running");
        self.cmd.run()
    }
}

#[derive(Subcommand)]
pub enum Command {
    Args(cmd_args::CmdArgs),
    Check(cmd_check::Check),
    Info(cmd_info::Info),
    Ls(cmd_ls::Ls),
}

impl Run for Command {
    fn run(&mut self) -> Result<i32> {
        match self {
            Command::Args(cmd) => cmd.run(),
            Command::Check(cmd) => cmd.run(),
            Command::Info(cmd) => cmd.run(),
            Command::Ls(cmd) => cmd.run(),
        }
    }
}

impl CommandArgs for Command {
    fn get_positional_args(&self) -> Vec<String> {
        match self {
            Command::Args(cmd) => cmd.get_positional_args(),
            Command::Check(cmd) => cmd.get_positional_args(),
            Command::Info(cmd) => cmd.get_positional_args(),
            Command::Ls(cmd) => cmd.get_positional_args(),
        }
    }
}

fn main() {
    let mut opts = Opt::parse();
    let code = match opts.run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:?}");
            1
        }
    };
    std::process::exit(code);
}
