//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Enroll hosts into an Ansible-managed fleet over SSH
#[derive(Parser)]
#[command(
    name = "muster",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Print results as JSON (one document on stdout)
    #[arg(long, global = true)]
    pub json: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable ANSI colors
    #[arg(long, global = true, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Enroll a host into the managed fleet
    Enroll(commands::enroll::EnrollArgs),

    /// Print the version
    Version,
}

impl Cli {
    /// Dispatch the parsed command.
    ///
    /// # Errors
    ///
    /// Returns an error when enrollment aborts; the message carries the
    /// remediation text for the failed stage.
    pub async fn run(self) -> Result<()> {
        let Cli {
            no_color,
            quiet,
            json,
            command,
        } = self;
        match command {
            Command::Enroll(args) => {
                // JSON mode owns stdout: progress and summary prose stay off it.
                let ctx = crate::output::OutputContext::new(no_color, quiet || json);
                commands::enroll::run(&args, &ctx, json).await
            }
            Command::Version => {
                commands::version::run(json);
                Ok(())
            }
        }
    }
}
