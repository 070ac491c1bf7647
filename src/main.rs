//! Muster CLI - SSH host enrollment for an Ansible-managed fleet

#![cfg_attr(test, allow(clippy::expect_used))]

use clap::Parser;

use muster_cli::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
