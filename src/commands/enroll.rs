//! Enroll command: bring one host under Ansible management over SSH.
//!
//! Wires the terminal, the local key pair, the configuration, and the SSH
//! and inventory adapters together, then hands the session to the pipeline.
//! Everything interactive lives behind [`TerminalPrompts`]; everything
//! remote lives behind the port traits, so this file is plumbing only.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use crate::application::services::orchestrator::{self, EnrollPlan};
use crate::domain::config::{DEFAULT_INVENTORY_PATH, MusterConfig};
use crate::domain::error::EnrollError;
use crate::domain::host::{TargetHost, parse_target_spec};
use crate::domain::session::{EnrollSession, WarningKind};
use crate::infra::ansible::AnsiblePing;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::{config_path, load_config, state_dir};
use crate::infra::inventory::InventoryFile;
use crate::infra::keys::{LocalKeyPair, default_identity_path};
use crate::infra::prompt::TerminalPrompts;
use crate::infra::ssh::{SshClient, ensure_known_hosts};
use crate::output::{OutputContext, TerminalReporter};

/// Arguments for the `muster enroll` command.
#[derive(Args)]
pub struct EnrollArgs {
    /// Target host as `[login@]address`
    pub target: String,

    /// Bootstrap login (overrides the login in the target, if any)
    #[arg(short, long)]
    pub login: Option<String>,

    /// SSH port on the target
    #[arg(short, long, default_value_t = 22)]
    pub port: u16,

    /// Inventory name for the host (default: ask the host via `hostname -s`)
    #[arg(long)]
    pub hostname: Option<String>,

    /// Private key whose public half gets installed
    #[arg(short = 'i', long)]
    pub identity: Option<PathBuf>,

    /// Ansible inventory file to register the host in
    #[arg(long)]
    pub inventory: Option<PathBuf>,

    /// Inspect and report without changing the host or the inventory
    #[arg(long)]
    pub dry_run: bool,

    /// Show the outcome of every remote step
    #[arg(short, long)]
    pub verbose: bool,

    /// Never prompt; accept defaults and fail where input would be required
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Fully resolved run settings: flags override the configuration file,
/// which overrides built-in defaults.
#[derive(Debug)]
struct EnrollSettings {
    host: TargetHost,
    identity: PathBuf,
    inventory: PathBuf,
    non_interactive: bool,
}

/// Layer `args` over `config` and validate the result.
fn resolve_settings(args: &EnrollArgs, config: &MusterConfig) -> Result<EnrollSettings> {
    let (spec_login, address) = parse_target_spec(&args.target)?;
    let login = args
        .login
        .clone()
        .or(spec_login)
        .or_else(|| config.defaults.login.clone())
        .context(
            "no login for the host; give one as LOGIN@ADDRESS, with --login, \
             or as defaults.login in the configuration",
        )?;
    let host = TargetHost::new(&address, args.port, &login)?;

    let identity = match (&args.identity, &config.defaults.identity) {
        (Some(path), _) => path.clone(),
        (None, Some(path)) => PathBuf::from(path),
        (None, None) => default_identity_path()?,
    };

    let inventory = args
        .inventory
        .clone()
        .or_else(|| config.defaults.inventory.as_deref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INVENTORY_PATH));

    let non_interactive =
        args.yes || std::env::var("CI").is_ok() || std::env::var("MUSTER_YES").is_ok();

    Ok(EnrollSettings {
        host,
        identity,
        inventory,
        non_interactive,
    })
}

/// Entry point for `muster enroll`.
///
/// # Errors
///
/// Returns an error when the arguments or the local setup are invalid, or
/// when a fatal enrollment stage fails. Inventory and ping problems are
/// downgraded to warnings by the pipeline and never reach this result.
pub async fn run(args: &EnrollArgs, ctx: &OutputContext, json: bool) -> Result<()> {
    let config = load_config(&config_path()?)?;
    let settings = resolve_settings(args, &config)?;
    let keys = LocalKeyPair::load(&settings.identity)?;
    let known_hosts = ensure_known_hosts(&state_dir()?)?;

    let mut session = EnrollSession::new(settings.host, args.dry_run);
    if keys.fixed_permissions() {
        session.warn(
            WarningKind::KeyPermissions,
            format!(
                "tightened permissions on {} to 0600",
                settings.identity.display()
            ),
        );
    }
    if args.dry_run {
        ctx.info("dry run: nothing on the host or in the inventory will change");
    }

    let connect_timeout = Duration::from_secs(config.ssh.connect_timeout_secs);
    let command_timeout = Duration::from_secs(config.ssh.command_timeout_secs);
    let shell = SshClient::new(
        TokioCommandRunner::new(command_timeout),
        &session.host.address,
        session.host.port,
        &settings.identity,
        &known_hosts,
        connect_timeout,
    );
    let registry = InventoryFile::with_path(
        TokioCommandRunner::new(command_timeout),
        &settings.inventory,
    );
    let ping = AnsiblePing::new(TokioCommandRunner::new(command_timeout), &known_hosts);
    let prompts = TerminalPrompts::new(settings.non_interactive);
    let reporter = TerminalReporter::new(ctx, args.verbose);

    let plan = EnrollPlan {
        key: keys.public(),
        key_path: keys.private_path(),
        rules: config.discovery.rules(),
        default_account: &config.discovery.default_account,
        hostname_override: args.hostname.as_deref(),
    };

    let result = orchestrator::run_pipeline(
        &mut session,
        &plan,
        &shell,
        &prompts,
        &prompts,
        &registry,
        &ping,
        &reporter,
    )
    .await;
    reporter.clear();

    match result {
        Ok(()) => print_summary(ctx, json, &session, &settings.inventory),
        Err(err) => {
            if json {
                let code = err
                    .downcast_ref::<EnrollError>()
                    .map_or("enrollment", EnrollError::class);
                println!(
                    "{}",
                    crate::output::json::format_error(&format!("{err:#}"), code)?
                );
            }
            Err(err)
        }
    }
}

/// Print the closing summary block after a finished run.
fn print_summary(
    ctx: &OutputContext,
    json: bool,
    session: &EnrollSession,
    inventory_path: &Path,
) -> Result<()> {
    let account = session
        .host
        .automation()
        .map_or("(none)", |account| account.name.as_str());

    if json {
        let warnings: Vec<&str> = session
            .warnings()
            .iter()
            .map(|warning| warning.message.as_str())
            .collect();
        let summary = serde_json::json!({
            "address": session.host.address,
            "port": session.host.port,
            "account": account,
            "sudo": session.capability().label(),
            "inventory": inventory_path.display().to_string(),
            "registered": session.inventory_mutated(),
            "dry_run": session.dry_run,
            "warnings": warnings,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("JSON serialization")?
        );
        return Ok(());
    }

    if !ctx.quiet {
        println!();
    }
    if session.dry_run {
        ctx.success(&format!(
            "dry run finished; {} was not changed",
            session.host.address
        ));
    } else {
        ctx.success(&format!("{} enrolled", session.host.address));
    }
    ctx.kv(
        "Address:",
        &format!("{}:{}", session.host.address, session.host.port),
    );
    ctx.kv("Account:", account);
    ctx.kv("Sudo:", session.capability().label());
    ctx.kv("Inventory:", &inventory_path.display().to_string());
    for warning in session.warnings() {
        ctx.warn(&warning.message);
    }
    Ok(())
}

// ── Unit tests ────────────────────────────────────────────────────────────────
