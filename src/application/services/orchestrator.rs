//! The enrollment pipeline.
//!
//! Drives the stage machine from `Init` to `Done`, one service per stage.
//! The first fatal error moves the session to `Aborted`, unwinds any
//! recorded compensations in LIFO order, and lands on `RolledBack` when
//! something had to be undone. Warnings accumulate on the session and are
//! reported by the command layer at the end.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{
    CandidateResolver, Escalation, HostRegistry, ManagementPing, ProgressReporter, RemoteShell,
    SecretPrompt,
};
use crate::application::services::{
    install_key::install_credential, inventory::register_host, ping::ping_management_layer,
    privilege::detect_capability, probe::probe_connection,
    resolve_user::resolve_automation_account, verify_access::verify_unattended_access,
};
use crate::domain::account::DiscoveryRules;
use crate::domain::host::validate_address;
use crate::domain::pubkey::PublicKey;
use crate::domain::session::{Compensation, EnrollSession};
use crate::domain::stage::EnrollStage;

/// Everything the pipeline needs besides the session and its ports.
pub struct EnrollPlan<'a> {
    /// The public key to authorize on the host.
    pub key: &'a PublicKey,
    /// Path to the matching private key, for the Ansible ping.
    pub key_path: &'a Path,
    /// Account discovery rules from the configuration.
    pub rules: DiscoveryRules,
    /// Account name offered when discovery finds no candidate.
    pub default_account: &'a str,
    /// Registry hostname override (`--hostname`).
    pub hostname_override: Option<&'a str>,
}

/// Run the full enrollment pipeline on `session`.
///
/// # Errors
///
/// Returns the first fatal stage error. By then the session has been moved
/// to `Aborted` or `RolledBack` and compensations have been applied.
#[allow(clippy::too_many_arguments)]
pub async fn run_pipeline(
    session: &mut EnrollSession,
    plan: &EnrollPlan<'_>,
    shell: &impl RemoteShell,
    secrets: &impl SecretPrompt,
    resolver: &impl CandidateResolver,
    registry: &impl HostRegistry,
    ping: &impl ManagementPing,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    anyhow::ensure!(
        session.stage() == EnrollStage::Init,
        "enrollment pipeline started from {:?}, expected Init",
        session.stage()
    );

    let mut next = session.stage().next();
    while let Some(stage) = next {
        if stage != EnrollStage::Done {
            reporter.step(stage.description());
        }
        let outcome = execute_stage(
            stage, session, plan, shell, secrets, resolver, registry, ping, reporter,
        )
        .await;
        if let Err(err) = outcome {
            abort_and_unwind(session, registry, reporter).await;
            return Err(err);
        }
        session.advance(stage);
        next = stage.next();
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn execute_stage(
    stage: EnrollStage,
    session: &mut EnrollSession,
    plan: &EnrollPlan<'_>,
    shell: &impl RemoteShell,
    secrets: &impl SecretPrompt,
    resolver: &impl CandidateResolver,
    registry: &impl HostRegistry,
    ping: &impl ManagementPing,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    match stage {
        EnrollStage::Probed => probe_connection(shell, &session.host, reporter).await,
        EnrollStage::PrivilegeKnown => {
            detect_capability(shell, secrets, session, reporter).await
        }
        EnrollStage::UserResolved => {
            resolve_automation_account(
                shell,
                resolver,
                &plan.rules,
                plan.default_account,
                session,
                reporter,
            )
            .await
        }
        EnrollStage::KeyInstalled => install_credential(shell, plan.key, session, reporter).await,
        EnrollStage::AccessVerified => verify_unattended_access(shell, session, reporter).await,
        EnrollStage::Inventoried => {
            let hostname =
                resolve_hostname(shell, session, plan.hostname_override, reporter).await;
            register_host(registry, &hostname, session, reporter).await
        }
        EnrollStage::Verified => {
            ping_management_layer(ping, plan.key_path, session, reporter).await
        }
        // Done carries no work of its own; Init, Aborted, and RolledBack
        // are never yielded by next().
        EnrollStage::Init
        | EnrollStage::Done
        | EnrollStage::Aborted
        | EnrollStage::RolledBack => Ok(()),
    }
}

/// The name recorded next to the address in the registry.
///
/// Precedence: explicit override, then the host's own short hostname, then
/// the address. Never fatal; a host that cannot report its name is still
/// registered.
async fn resolve_hostname(
    shell: &impl RemoteShell,
    session: &EnrollSession,
    override_name: Option<&str>,
    reporter: &impl ProgressReporter,
) -> String {
    if let Some(name) = override_name {
        return name.to_string();
    }
    let fallback = session.host.address.clone();
    match shell
        .run(&session.host.login, "hostname -s", Escalation::None)
        .await
    {
        Ok(output) if output.status.success() => {
            let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if validate_address(&name).is_ok() {
                name
            } else {
                fallback
            }
        }
        Ok(_) | Err(_) => {
            reporter.detail("hostname detection failed, registering by address");
            fallback
        }
    }
}

/// Move the session to `Aborted` and apply pending compensations.
///
/// Lands on `RolledBack` exactly when something was unwound. Compensation
/// failures are reported with manual instructions but do not change the
/// terminal stage.
async fn abort_and_unwind(
    session: &mut EnrollSession,
    registry: &impl HostRegistry,
    reporter: &impl ProgressReporter,
) {
    session.advance(EnrollStage::Aborted);
    if !session.has_pending_compensations() {
        return;
    }
    reporter.step("Rolling back");
    while let Some(compensation) = session.pop_compensation() {
        match compensation {
            Compensation::RemoveRegistryLine { address } => {
                match registry.remove(&address).await {
                    Ok(()) => reporter.success(&format!(
                        "removed {address} from {}",
                        registry.location().display()
                    )),
                    Err(err) => reporter.warn(&format!(
                        "rollback failed: {err}. Remove the '{address}' line from {} manually",
                        registry.location().display()
                    )),
                }
            }
        }
    }
    session.advance(EnrollStage::RolledBack);
}

// ── Unit tests ────────────────────────────────────────────────────────────────
