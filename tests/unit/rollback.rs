//! Compensation bookkeeping: what gets recorded, and what undoing looks
//! like through the real inventory file adapter.

#![allow(clippy::expect_used)]

use std::time::Duration;

use muster_cli::application::ports::HostRegistry;
use muster_cli::application::services::orchestrator::run_pipeline;
use muster_cli::domain::stage::EnrollStage;
use muster_cli::infra::command_runner::TokioCommandRunner;
use muster_cli::infra::inventory::InventoryFile;

use crate::mocks::{
    ChooseFirst, LISTING_WITH_CANDIDATE, MemRegistry, PanicPrompt, Pong, ScriptedHost,
    SilentReporter, test_key, test_plan, test_session,
};

#[tokio::test]
async fn successful_registration_records_its_compensation() {
    let host = ScriptedHost::passwordless(LISTING_WITH_CANDIDATE);
    let registry = MemRegistry::new("");
    let key = test_key();
    let plan = test_plan(&key);
    let mut session = test_session(false);

    run_pipeline(
        &mut session,
        &plan,
        &host,
        &PanicPrompt,
        &ChooseFirst,
        &registry,
        &Pong,
        &SilentReporter,
    )
    .await
    .expect("enrollment succeeds");

    assert_eq!(session.stage(), EnrollStage::Done);
    assert!(session.inventory_mutated());
    // The stack is only unwound on abort; on success it simply expires
    // with the session.
    assert!(session.has_pending_compensations());
}

#[tokio::test]
async fn failed_append_records_no_compensation() {
    let host = ScriptedHost::passwordless(LISTING_WITH_CANDIDATE);
    let mut registry = MemRegistry::new("");
    registry.fail_writes = true;
    let key = test_key();
    let plan = test_plan(&key);
    let mut session = test_session(false);

    run_pipeline(
        &mut session,
        &plan,
        &host,
        &PanicPrompt,
        &ChooseFirst,
        &registry,
        &Pong,
        &SilentReporter,
    )
    .await
    .expect("registry trouble never fails the run");

    assert_eq!(session.stage(), EnrollStage::Done);
    assert_eq!(session.warnings().len(), 1);
    assert!(!session.inventory_mutated(), "nothing landed in the file");
    assert!(
        !session.has_pending_compensations(),
        "a failed append must not be compensated"
    );
}

#[tokio::test]
async fn append_then_remove_restores_the_inventory_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("hosts");
    let seed = "# fleet inventory\n10.0.0.7   # web-1 - Added 2026-07-14 09:12:43\n";
    std::fs::write(&path, seed).expect("seed inventory");

    let file = InventoryFile::with_path(TokioCommandRunner::new(Duration::from_secs(5)), &path);

    assert!(!file.is_registered("10.0.0.5").await.expect("readable"));
    file.append("10.0.0.5   # host5 - Added 2026-08-23 11:00:00")
        .await
        .expect("append");
    assert!(file.is_registered("10.0.0.5").await.expect("readable"));

    file.remove("10.0.0.5").await.expect("remove");
    let content = std::fs::read_to_string(&path).expect("read back");
    assert_eq!(content, seed, "undo restores the file byte for byte");
}
