//! Dry-run purity: a `--dry-run` pipeline inspects everything and changes
//! nothing, locally or remotely.

#![allow(clippy::expect_used)]

use muster_cli::application::services::orchestrator::run_pipeline;
use muster_cli::domain::session::SudoCapability;
use muster_cli::domain::stage::EnrollStage;

use crate::mocks::{
    ChooseFirst, LISTING_WITH_CANDIDATE, MemRegistry, PanicPing, PanicPrompt, PromptOnce,
    RecordingReporter, ScriptedHost, SilentReporter, test_key, test_plan, test_session,
};

#[tokio::test]
async fn dry_run_reaches_done_without_touching_anything() {
    let host = ScriptedHost::passwordless(LISTING_WITH_CANDIDATE);
    let registry = MemRegistry::new("");
    let key = test_key();
    let plan = test_plan(&key);
    let mut session = test_session(true);

    run_pipeline(
        &mut session,
        &plan,
        &host,
        &PanicPrompt,
        &ChooseFirst,
        &registry,
        &PanicPing,
        &SilentReporter,
    )
    .await
    .expect("dry run succeeds");

    assert_eq!(session.stage(), EnrollStage::Done);
    assert!(!host.mutated(), "no install transaction");
    assert!(
        host.ran_with_key().is_empty(),
        "verification is skipped: no key was installed to verify"
    );
    assert!(registry.appended().is_empty());
    assert_eq!(registry.content(), "");
    assert!(!session.inventory_mutated());
    assert!(!session.has_pending_compensations());

    // The read-only part of the pipeline still ran in full.
    let ran = host.ran();
    assert!(ran.contains(&"plain:true".to_string()), "{ran:?}");
    assert!(ran.contains(&"sudo:true".to_string()), "{ran:?}");
    assert!(ran.contains(&"plain:getent passwd".to_string()), "{ran:?}");
    assert!(
        ran.iter().any(|entry| entry.contains(":cat ")),
        "authorized_keys still inspected: {ran:?}"
    );
    assert!(
        ran.iter().any(|entry| entry.contains(":test -d ")),
        "target directory still probed: {ran:?}"
    );
}

#[tokio::test]
async fn dry_run_still_validates_a_prompted_password() {
    let host = ScriptedHost::password_gated("hunter2", LISTING_WITH_CANDIDATE);
    let registry = MemRegistry::new("");
    let prompts = PromptOnce::new("hunter2");
    let key = test_key();
    let plan = test_plan(&key);
    let mut session = test_session(true);

    run_pipeline(
        &mut session,
        &plan,
        &host,
        &prompts,
        &ChooseFirst,
        &registry,
        &PanicPing,
        &SilentReporter,
    )
    .await
    .expect("dry run succeeds");

    assert_eq!(session.capability(), SudoCapability::PasswordCached);
    assert_eq!(prompts.calls(), 1);
    assert!(!host.mutated(), "validation is read-only");
}

#[tokio::test]
async fn dry_run_narrates_the_skipped_mutations() {
    let host = ScriptedHost::passwordless(LISTING_WITH_CANDIDATE);
    let registry = MemRegistry::new("");
    let reporter = RecordingReporter::new();
    let key = test_key();
    let plan = test_plan(&key);
    let mut session = test_session(true);

    run_pipeline(
        &mut session,
        &plan,
        &host,
        &PanicPrompt,
        &ChooseFirst,
        &registry,
        &PanicPing,
        &reporter,
    )
    .await
    .expect("dry run succeeds");

    let lines = reporter.lines();
    assert!(
        lines
            .iter()
            .any(|line| line.contains("would append the key to /home/svc-auto/.ssh/authorized_keys")),
        "{lines:?}"
    );
    assert!(
        lines.iter().any(|line| line.contains("dry run: no remote changes made")),
        "{lines:?}"
    );
    assert!(
        lines
            .iter()
            .any(|line| line.contains("would append to /etc/ansible/hosts: 10.0.0.5   # host5 - Added ")),
        "{lines:?}"
    );
}
