//! The privilege gate: no usable sudo means nothing gets mutated.

#![allow(clippy::expect_used)]

use muster_cli::application::services::orchestrator::run_pipeline;
use muster_cli::domain::error::EnrollError;
use muster_cli::domain::session::SudoCapability;
use muster_cli::domain::stage::EnrollStage;

use crate::mocks::{
    ChooseFirst, LISTING_WITH_CANDIDATE, MemRegistry, NoPrompt, Pong, PromptOnce, ScriptedHost,
    SilentReporter, test_key, test_plan, test_session,
};

#[tokio::test]
async fn locked_down_host_aborts_before_any_mutation() {
    let host = ScriptedHost::locked_down(LISTING_WITH_CANDIDATE);
    let registry = MemRegistry::new("");
    let key = test_key();
    let plan = test_plan(&key);
    let mut session = test_session(false);

    let err = run_pipeline(
        &mut session,
        &plan,
        &host,
        &NoPrompt,
        &ChooseFirst,
        &registry,
        &Pong,
        &SilentReporter,
    )
    .await
    .expect_err("no escalation, no enrollment");

    let class = err
        .downcast_ref::<EnrollError>()
        .map(EnrollError::class)
        .expect("typed enrollment error");
    assert_eq!(class, "privilege");
    assert_eq!(session.stage(), EnrollStage::Aborted);
    assert_eq!(session.capability(), SudoCapability::None);

    // Only the connectivity probe and the passwordless check ran.
    let ran = host.ran();
    assert_eq!(ran, vec!["plain:true", "sudo:true"], "{ran:?}");
    assert!(!host.mutated());
    assert!(host.ran_with_key().is_empty());
    assert!(registry.appended().is_empty());
    assert_eq!(registry.content(), "");
}

#[tokio::test]
async fn declined_prompt_mentions_the_suppressed_prompt() {
    let host = ScriptedHost::locked_down(LISTING_WITH_CANDIDATE);
    let registry = MemRegistry::new("");
    let key = test_key();
    let plan = test_plan(&key);
    let mut session = test_session(false);

    let err = run_pipeline(
        &mut session,
        &plan,
        &host,
        &NoPrompt,
        &ChooseFirst,
        &registry,
        &Pong,
        &SilentReporter,
    )
    .await
    .expect_err("no escalation, no enrollment");

    let text = format!("{err}");
    assert!(text.contains("'alice' has no usable sudo on 10.0.0.5"), "{text}");
    assert!(text.contains("suppressed in non-interactive mode"), "{text}");
    assert!(text.contains("usermod -aG sudo alice"), "{text}");
}

#[tokio::test]
async fn rejected_password_aborts_with_the_privilege_class() {
    let host = ScriptedHost::password_gated("right-horse-battery", LISTING_WITH_CANDIDATE);
    let registry = MemRegistry::new("");
    let prompts = PromptOnce::new("wrong-guess");
    let key = test_key();
    let plan = test_plan(&key);
    let mut session = test_session(false);

    let err = run_pipeline(
        &mut session,
        &plan,
        &host,
        &prompts,
        &ChooseFirst,
        &registry,
        &Pong,
        &SilentReporter,
    )
    .await
    .expect_err("wrong password, no enrollment");

    let class = err
        .downcast_ref::<EnrollError>()
        .map(EnrollError::class)
        .expect("typed enrollment error");
    assert_eq!(class, "privilege");
    assert!(format!("{err}").contains("not accepted"), "{err}");
    assert_eq!(prompts.calls(), 1, "one attempt, no retry loop");

    // The failed validation attempt is the last remote command.
    let ran = host.ran();
    assert_eq!(ran, vec!["plain:true", "sudo:true", "askpass:true"], "{ran:?}");
    assert_eq!(session.stage(), EnrollStage::Aborted);
    assert!(!host.mutated());
    assert!(registry.appended().is_empty());
}
