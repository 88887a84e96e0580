//! Integration tests for online and offline resolution scenarios.

mod common;

use std::sync::Arc;

use common::{ScriptedAuth, ScriptedLookup};
use launcher_account_auth::AuthError;
use launcher_account_core::{
    AccountMode, CANCELLED_REASON, Credentials, ResolutionOutcome, offline_account_id,
};
use launcher_account_profile::LookupError;
use launcher_account_resolver::{AccountResolver, ResolutionReport, ResolutionWarning};

fn run(
    auth: &Arc<ScriptedAuth>,
    lookup: &Arc<ScriptedLookup>,
    credentials: Credentials,
) -> ResolutionReport {
    let mut resolver = AccountResolver::new(auth.clone(), lookup.clone());
    resolver.resolve_with_report(&credentials)
}

#[test]
fn resolution_scenario_tests_online_success_is_online_identity() {
    let auth = Arc::new(ScriptedAuth::succeeding("Alice", "abcd-1234"));
    let lookup = Arc::new(ScriptedLookup::unused());

    let report = run(&auth, &lookup, Credentials::online("Alice", "secret123"));
    let account = report.outcome.account().expect("online login should succeed");

    assert_eq!(account.username(), "Alice");
    assert_eq!(account.id(), "abcd-1234");
    assert_eq!(account.mode(), AccountMode::Online);
    assert_eq!(auth.calls(), 1);
    assert_eq!(lookup.calls(), 0);
}

#[test]
fn resolution_scenario_tests_online_failure_propagates_reason_without_fallback() {
    let auth = Arc::new(ScriptedAuth::failing(AuthError::Rejected(
        "invalid credentials".to_string(),
    )));
    let lookup = Arc::new(ScriptedLookup::payload(r#"{"id":"ffff","name":"Eve"}"#));

    let report = run(&auth, &lookup, Credentials::online("Eve", "wrong"));

    assert_eq!(
        report.outcome,
        ResolutionOutcome::Failure("invalid credentials".to_string())
    );
    assert_eq!(auth.calls(), 1);
    assert_eq!(lookup.calls(), 0);
}

#[test]
fn resolution_scenario_tests_offline_lookup_id_is_adopted() {
    let auth = Arc::new(ScriptedAuth::unused());
    let lookup = Arc::new(ScriptedLookup::payload(r#"{"id":"ffff-0000","name":"Bob"}"#));

    let report = run(&auth, &lookup, Credentials::online("Bob", ""));
    let account = report.outcome.account().expect("offline resolution should succeed");

    assert_eq!(account.username(), "Bob");
    assert_eq!(account.id(), "ffff-0000");
    assert_eq!(account.mode(), AccountMode::Offline);
    assert!(report.warnings.is_empty());
    assert_eq!(auth.calls(), 0);
    assert_eq!(lookup.calls(), 1);
}

#[test]
fn resolution_scenario_tests_offline_name_mismatch_is_non_fatal() {
    let auth = Arc::new(ScriptedAuth::unused());
    let lookup = Arc::new(ScriptedLookup::payload(r#"{"id":"zzzz","name":"NotCarol"}"#));

    let report = run(&auth, &lookup, Credentials::offline("Carol"));

    assert_eq!(
        report.outcome.account().map(|account| account.id()),
        Some("zzzz")
    );
    assert!(report.has_name_mismatch());
    assert_eq!(
        report.warnings,
        vec![ResolutionWarning::NameMismatch {
            requested: "Carol".to_string(),
            returned: Some("NotCarol".to_string()),
        }]
    );
}

#[test]
fn resolution_scenario_tests_offline_lookup_error_falls_back_to_hash() {
    let auth = Arc::new(ScriptedAuth::unused());
    let lookup = Arc::new(ScriptedLookup::failing(LookupError::Transport(
        "timed out".to_string(),
    )));

    let report = run(&auth, &lookup, Credentials::offline("Dave"));
    let account = report.outcome.account().expect("fallback should succeed");

    assert_eq!(account.username(), "Dave");
    assert_eq!(account.id(), offline_account_id("Dave"));
    assert_eq!(account.mode(), AccountMode::Offline);
    assert_eq!(report.warnings, vec![ResolutionWarning::SyntheticId]);
}

#[test]
fn resolution_scenario_tests_offline_always_succeeds_for_bad_payloads() {
    for raw in ["", "null", "{}", r#"{"id":""}"#, r#"{"name":"Dave"}"#, "<html>"] {
        let auth = Arc::new(ScriptedAuth::unused());
        let lookup = Arc::new(ScriptedLookup::payload(raw));

        let report = run(&auth, &lookup, Credentials::offline("Dave"));
        assert_eq!(
            report.outcome.account().map(|account| account.id().to_string()),
            Some(offline_account_id("Dave")),
            "payload {raw:?} should fall back to the synthetic id"
        );
    }
}

#[test]
fn resolution_scenario_tests_offline_fallback_is_deterministic() {
    for username in ["Dave", "", "ümlaut", "name with spaces"] {
        let first = run(
            &Arc::new(ScriptedAuth::unused()),
            &Arc::new(ScriptedLookup::failing(LookupError::Status(404))),
            Credentials::offline(username),
        );
        let second = run(
            &Arc::new(ScriptedAuth::unused()),
            &Arc::new(ScriptedLookup::failing(LookupError::Status(500))),
            Credentials::offline(username),
        );
        assert_eq!(first.outcome, second.outcome);
    }
}

#[test]
fn resolution_scenario_tests_cancellation_surfaces_failure() {
    let online = run(
        &Arc::new(ScriptedAuth::failing(AuthError::Cancelled)),
        &Arc::new(ScriptedLookup::unused()),
        Credentials::online("Alice", "secret123"),
    );
    let offline = run(
        &Arc::new(ScriptedAuth::unused()),
        &Arc::new(ScriptedLookup::failing(LookupError::Cancelled)),
        Credentials::offline("Dave"),
    );

    assert_eq!(online.outcome.failure_reason(), Some(CANCELLED_REASON));
    assert_eq!(offline.outcome.failure_reason(), Some(CANCELLED_REASON));
}
