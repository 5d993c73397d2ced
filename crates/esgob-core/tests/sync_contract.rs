//! Contract Test: Slave-Zone Sync
//!
//! Verifies that the sync engine:
//! - Issues zero mutations when the remote state already matches
//! - Adds before it updates or deletes, updates/deletes in sorted order
//! - Returns one result per applied change, each naming its domain, even
//!   when the API response leaves the domain out
//! - Aborts the remaining plan on the first failed call

mod common;

use common::*;
use esgob_core::{ActionResult, SyncEngine, SyncOperation};

const MASTER: &str = "195.177.253.1";

fn summary(results: &[ActionResult]) -> Vec<(String, String)> {
    results
        .iter()
        .map(|r| (r.domain.clone(), r.action.clone().unwrap_or_default()))
        .collect()
}

#[tokio::test]
async fn in_sync_state_issues_no_mutations() {
    let api = RecordingSlaveApi::new(&[("a.com", MASTER), ("b.com", MASTER)]);
    let engine = SyncEngine::new(&api);

    let results = engine.sync(&["a.com", "b.com"], MASTER).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(api.calls(), vec![Call::List]);
}

#[tokio::test]
async fn adds_only_in_input_order() {
    let api = RecordingSlaveApi::new(&[]);
    let engine = SyncEngine::new(&api);

    let results = engine.sync(&["a.com", "b.com"], MASTER).await.unwrap();

    assert_eq!(api.mutations(), vec![add("a.com", MASTER), add("b.com", MASTER)]);
    assert_eq!(
        summary(&results),
        vec![
            ("a.com".to_string(), "domain added".to_string()),
            ("b.com".to_string(), "domain added".to_string()),
        ]
    );
}

#[tokio::test]
async fn add_and_delete() {
    let api = RecordingSlaveApi::new(&[("a.com", MASTER)]);
    let engine = SyncEngine::new(&api);

    let results = engine.sync(&["b.com"], MASTER).await.unwrap();

    assert_eq!(api.mutations(), vec![add("b.com", MASTER), delete("a.com")]);
    assert_eq!(
        summary(&results),
        vec![
            ("b.com".to_string(), "domain added".to_string()),
            ("a.com".to_string(), "domain deleted".to_string()),
        ]
    );
}

#[tokio::test]
async fn add_delete_and_change_masterip() {
    let api = RecordingSlaveApi::new(&[("a.com", MASTER), ("c.com", "127.0.0.1")]);
    let engine = SyncEngine::new(&api);

    let results = engine.sync(&["b.com", "c.com"], MASTER).await.unwrap();

    assert_eq!(
        api.mutations(),
        vec![add("b.com", MASTER), delete("a.com"), update("c.com", MASTER)]
    );
    assert_eq!(
        summary(&results),
        vec![
            ("b.com".to_string(), "domain added".to_string()),
            ("a.com".to_string(), "domain deleted".to_string()),
            ("c.com".to_string(), "domain master IP updated".to_string()),
        ]
    );
}

#[tokio::test]
async fn results_without_domain_take_the_planned_one() {
    let api = RecordingSlaveApi::new(&[("a.com", MASTER), ("c.com", "127.0.0.1")])
        .omitting_domain();
    let engine = SyncEngine::new(&api);

    let mut reported = Vec::new();
    let plan = engine.plan(&["b.com", "c.com"], MASTER).await.unwrap();
    let results = engine
        .apply_with(&plan, |result| reported.push(result.domain.clone()))
        .await
        .unwrap();

    assert_eq!(
        summary(&results),
        vec![
            ("b.com".to_string(), "domain added".to_string()),
            ("a.com".to_string(), "domain deleted".to_string()),
            ("c.com".to_string(), "domain master IP updated".to_string()),
        ]
    );
    assert_eq!(reported, vec!["b.com", "a.com", "c.com"]);
    for result in &results {
        assert_eq!(
            result.fields.get("domain").and_then(|d| d.as_str()),
            Some(result.domain.as_str())
        );
    }
}

#[tokio::test]
async fn duplicate_desired_domains_are_added_once() {
    let api = RecordingSlaveApi::new(&[]);
    let engine = SyncEngine::new(&api);

    let results = engine
        .sync(&["a.com", "a.com", "b.com"], MASTER)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(api.mutations(), vec![add("a.com", MASTER), add("b.com", MASTER)]);
}

#[tokio::test]
async fn first_failure_aborts_remaining_plan() {
    let api = RecordingSlaveApi::new(&[("a.com", MASTER), ("c.com", "127.0.0.1")])
        .failing_on("a.com");
    let engine = SyncEngine::new(&api);

    let mut reported = Vec::new();
    let plan = engine.plan(&["b.com", "c.com"], MASTER).await.unwrap();
    let err = engine
        .apply_with(&plan, |result| reported.push(result.domain.clone()))
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some("2007"));
    // b.com was added before the failure; c.com was never attempted
    assert_eq!(reported, vec!["b.com".to_string()]);
    assert_eq!(api.mutations(), vec![add("b.com", MASTER), delete("a.com")]);
}

#[tokio::test]
async fn plan_alone_does_not_mutate() {
    let api = RecordingSlaveApi::new(&[("a.com", MASTER), ("c.com", "127.0.0.1")]);
    let engine = SyncEngine::new(&api);

    let plan = engine.plan(&["b.com", "c.com"], MASTER).await.unwrap();

    assert_eq!(plan.len(), 3);
    assert_eq!(plan.count(SyncOperation::Update), 1);
    assert!(api.mutations().is_empty());
}
