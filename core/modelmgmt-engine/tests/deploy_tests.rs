mod common;

use chrono::Utc;
use common::{change, request, store_at, DESCRIPTION, TITLE};
use modelmgmt_engine::{ChangeSetHistory, DeploymentSelector, EngineError, UpdateEngine};
use modelmgmt_model::{ModelChangeSet, ModelDeploymentRequest, Models, NodeKind, NodeRef};
use modelmgmt_types::ChangeSetId;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// Commits three single-change batches and returns the untouched base,
/// the draft store and the resulting history.
fn committed() -> (Models, Models, ChangeSetHistory) {
    let base = store_at(0);
    let engine = UpdateEngine::default();
    let mut draft = base.clone();
    let mut history = ChangeSetHistory::new();

    let batches: Vec<ModelChangeSet> = vec![
        change(TITLE, "assignToRegion", json!("previousRegion"), json!("newRegion")),
        change("class=emf:Case/searchable", "modifyAttribute", Value::Null, json!(false)),
        change(DESCRIPTION, "setDefaultValue", Value::Null, json!("tbd")),
    ];
    for change_set in batches {
        let version = draft.version();
        let committed = engine
            .update(&draft, &request(version, vec![change_set]))
            .unwrap()
            .unwrap();
        history.record(committed.models.version(), committed.changes, Utc::now());
        draft = committed.models;
    }
    (base, draft, history)
}

fn ids(raw: &[u64]) -> Vec<ChangeSetId> {
    raw.iter().copied().map(ChangeSetId::new).collect()
}

// ── Request checks ───────────────────────────────────────────────

#[test]
fn empty_deployment_is_rejected() {
    let (_, _, history) = committed();
    let err = DeploymentSelector::select(&history, 0, &ModelDeploymentRequest::new(0)).unwrap_err();
    assert!(matches!(err, EngineError::EmptyDeployment));
    assert!(err.is_validation());
}

#[test]
fn stale_deployment_is_rejected() {
    let (_, _, history) = committed();
    let request = ModelDeploymentRequest::new(3).with_model("1");
    let err = DeploymentSelector::select(&history, 0, &request).unwrap_err();
    assert!(matches!(
        err,
        EngineError::StaleDeployment {
            expected: 3,
            actual: 0
        }
    ));
}

#[test]
fn unknown_and_malformed_ids_are_reported_together() {
    let (_, _, history) = committed();
    let request = ModelDeploymentRequest::new(0)
        .with_model("9")
        .with_model("abc")
        .with_model("2");

    let EngineError::Validation(errors) =
        DeploymentSelector::select(&history, 0, &request).unwrap_err()
    else {
        panic!("expected validation error");
    };
    let selectors: Vec<&str> = errors.iter().map(|e| e.selector.as_str()).collect();
    assert_eq!(selectors, vec!["9", "abc"]);
    assert_eq!(errors[0].message, "unknown change-set");
}

#[test]
fn deployed_ids_cannot_be_deployed_again() {
    let (_, _, mut history) = committed();
    history.mark_deployed(&ids(&[1]));

    let request = ModelDeploymentRequest::new(1).with_model("1");
    let EngineError::Validation(errors) =
        DeploymentSelector::select(&history, 1, &request).unwrap_err()
    else {
        panic!("expected validation error");
    };
    assert_eq!(errors[0].message, "change-set is already deployed");
}

#[test]
fn selection_is_sorted_and_deduplicated() {
    let (_, _, history) = committed();
    let request = ModelDeploymentRequest::new(0)
        .with_model("3")
        .with_model("1")
        .with_model("3");
    let selected = DeploymentSelector::select(&history, 0, &request).unwrap();
    assert_eq!(selected, ids(&[1, 3]));
}

// ── Materialization ──────────────────────────────────────────────

#[test]
fn materialize_applies_only_selected_change_sets() {
    let (base, draft, history) = committed();
    let deployed = DeploymentSelector::materialize(&base, &history, &ids(&[1, 3])).unwrap();

    assert_eq!(deployed.version(), 1);
    assert_eq!(
        deployed.field("PR0001", "title").unwrap().region_id.as_deref(),
        Some("newRegion")
    );
    assert_eq!(deployed.field("PR0001", "description").unwrap().value, json!("tbd"));

    let case = NodeRef::Class("emf:Case".into());
    assert_eq!(deployed.read_attribute(&case, "searchable").unwrap(), Value::Null);
    assert_eq!(draft.read_attribute(&case, "searchable").unwrap(), json!(false));
    assert_eq!(base.version(), 0);
}

#[test]
fn materialize_publishes_only_the_selected_translation() {
    let base = store_at(0);
    let engine = UpdateEngine::default();
    let mut draft = base.clone();
    let mut history = ChangeSetHistory::new();
    let renames = [
        change(&format!("{TITLE}/bg"), "rename", Value::Null, json!("Zaglavie")),
        change(&format!("{TITLE}/en"), "rename", json!("Title"), json!("Heading")),
    ];
    for change_set in renames {
        let committed = engine
            .update(&draft, &request(draft.version(), vec![change_set]))
            .unwrap()
            .unwrap();
        history.record(committed.models.version(), committed.changes, Utc::now());
        draft = committed.models;
    }

    let deployed = DeploymentSelector::materialize(&base, &history, &ids(&[2])).unwrap();

    let title = NodeRef::Field {
        definition: "PR0001".into(),
        field: "title".into(),
    };
    assert_eq!(deployed.read_attribute(&title, "label").unwrap(), json!({"en": "Heading"}));
    assert_eq!(
        draft.read_attribute(&title, "label").unwrap(),
        json!({"bg": "Zaglavie", "en": "Heading"})
    );

    let both = DeploymentSelector::materialize(&deployed, &history, &ids(&[1])).unwrap();
    assert_eq!(
        both.read_attribute(&title, "label").unwrap(),
        draft.read_attribute(&title, "label").unwrap()
    );
}

#[test]
fn materialize_unknown_id_fails() {
    let (base, _, history) = committed();
    let err = DeploymentSelector::materialize(&base, &history, &ids(&[42])).unwrap_err();
    assert!(err.is_validation());
}

// ── Candidates ───────────────────────────────────────────────────

#[test]
fn candidates_group_pending_by_root_node() {
    let (_, _, history) = committed();
    let candidates = DeploymentSelector::candidates(&history);

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].id, "PR0001");
    assert_eq!(candidates[0].kind, NodeKind::Definition);
    assert_eq!(candidates[0].change_sets, ids(&[1, 3]));
    assert_eq!(candidates[1].id, "emf:Case");
    assert_eq!(candidates[1].kind, NodeKind::Class);
    assert_eq!(candidates[1].change_sets, ids(&[2]));
}

#[test]
fn candidates_exclude_deployed() {
    let (_, _, mut history) = committed();
    history.mark_deployed(&ids(&[1, 3]));

    let candidates = DeploymentSelector::candidates(&history);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, "emf:Case");

    let json = serde_json::to_value(&candidates[0]).unwrap();
    assert_eq!(json["changeSets"], json!([2]));
}
