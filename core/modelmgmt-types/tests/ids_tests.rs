use modelmgmt_types::{ChangeSetId, DeploymentId};
use std::collections::HashSet;
use std::str::FromStr;

// ── ChangeSetId ───────────────────────────────────────────────────

#[test]
fn change_set_id_default_is_first() {
    assert_eq!(ChangeSetId::default(), ChangeSetId::FIRST);
    assert_eq!(ChangeSetId::FIRST.as_u64(), 1);
}

#[test]
fn change_set_id_next_is_monotonic() {
    let id = ChangeSetId::new(41);
    assert_eq!(id.next().as_u64(), 42);
    assert!(id.next() > id);
}

#[test]
fn change_set_id_display_and_parse() {
    let id = ChangeSetId::new(1234);
    assert_eq!(id.to_string(), "1234");
    assert_eq!(ChangeSetId::parse("1234").unwrap(), id);
    assert_eq!(ChangeSetId::from_str(" 1234 ").unwrap(), id);
}

#[test]
fn change_set_id_parse_invalid() {
    let err = ChangeSetId::parse("PR0001").unwrap_err();
    assert!(format!("{err}").contains("invalid change-set id"));
    assert!(ChangeSetId::parse("-1").is_err());
}

#[test]
fn change_set_id_serializes_as_number() {
    let json = serde_json::to_string(&ChangeSetId::new(7)).unwrap();
    assert_eq!(json, "7");
    let back: ChangeSetId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ChangeSetId::new(7));
}

// ── DeploymentId ──────────────────────────────────────────────────

#[test]
fn deployment_id_new_is_unique() {
    let a = DeploymentId::new();
    let b = DeploymentId::new();
    assert_ne!(a, b);
}

#[test]
fn deployment_id_display_and_parse() {
    let id = DeploymentId::new();
    let parsed = DeploymentId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn deployment_id_parse_invalid() {
    assert!(DeploymentId::parse("not-a-uuid").is_err());
    assert!(DeploymentId::from_str("garbage").is_err());
}

#[test]
fn deployment_id_hash_and_eq() {
    let id = DeploymentId::new();
    let mut set = HashSet::new();
    set.insert(id);
    set.insert(id);
    assert_eq!(set.len(), 1);
}
