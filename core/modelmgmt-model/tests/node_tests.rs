use modelmgmt_model::{ModelClass, ModelDefinition, ModelField, ModelRegion, NodeKind, NodeTable};
use pretty_assertions::assert_eq;
use serde_json::json;

fn ids<T: modelmgmt_model::Identified>(table: &NodeTable<T>) -> Vec<&str> {
    table.ids().collect()
}

// ── NodeTable ────────────────────────────────────────────────────

#[test]
fn table_keeps_insertion_order() {
    let table: NodeTable<ModelClass> = ["c", "a", "b"].into_iter().map(ModelClass::new).collect();
    assert_eq!(ids(&table), vec!["c", "a", "b"]);
    assert_eq!(table.len(), 3);
}

#[test]
fn table_insert_replaces_in_place() {
    let mut table: NodeTable<ModelClass> = ["a", "b", "c"].into_iter().map(ModelClass::new).collect();
    let old = table.insert(ModelClass::new("b").with_label("en", "Bee"));
    assert_eq!(old, Some(ModelClass::new("b")));
    assert_eq!(ids(&table), vec!["a", "b", "c"]);
    assert_eq!(table.get("b").map(|c| c.labels["en"].as_str()), Some("Bee"));
}

#[test]
fn table_remove_reindexes_following_nodes() {
    let mut table: NodeTable<ModelClass> = ["a", "b", "c", "d"].into_iter().map(ModelClass::new).collect();
    assert!(table.remove("b").is_some());
    assert!(table.remove("b").is_none());
    assert_eq!(ids(&table), vec!["a", "c", "d"]);
    assert_eq!(table.get("d").map(|c| c.id.as_str()), Some("d"));
    assert_eq!(table.get("c").map(|c| c.id.as_str()), Some("c"));
    assert!(!table.contains("b"));
}

#[test]
fn table_get_mut_edits_node() {
    let mut table: NodeTable<ModelClass> = std::iter::once(ModelClass::new("a")).collect();
    if let Some(class) = table.get_mut("a") {
        class.parent_id = Some("root".into());
    }
    assert_eq!(table.get("a").and_then(|c| c.parent_id.as_deref()), Some("root"));
    assert!(table.get_mut("missing").is_none());
}

#[test]
fn empty_table() {
    let table: NodeTable<ModelRegion> = NodeTable::new();
    assert!(table.is_empty());
    assert_eq!(table.iter().count(), 0);
}

#[test]
fn table_serializes_as_array() {
    let table: NodeTable<ModelRegion> = ["r1", "r2"].into_iter().map(ModelRegion::new).collect();
    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json[0]["id"], "r1");
    assert_eq!(json[1]["id"], "r2");

    let back: NodeTable<ModelRegion> = serde_json::from_value(json).unwrap();
    assert_eq!(back, table);
}

#[test]
fn table_deserialize_collapses_duplicate_ids() {
    let back: NodeTable<ModelRegion> =
        serde_json::from_value(json!([{"id": "r"}, {"id": "r", "labels": {"en": "R"}}])).unwrap();
    assert_eq!(back.len(), 1);
    assert_eq!(back.get("r").map(|r| r.labels.len()), Some(1));
}

// ── NodeKind ─────────────────────────────────────────────────────

#[test]
fn node_kind_keywords() {
    for kind in [NodeKind::Class, NodeKind::Definition, NodeKind::Field, NodeKind::Region] {
        assert_eq!(NodeKind::parse(kind.as_str()), Some(kind));
        assert_eq!(kind.to_string(), kind.as_str());
    }
    assert_eq!(NodeKind::parse("attribute"), None);
    assert_eq!(serde_json::to_value(NodeKind::Definition).unwrap(), json!("definition"));
}

// ── Serde shape ──────────────────────────────────────────────────

#[test]
fn definition_uses_camel_case_keys() {
    let def = ModelDefinition::new("PR0001")
        .with_parent("base")
        .with_rdf_type("emf:Project")
        .with_abstract(true)
        .with_field(ModelField::new("title").with_region("general"));
    let json = serde_json::to_value(&def).unwrap();

    assert_eq!(json["parentId"], "base");
    assert_eq!(json["rdfType"], "emf:Project");
    assert_eq!(json["isAbstract"], true);
    assert_eq!(json["fields"][0]["regionId"], "general");
}

#[test]
fn definition_deserializes_with_defaults() {
    let def: ModelDefinition = serde_json::from_value(json!({"id": "bare"})).unwrap();
    assert_eq!(def, ModelDefinition::new("bare"));
    assert!(!def.has_rdf_type());
}

#[test]
fn blank_rdf_type_is_not_a_type() {
    assert!(!ModelDefinition::new("d").with_rdf_type("  ").has_rdf_type());
    assert!(ModelDefinition::new("d").with_rdf_type("emf:Case").has_rdf_type());
}

#[test]
fn field_value_defaults_to_null() {
    let field: ModelField = serde_json::from_value(json!({"id": "title"})).unwrap();
    assert!(field.value.is_null());
    assert_eq!(field.region_id, None);
}
