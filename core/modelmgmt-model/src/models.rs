//! The model store.
//!
//! Holds the current snapshot of classes and definitions together with the
//! meta-info catalog and the version counter. All attribute reads and writes
//! go through [`Models::read_attribute`] / [`Models::write_attribute`], which
//! map well-known attribute names onto typed node members and keep the
//! parent-link invariant intact.

use crate::change_set::AppliedChange;
use crate::error::{ModelError, ModelResult};
use crate::hierarchy::{build_hierarchy, ModelHierarchyClass};
use crate::meta_info::ModelsMetaInfo;
use crate::node::{
    attr, Attributes, Labels, ModelClass, ModelDefinition, ModelField, ModelRegion, NodeKind,
    DEFAULT_LANGUAGE,
};
use crate::response::ModelResponse;
use crate::selector::{resolve, NodeRef};
use crate::table::NodeTable;
use modelmgmt_types::is_empty_value;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Models {
    classes: NodeTable<ModelClass>,
    definitions: NodeTable<ModelDefinition>,
    meta_info: ModelsMetaInfo,
    version: u64,
}

impl Models {
    /// Creates an empty store at version 0.
    pub fn new(meta_info: ModelsMetaInfo) -> Self {
        Self {
            classes: NodeTable::new(),
            definitions: NodeTable::new(),
            meta_info,
            version: 0,
        }
    }

    /// Builds a store from provider data and checks every parent link.
    pub fn from_nodes(
        classes: Vec<ModelClass>,
        definitions: Vec<ModelDefinition>,
        meta_info: ModelsMetaInfo,
    ) -> ModelResult<Self> {
        let models = Self {
            classes: classes.into_iter().collect(),
            definitions: definitions.into_iter().collect(),
            meta_info,
            version: 0,
        };
        models.validate_references()?;
        Ok(models)
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Advances the version by one and returns the new value.
    pub fn increment_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    /// Restores a persisted version. Never moves the counter backwards.
    pub fn restore_version(&mut self, version: u64) {
        self.version = self.version.max(version);
    }

    pub fn classes(&self) -> &NodeTable<ModelClass> {
        &self.classes
    }

    pub fn definitions(&self) -> &NodeTable<ModelDefinition> {
        &self.definitions
    }

    pub fn meta_info(&self) -> &ModelsMetaInfo {
        &self.meta_info
    }

    pub fn class(&self, id: &str) -> Option<&ModelClass> {
        self.classes.get(id)
    }

    pub fn definition(&self, id: &str) -> Option<&ModelDefinition> {
        self.definitions.get(id)
    }

    pub fn field(&self, definition_id: &str, field_id: &str) -> Option<&ModelField> {
        self.definitions.get(definition_id)?.fields.get(field_id)
    }

    pub fn region(&self, definition_id: &str, region_id: &str) -> Option<&ModelRegion> {
        self.definitions.get(definition_id)?.regions.get(region_id)
    }

    /// Whether a resolved node still exists.
    pub fn contains(&self, node: &NodeRef) -> bool {
        match node {
            NodeRef::Class(id) => self.classes.contains(id),
            NodeRef::Definition(id) => self.definitions.contains(id),
            NodeRef::Field { definition, field } => self.field(definition, field).is_some(),
            NodeRef::Region { definition, region } => self.region(definition, region).is_some(),
        }
    }

    // ── Structure ────────────────────────────────────────────────

    /// Inserts or replaces a class. The parent must already exist.
    pub fn insert_class(&mut self, class: ModelClass) -> ModelResult<()> {
        if let Some(parent) = &class.parent_id {
            self.check_class_parent(&class.id, parent)?;
        }
        self.classes.insert(class);
        Ok(())
    }

    /// Inserts or replaces a definition. The parent must already exist.
    pub fn insert_definition(&mut self, definition: ModelDefinition) -> ModelResult<()> {
        if let Some(parent) = &definition.parent_id {
            self.check_definition_parent(&definition.id, parent)?;
        }
        self.definitions.insert(definition);
        Ok(())
    }

    /// Checks that every parent link resolves and that no inheritance
    /// chain loops back on itself.
    pub fn validate_references(&self) -> ModelResult<()> {
        for class in &self.classes {
            if let Some(parent) = &class.parent_id {
                self.check_class_parent(&class.id, parent)?;
            }
        }
        for definition in &self.definitions {
            if let Some(parent) = &definition.parent_id {
                self.check_definition_parent(&definition.id, parent)?;
            }
        }
        Ok(())
    }

    fn check_class_parent(&self, id: &str, parent: &str) -> ModelResult<()> {
        if !self.classes.contains(parent) {
            return Err(ModelError::DanglingReference {
                kind: NodeKind::Class,
                id: id.to_string(),
                parent: parent.to_string(),
            });
        }
        if self.class_lineage(parent).iter().any(|c| c.id == id) {
            return Err(ModelError::Cycle {
                kind: NodeKind::Class,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn check_definition_parent(&self, id: &str, parent: &str) -> ModelResult<()> {
        if !self.definitions.contains(parent) {
            return Err(ModelError::DanglingReference {
                kind: NodeKind::Definition,
                id: id.to_string(),
                parent: parent.to_string(),
            });
        }
        if self.definition_lineage(parent).iter().any(|d| d.id == id) {
            return Err(ModelError::Cycle {
                kind: NodeKind::Definition,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// The class and its ancestors, child first.
    pub fn class_lineage(&self, id: &str) -> Vec<&ModelClass> {
        let mut lineage = Vec::new();
        let mut seen = HashSet::new();
        let mut next = self.classes.get(id);
        while let Some(class) = next {
            if !seen.insert(class.id.as_str()) {
                break;
            }
            lineage.push(class);
            next = class.parent_id.as_deref().and_then(|p| self.classes.get(p));
        }
        lineage
    }

    /// The definition and its ancestors, child first.
    pub fn definition_lineage(&self, id: &str) -> Vec<&ModelDefinition> {
        let mut lineage = Vec::new();
        let mut seen = HashSet::new();
        let mut next = self.definitions.get(id);
        while let Some(definition) = next {
            if !seen.insert(definition.id.as_str()) {
                break;
            }
            lineage.push(definition);
            next = definition
                .parent_id
                .as_deref()
                .and_then(|p| self.definitions.get(p));
        }
        lineage
    }

    /// Finds a region declared by the definition or any of its ancestors.
    pub fn find_region(&self, definition_id: &str, region_id: &str) -> Option<&ModelRegion> {
        self.definition_lineage(definition_id)
            .into_iter()
            .find_map(|d| d.regions.get(region_id))
    }

    // ── Attributes ───────────────────────────────────────────────

    /// Reads an attribute. Absent attributes read as `Value::Null`.
    pub fn read_attribute(&self, node: &NodeRef, attribute: &str) -> ModelResult<Value> {
        let missing = || ModelError::NotFound {
            selector: node.to_selector(None),
        };
        let unsupported = || ModelError::UnsupportedAttribute {
            kind: node.kind(),
            attribute: attribute.to_string(),
        };

        let value = match node {
            NodeRef::Class(id) => {
                let class = self.classes.get(id).ok_or_else(missing)?;
                match attribute {
                    attr::LABEL => labels_value(&class.labels),
                    attr::PARENT => optional_string(&class.parent_id),
                    attr::RDF_TYPE | attr::ABSTRACT | attr::REGION_ID | attr::VALUE => {
                        return Err(unsupported());
                    }
                    _ => generic(&class.attributes, attribute),
                }
            }
            NodeRef::Definition(id) => {
                let definition = self.definitions.get(id).ok_or_else(missing)?;
                match attribute {
                    attr::LABEL => labels_value(&definition.labels),
                    attr::PARENT => optional_string(&definition.parent_id),
                    attr::RDF_TYPE => optional_string(&definition.rdf_type),
                    attr::ABSTRACT => Value::Bool(definition.is_abstract),
                    attr::REGION_ID | attr::VALUE => return Err(unsupported()),
                    _ => generic(&definition.attributes, attribute),
                }
            }
            NodeRef::Field { definition, field } => {
                let field = self.field(definition, field).ok_or_else(missing)?;
                match attribute {
                    attr::LABEL => labels_value(&field.labels),
                    attr::REGION_ID => optional_string(&field.region_id),
                    attr::VALUE => field.value.clone(),
                    attr::PARENT | attr::RDF_TYPE | attr::ABSTRACT => return Err(unsupported()),
                    _ => generic(&field.attributes, attribute),
                }
            }
            NodeRef::Region { definition, region } => {
                let region = self.region(definition, region).ok_or_else(missing)?;
                match attribute {
                    attr::LABEL => labels_value(&region.labels),
                    attr::PARENT | attr::RDF_TYPE | attr::ABSTRACT | attr::REGION_ID | attr::VALUE => {
                        return Err(unsupported());
                    }
                    _ => generic(&region.attributes, attribute),
                }
            }
        };
        Ok(value)
    }

    /// Writes an attribute and returns the previous value.
    ///
    /// An empty value clears the attribute: generic attributes are removed,
    /// optional members become `None`, `abstract` resets to `false`.
    pub fn write_attribute(
        &mut self,
        node: &NodeRef,
        attribute: &str,
        value: Value,
    ) -> ModelResult<Value> {
        let previous = self.read_attribute(node, attribute)?;

        if attribute == attr::PARENT {
            let parent = string_or_none(attribute, &value)?;
            if let Some(parent) = &parent {
                match node {
                    NodeRef::Class(id) => self.check_class_parent(id, parent)?,
                    NodeRef::Definition(id) => self.check_definition_parent(id, parent)?,
                    _ => {}
                }
            }
            match node {
                NodeRef::Class(id) => {
                    if let Some(class) = self.classes.get_mut(id) {
                        class.parent_id = parent;
                    }
                }
                NodeRef::Definition(id) => {
                    if let Some(definition) = self.definitions.get_mut(id) {
                        definition.parent_id = parent;
                    }
                }
                _ => {}
            }
            return Ok(previous);
        }

        match node {
            NodeRef::Class(id) => {
                if let Some(class) = self.classes.get_mut(id) {
                    write_common(&mut class.labels, &mut class.attributes, attribute, value)?;
                }
            }
            NodeRef::Definition(id) => {
                if let Some(definition) = self.definitions.get_mut(id) {
                    match attribute {
                        attr::RDF_TYPE => definition.rdf_type = string_or_none(attribute, &value)?,
                        attr::ABSTRACT => {
                            definition.is_abstract = match value {
                                Value::Bool(b) => b,
                                ref v if is_empty_value(v) => false,
                                _ => {
                                    return Err(ModelError::InvalidValue {
                                        attribute: attribute.to_string(),
                                        reason: "expected a boolean".to_string(),
                                    });
                                }
                            }
                        }
                        _ => write_common(
                            &mut definition.labels,
                            &mut definition.attributes,
                            attribute,
                            value,
                        )?,
                    }
                }
            }
            NodeRef::Field { definition, field } => {
                let field = self
                    .definitions
                    .get_mut(definition)
                    .and_then(|d| d.fields.get_mut(field));
                if let Some(field) = field {
                    match attribute {
                        attr::REGION_ID => field.region_id = string_or_none(attribute, &value)?,
                        attr::VALUE => {
                            field.value = if is_empty_value(&value) { Value::Null } else { value }
                        }
                        _ => write_common(&mut field.labels, &mut field.attributes, attribute, value)?,
                    }
                }
            }
            NodeRef::Region { definition, region } => {
                let region = self
                    .definitions
                    .get_mut(definition)
                    .and_then(|d| d.regions.get_mut(region));
                if let Some(region) = region {
                    write_common(&mut region.labels, &mut region.attributes, attribute, value)?;
                }
            }
        }
        Ok(previous)
    }

    /// Re-applies a recorded change (used when replaying the change log).
    pub fn apply_recorded(&mut self, change: &AppliedChange) -> ModelResult<()> {
        let target = resolve(self, &change.selector)?;
        let value = match &change.language {
            Some(language) => {
                let mut labels = match self.read_attribute(&target.node, attr::LABEL)? {
                    Value::Object(map) => map,
                    _ => serde_json::Map::new(),
                };
                if is_empty_value(&change.new_value) {
                    labels.remove(language);
                } else {
                    labels.insert(language.clone(), change.new_value.clone());
                }
                Value::Object(labels)
            }
            None => change.new_value.clone(),
        };
        self.write_attribute(&target.node, &change.attribute, value)?;
        Ok(())
    }

    // ── Derived views ────────────────────────────────────────────

    /// Builds the class → definition hierarchy of the current snapshot.
    pub fn hierarchy(&self) -> Vec<ModelHierarchyClass> {
        build_hierarchy(&self.classes, &self.definitions)
    }

    /// Selects the model rooted at `id`.
    ///
    /// For a definition: the definition lineage plus the lineage of the
    /// class named by its `rdfType`. For a class: the class lineage.
    /// Unknown ids yield an empty response.
    pub fn select(&self, id: &str) -> ModelResponse {
        if self.definitions.contains(id) {
            let definitions: Vec<ModelDefinition> =
                self.definition_lineage(id).into_iter().cloned().collect();
            let classes = definitions
                .first()
                .and_then(|d| d.rdf_type.as_deref())
                .map(|rdf_type| self.class_lineage(rdf_type).into_iter().cloned().collect())
                .unwrap_or_default();
            return ModelResponse {
                classes,
                definitions,
            };
        }
        ModelResponse {
            classes: self.class_lineage(id).into_iter().cloned().collect(),
            definitions: Vec::new(),
        }
    }
}

fn generic(attributes: &Attributes, name: &str) -> Value {
    attributes.get(name).cloned().unwrap_or(Value::Null)
}

fn optional_string(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

fn labels_value(labels: &Labels) -> Value {
    if labels.is_empty() {
        return Value::Null;
    }
    Value::Object(
        labels
            .iter()
            .map(|(lang, text)| (lang.clone(), Value::String(text.clone())))
            .collect(),
    )
}

fn string_or_none(attribute: &str, value: &Value) -> ModelResult<Option<String>> {
    match value {
        v if is_empty_value(v) => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(ModelError::InvalidValue {
            attribute: attribute.to_string(),
            reason: "expected a string".to_string(),
        }),
    }
}

fn write_common(
    labels: &mut Labels,
    attributes: &mut Attributes,
    attribute: &str,
    value: Value,
) -> ModelResult<()> {
    if attribute == attr::LABEL {
        *labels = parse_labels(&value)?;
        return Ok(());
    }
    if is_empty_value(&value) {
        attributes.remove(attribute);
    } else {
        attributes.insert(attribute.to_string(), value);
    }
    Ok(())
}

fn parse_labels(value: &Value) -> ModelResult<Labels> {
    match value {
        v if is_empty_value(v) => Ok(Labels::new()),
        Value::String(text) => Ok(Labels::from([(DEFAULT_LANGUAGE.to_string(), text.clone())])),
        Value::Object(map) => map
            .iter()
            .map(|(lang, text)| match text {
                Value::String(text) => Ok((lang.clone(), text.clone())),
                _ => Err(ModelError::InvalidValue {
                    attribute: attr::LABEL.to_string(),
                    reason: format!("label for '{lang}' is not a string"),
                }),
            })
            .collect(),
        _ => Err(ModelError::InvalidValue {
            attribute: attr::LABEL.to_string(),
            reason: "expected a string or a language map".to_string(),
        }),
    }
}
