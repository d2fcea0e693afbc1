use crate::table::{Identified, NodeTable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Language code → display string.
pub type Labels = BTreeMap<String, String>;

/// Attribute name → value, constrained by the meta-info of the node's kind.
pub type Attributes = BTreeMap<String, Value>;

/// Language assumed when a label is given as a plain string.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Attribute names that map onto typed node members instead of the
/// generic `attributes` map.
pub mod attr {
    pub const LABEL: &str = "label";
    pub const PARENT: &str = "parent";
    pub const RDF_TYPE: &str = "rdfType";
    pub const ABSTRACT: &str = "abstract";
    pub const REGION_ID: &str = "regionId";
    pub const VALUE: &str = "value";
}

/// The kind of a model node. Also the segment keyword in selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Class,
    Definition,
    Field,
    Region,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Definition => "definition",
            Self::Field => "field",
            Self::Region => "region",
        }
    }

    /// Parses a selector keyword.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "class" => Some(Self::Class),
            "definition" => Some(Self::Definition),
            "field" => Some(Self::Field),
            "region" => Some(Self::Region),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A semantic class. Classes form a single-parent tree through `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelClass {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub attributes: Attributes,
}

impl ModelClass {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            labels: Labels::new(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_label(mut self, lang: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(lang.into(), label.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

impl Identified for ModelClass {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A structural definition. Owns its fields and regions.
///
/// `rdf_type` links the definition to the semantic class it describes;
/// definitions without one never appear in the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDefinition {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub rdf_type: Option<String>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub fields: NodeTable<ModelField>,
    #[serde(default)]
    pub regions: NodeTable<ModelRegion>,
}

impl ModelDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            labels: Labels::new(),
            attributes: Attributes::new(),
            rdf_type: None,
            is_abstract: false,
            fields: NodeTable::new(),
            regions: NodeTable::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_rdf_type(mut self, rdf_type: impl Into<String>) -> Self {
        self.rdf_type = Some(rdf_type.into());
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_label(mut self, lang: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(lang.into(), label.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_field(mut self, field: ModelField) -> Self {
        self.fields.insert(field);
        self
    }

    pub fn with_region(mut self, region: ModelRegion) -> Self {
        self.regions.insert(region);
        self
    }

    /// True when `rdf_type` is present and not blank.
    pub fn has_rdf_type(&self) -> bool {
        self.rdf_type.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

impl Identified for ModelDefinition {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A field of a definition. Field ids are unique within their definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelField {
    pub id: String,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub attributes: Attributes,
    /// Grouping key naming a region of the owning definition (or an ancestor).
    #[serde(default)]
    pub region_id: Option<String>,
    /// Default value of the field.
    #[serde(default)]
    pub value: Value,
}

impl ModelField {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            labels: Labels::new(),
            attributes: Attributes::new(),
            region_id: None,
            value: Value::Null,
        }
    }

    pub fn with_label(mut self, lang: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(lang.into(), label.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_region(mut self, region_id: impl Into<String>) -> Self {
        self.region_id = Some(region_id.into());
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }
}

impl Identified for ModelField {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A named group of fields inside a definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRegion {
    pub id: String,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub attributes: Attributes,
}

impl ModelRegion {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            labels: Labels::new(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_label(mut self, lang: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(lang.into(), label.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

impl Identified for ModelRegion {
    fn id(&self) -> &str {
        &self.id
    }
}
