use crate::node::{Labels, NodeKind};
use modelmgmt_types::value_kind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Allowed values of `displayType` attributes.
pub const DISPLAY_TYPES: &[&str] = &["EDITABLE", "READ_ONLY", "HIDDEN", "SYSTEM"];

/// Declared type of an attribute value.
///
/// `Label` and `MultiLangString` accept either a language → text object or a
/// plain string (taken as the default language).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetaValueType {
    String,
    Label,
    MultiLangString,
    Boolean,
    Integer,
    Number,
    Identifier,
    Uri,
    Type,
    CodeList,
    DisplayType,
    Region,
}

impl MetaValueType {
    /// Checks a single non-empty value against this type.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        let ok = match self {
            Self::String | Self::Uri | Self::Type | Self::Region => value.is_string(),
            Self::Identifier => value
                .as_str()
                .is_some_and(|s| !s.chars().any(char::is_whitespace)),
            Self::Label | Self::MultiLangString => match value {
                Value::String(_) => true,
                Value::Object(map) => map.values().all(Value::is_string),
                _ => false,
            },
            Self::Boolean => value.is_boolean(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::CodeList => value.is_string() || value.is_i64() || value.is_u64(),
            Self::DisplayType => value.as_str().is_some_and(|s| DISPLAY_TYPES.contains(&s)),
        };
        if ok {
            Ok(())
        } else {
            Err(format!(
                "expected {:?} value, got {} {}",
                self,
                value_kind(value),
                value
            ))
        }
    }
}

/// How many values an attribute may hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cardinality {
    #[default]
    Single,
    Multiple,
}

/// Describes one attribute of a node kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetaInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(rename = "type")]
    pub value_type: MetaValueType,
    #[serde(default)]
    pub default_value: Value,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Read-only attributes may only be written while they are empty.
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub labels: Labels,
}

impl ModelMetaInfo {
    pub fn new(id: impl Into<String>, value_type: MetaValueType) -> Self {
        Self {
            id: id.into(),
            uri: None,
            value_type,
            default_value: Value::Null,
            mandatory: false,
            cardinality: Cardinality::Single,
            read_only: false,
            labels: Labels::new(),
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.cardinality = Cardinality::Multiple;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = value;
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_label(mut self, lang: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(lang.into(), label.into());
        self
    }

    /// Type-checks a non-empty candidate value, honoring cardinality.
    pub fn check_value(&self, value: &Value) -> Result<(), String> {
        match (self.cardinality, value) {
            (Cardinality::Multiple, Value::Array(items)) => {
                items.iter().try_for_each(|item| self.value_type.check(item))
            }
            (Cardinality::Single, Value::Array(_)) => Err(format!(
                "attribute '{}' holds a single value, got an array",
                self.id
            )),
            _ => self.value_type.check(value),
        }
    }
}

/// Per-kind attribute catalog. Lists keep declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsMetaInfo {
    #[serde(default)]
    pub semantics: Vec<ModelMetaInfo>,
    #[serde(default)]
    pub definitions: Vec<ModelMetaInfo>,
    #[serde(default)]
    pub fields: Vec<ModelMetaInfo>,
    #[serde(default)]
    pub regions: Vec<ModelMetaInfo>,
}

impl ModelsMetaInfo {
    /// The attribute catalog used when no custom meta-info is supplied.
    pub fn standard() -> Self {
        use MetaValueType as T;
        use serde_json::json;

        Self {
            semantics: vec![
                ModelMetaInfo::new("title", T::Label)
                    .mandatory()
                    .with_uri("http://purl.org/dc/terms/title")
                    .with_label("en", "Title"),
                ModelMetaInfo::new("label", T::Label)
                    .mandatory()
                    .with_label("en", "Label"),
                ModelMetaInfo::new("createable", T::Boolean)
                    .with_default(json!(true))
                    .with_label("en", "Createable"),
                ModelMetaInfo::new("uploadable", T::Boolean)
                    .with_default(json!(false))
                    .with_label("en", "Uploadable"),
                ModelMetaInfo::new("searchable", T::Boolean)
                    .with_default(json!(true))
                    .with_label("en", "Searchable"),
                ModelMetaInfo::new("parent", T::Identifier).with_label("en", "Parent"),
            ],
            definitions: vec![
                ModelMetaInfo::new("identifier", T::Identifier)
                    .mandatory()
                    .read_only()
                    .with_label("en", "Identifier"),
                ModelMetaInfo::new("label", T::Label).with_label("en", "Label"),
                ModelMetaInfo::new("abstract", T::Boolean)
                    .with_default(json!(true))
                    .with_label("en", "Abstract"),
                ModelMetaInfo::new("rdfType", T::Uri).with_label("en", "Semantic type"),
                ModelMetaInfo::new("parent", T::Identifier).with_label("en", "Parent"),
            ],
            fields: vec![
                ModelMetaInfo::new("name", T::Identifier)
                    .mandatory()
                    .read_only()
                    .with_label("en", "Name"),
                ModelMetaInfo::new("label", T::Label).with_label("en", "Label"),
                ModelMetaInfo::new("type", T::Type)
                    .mandatory()
                    .read_only()
                    .with_label("en", "Type"),
                ModelMetaInfo::new("uri", T::Uri)
                    .mandatory()
                    .read_only()
                    .with_label("en", "Property"),
                ModelMetaInfo::new("value", T::String).with_label("en", "Default value"),
                ModelMetaInfo::new("order", T::Integer)
                    .with_default(json!(0))
                    .with_label("en", "Order"),
                ModelMetaInfo::new("codeList", T::CodeList)
                    .with_label("en", "Controlled vocabulary"),
                ModelMetaInfo::new("displayType", T::DisplayType)
                    .with_default(json!("HIDDEN"))
                    .with_label("en", "Display type"),
                ModelMetaInfo::new("previewEmpty", T::Boolean)
                    .with_default(json!(false))
                    .with_label("en", "Preview empty"),
                ModelMetaInfo::new("multiValued", T::Boolean)
                    .with_default(json!(false))
                    .with_label("en", "Multi-valued"),
                ModelMetaInfo::new("regionId", T::Region).with_label("en", "Region"),
            ],
            regions: vec![
                ModelMetaInfo::new("identifier", T::Identifier)
                    .mandatory()
                    .read_only()
                    .with_label("en", "Identifier"),
                ModelMetaInfo::new("label", T::Label)
                    .mandatory()
                    .with_label("en", "Label"),
                ModelMetaInfo::new("order", T::Integer)
                    .with_default(json!(0))
                    .with_label("en", "Order"),
                ModelMetaInfo::new("displayType", T::DisplayType)
                    .with_default(json!("EDITABLE"))
                    .with_label("en", "Display type"),
            ],
        }
    }

    /// Catalog entries for one node kind.
    pub fn for_kind(&self, kind: NodeKind) -> &[ModelMetaInfo] {
        match kind {
            NodeKind::Class => &self.semantics,
            NodeKind::Definition => &self.definitions,
            NodeKind::Field => &self.fields,
            NodeKind::Region => &self.regions,
        }
    }

    pub fn find(&self, kind: NodeKind, attribute: &str) -> Option<&ModelMetaInfo> {
        self.for_kind(kind).iter().find(|m| m.id == attribute)
    }
}
