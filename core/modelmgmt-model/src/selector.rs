//! Selector parsing and resolution.
//!
//! A selector is a `/`-separated list of `kind=id` segments, optionally
//! ending in an attribute name:
//!
//! ```text
//! class=emf%3ACase
//! definition=PR0001/field=title
//! definition=PR0001/field=title/regionId
//! definition=PR0001/region=systemRelations/attribute=order
//! ```
//!
//! Ids are percent-decoded, so class IRIs containing `/` or `=` must be
//! encoded. Resolution is a pure read over the store.

use crate::error::{ModelError, ModelResult};
use crate::models::Models;
use crate::node::NodeKind;
use std::fmt;
use std::str::FromStr;

/// One `kind=id` step of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: NodeKind,
    pub id: String,
}

/// A parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    raw: String,
    segments: Vec<Segment>,
    attribute: Option<String>,
}

/// A resolved node. Holds ids only; look the node up through [`Models`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Class(String),
    Definition(String),
    Field { definition: String, field: String },
    Region { definition: String, region: String },
}

/// The outcome of resolving a selector: a node plus the attribute named by
/// the selector, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub node: NodeRef,
    pub attribute: Option<String>,
}

impl Selector {
    /// Parses a selector string.
    pub fn parse(raw: &str) -> ModelResult<Self> {
        let malformed = |reason: &str| ModelError::MalformedSelector {
            selector: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.trim().is_empty() {
            return Err(malformed("selector is empty"));
        }

        let parts: Vec<&str> = raw.split('/').collect();
        let mut segments: Vec<Segment> = Vec::with_capacity(parts.len());
        let mut attribute = None;

        for (i, part) in parts.iter().enumerate() {
            let is_last = i + 1 == parts.len();
            if part.is_empty() {
                return Err(malformed("empty segment"));
            }

            let (key, value) = match part.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (*part, None),
            };

            match (NodeKind::parse(key), value) {
                (Some(kind), Some(id)) => {
                    if id.is_empty() {
                        return Err(malformed(&format!("segment '{key}' has no id")));
                    }
                    let allowed = match segments.last().map(|s| s.kind) {
                        None => matches!(kind, NodeKind::Class | NodeKind::Definition),
                        Some(NodeKind::Definition) => {
                            matches!(kind, NodeKind::Field | NodeKind::Region)
                        }
                        Some(_) => false,
                    };
                    if !allowed {
                        return Err(malformed(&format!("unexpected '{key}' segment")));
                    }
                    let id = percent_decode(id).ok_or_else(|| malformed("invalid escape"))?;
                    segments.push(Segment { kind, id });
                }
                (None, Some(name)) if key == "attribute" && is_last => {
                    attribute = Some(percent_decode(name).ok_or_else(|| malformed("invalid escape"))?);
                }
                (None, None) if is_last => {
                    attribute = Some(percent_decode(key).ok_or_else(|| malformed("invalid escape"))?);
                }
                _ => return Err(malformed(&format!("unknown segment '{part}'"))),
            }
        }

        if segments.is_empty() {
            return Err(malformed("no node segment"));
        }
        if attribute.as_deref().is_some_and(str::is_empty) {
            return Err(malformed("empty attribute name"));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
            attribute,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Resolves the selector against the store.
    ///
    /// Every segment must exist as a member of the node resolved before it.
    pub fn resolve(&self, models: &Models) -> ModelResult<ResolvedTarget> {
        let not_found = || ModelError::NotFound {
            selector: self.raw.clone(),
        };

        let mut node: Option<NodeRef> = None;
        for segment in &self.segments {
            let id = segment.id.as_str();
            node = Some(match (node, segment.kind) {
                (None, NodeKind::Class) => {
                    models.class(id).ok_or_else(not_found)?;
                    NodeRef::Class(segment.id.clone())
                }
                (None, NodeKind::Definition) => {
                    models.definition(id).ok_or_else(not_found)?;
                    NodeRef::Definition(segment.id.clone())
                }
                (Some(NodeRef::Definition(def)), NodeKind::Field) => {
                    models.field(&def, id).ok_or_else(not_found)?;
                    NodeRef::Field {
                        definition: def,
                        field: segment.id.clone(),
                    }
                }
                (Some(NodeRef::Definition(def)), NodeKind::Region) => {
                    models.region(&def, id).ok_or_else(not_found)?;
                    NodeRef::Region {
                        definition: def,
                        region: segment.id.clone(),
                    }
                }
                // Parsing already rejects every other shape.
                _ => return Err(not_found()),
            });
        }

        Ok(ResolvedTarget {
            node: node.ok_or_else(not_found)?,
            attribute: self.attribute.clone(),
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Selector {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parses and resolves a selector in one step.
pub fn resolve(models: &Models, selector: &str) -> ModelResult<ResolvedTarget> {
    Selector::parse(selector)?.resolve(models)
}

impl NodeRef {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Class(_) => NodeKind::Class,
            Self::Definition(_) => NodeKind::Definition,
            Self::Field { .. } => NodeKind::Field,
            Self::Region { .. } => NodeKind::Region,
        }
    }

    /// Id of the referenced node itself.
    pub fn id(&self) -> &str {
        match self {
            Self::Class(id) | Self::Definition(id) => id,
            Self::Field { field, .. } => field,
            Self::Region { region, .. } => region,
        }
    }

    /// Id of the top-level class or definition containing the node.
    pub fn root_id(&self) -> &str {
        match self {
            Self::Class(id) | Self::Definition(id) => id,
            Self::Field { definition, .. } | Self::Region { definition, .. } => definition,
        }
    }

    /// Kind of the top-level node containing this one.
    pub fn root_kind(&self) -> NodeKind {
        match self {
            Self::Class(_) => NodeKind::Class,
            _ => NodeKind::Definition,
        }
    }

    /// Canonical selector for this node, optionally naming an attribute.
    pub fn to_selector(&self, attribute: Option<&str>) -> String {
        let mut out = match self {
            Self::Class(id) => format!("class={}", percent_encode(id)),
            Self::Definition(id) => format!("definition={}", percent_encode(id)),
            Self::Field { definition, field } => format!(
                "definition={}/field={}",
                percent_encode(definition),
                percent_encode(field)
            ),
            Self::Region { definition, region } => format!(
                "definition={}/region={}",
                percent_encode(definition),
                percent_encode(region)
            ),
        };
        if let Some(attribute) = attribute {
            out.push_str("/attribute=");
            out.push_str(&percent_encode(attribute));
        }
        out
    }
}

/// Decodes `%XX` escapes. Returns `None` on a truncated or non-hex escape,
/// or on invalid UTF-8.
fn percent_decode(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = raw.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Escapes the characters that carry meaning in selectors.
fn percent_encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '=' => out.push_str("%3D"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_round_trip_for_iris() {
        let iri = "http://example.com/ontology#Case=1%";
        assert_eq!(percent_decode(&percent_encode(iri)).as_deref(), Some(iri));
    }

    #[test]
    fn truncated_escape_is_rejected() {
        assert_eq!(percent_decode("abc%2"), None);
        assert_eq!(percent_decode("abc%zz"), None);
    }

    #[test]
    fn sign_in_escape_is_rejected() {
        assert_eq!(percent_decode("%+f"), None);
        assert_eq!(percent_decode("%-1"), None);
        assert_eq!(percent_decode("%2f").as_deref(), Some("/"));
    }
}
