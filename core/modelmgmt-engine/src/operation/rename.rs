use super::{invalid, read, ChangeSetOperation};
use crate::error::ValidationError;
use modelmgmt_model::{
    attr, AppliedChange, ModelChangeSet, ModelError, ModelResult, Models, ResolvedTarget,
    DEFAULT_LANGUAGE,
};
use serde_json::{Map, Value};

/// Changes the label of any node.
///
/// With a language in the selector (`definition=PR0001/bg`) only that
/// translation is replaced; otherwise `newValue` is the whole label, either a
/// language map or a plain string in the default language.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rename;

fn language(target: &ResolvedTarget) -> Option<&str> {
    target.attribute.as_deref().filter(|a| *a != attr::LABEL)
}

/// Two or three ASCII letters, optionally followed by `-` subtags
/// (`en`, `bg`, `pt-BR`).
fn is_language_tag(tag: &str) -> bool {
    let mut parts = tag.split('-');
    let primary = parts.next().unwrap_or_default();
    (2..=3).contains(&primary.len())
        && primary.chars().all(|c| c.is_ascii_alphabetic())
        && parts.all(|p| (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

fn label_map(value: &Value) -> Option<Map<String, Value>> {
    match value {
        Value::String(text) if !text.trim().is_empty() => {
            let mut map = Map::new();
            map.insert(DEFAULT_LANGUAGE.to_string(), value.clone());
            Some(map)
        }
        Value::Object(map)
            if !map.is_empty()
                && map.values().all(|v| v.as_str().is_some_and(|s| !s.trim().is_empty())) =>
        {
            Some(map.clone())
        }
        _ => None,
    }
}

impl Rename {
    /// The label map after the change.
    fn next_labels(
        &self,
        current: &Value,
        target: &ResolvedTarget,
        change: &ModelChangeSet,
    ) -> Result<Value, ValidationError> {
        match language(target) {
            Some(lang) => {
                let text = change
                    .new_value
                    .as_str()
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| invalid(change, format!("label for '{lang}' must be non-empty text")))?;
                let mut labels = current.as_object().cloned().unwrap_or_default();
                labels.insert(lang.to_string(), Value::String(text.to_string()));
                Ok(Value::Object(labels))
            }
            None => label_map(&change.new_value)
                .map(Value::Object)
                .ok_or_else(|| invalid(change, "label must be non-empty text or a language map")),
        }
    }
}

impl ChangeSetOperation for Rename {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn is_applicable(&self, target: &ResolvedTarget, _change: &ModelChangeSet) -> bool {
        language(target).is_none_or(is_language_tag)
    }

    fn attribute(&self, _target: &ResolvedTarget) -> String {
        attr::LABEL.to_string()
    }

    fn current_value(&self, models: &Models, target: &ResolvedTarget) -> ModelResult<Value> {
        let labels = models.read_attribute(&target.node, attr::LABEL)?;
        Ok(match language(target) {
            Some(lang) => labels.get(lang).cloned().unwrap_or(Value::Null),
            None => labels,
        })
    }

    fn validate(
        &self,
        models: &Models,
        target: &ResolvedTarget,
        change: &ModelChangeSet,
    ) -> Result<bool, ValidationError> {
        let current = read(models, target, attr::LABEL, change)?;
        let next = self.next_labels(&current, target, change)?;
        Ok(next != current)
    }

    fn apply(
        &self,
        models: &mut Models,
        target: &ResolvedTarget,
        change: &ModelChangeSet,
    ) -> ModelResult<AppliedChange> {
        let current = models.read_attribute(&target.node, attr::LABEL)?;
        let next = self
            .next_labels(&current, target, change)
            .map_err(|e| ModelError::InvalidValue {
                attribute: attr::LABEL.to_string(),
                reason: e.message,
            })?;
        let old_labels = models.write_attribute(&target.node, attr::LABEL, next.clone())?;

        // Only the named translation is recorded; replay merges it.
        let (old_value, new_value, language) = match language(target) {
            Some(lang) => (
                old_labels.get(lang).cloned().unwrap_or(Value::Null),
                next.get(lang).cloned().unwrap_or(Value::Null),
                Some(lang.to_string()),
            ),
            None => (old_labels, next, None),
        };
        Ok(AppliedChange {
            selector: target.node.to_selector(None),
            attribute: attr::LABEL.to_string(),
            old_value,
            new_value,
            language,
        })
    }
}
