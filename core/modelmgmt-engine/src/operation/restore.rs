use super::{invalid, read, ChangeSetOperation};
use crate::error::ValidationError;
use modelmgmt_model::{ModelChangeSet, Models, ResolvedTarget};
use modelmgmt_types::is_empty_value;

/// Drops an attribute set on the node so the inherited or default value
/// applies again.
#[derive(Debug, Clone, Copy, Default)]
pub struct Restore;

impl ChangeSetOperation for Restore {
    fn name(&self) -> &'static str {
        "restore"
    }

    fn is_applicable(&self, target: &ResolvedTarget, _change: &ModelChangeSet) -> bool {
        target.attribute.is_some()
    }

    fn attribute(&self, target: &ResolvedTarget) -> String {
        target.attribute.clone().unwrap_or_default()
    }

    fn validate(
        &self,
        models: &Models,
        target: &ResolvedTarget,
        change: &ModelChangeSet,
    ) -> Result<bool, ValidationError> {
        if !is_empty_value(&change.new_value) {
            return Err(invalid(change, "restore does not take a new value"));
        }
        let attribute = self.attribute(target);
        let read_only = models
            .meta_info()
            .find(target.node.kind(), &attribute)
            .is_some_and(|meta| meta.read_only);
        if read_only {
            return Err(invalid(change, format!("attribute '{attribute}' is read-only")));
        }
        let current = read(models, target, &attribute, change)?;
        if is_empty_value(&current) {
            return Err(invalid(change, format!("attribute '{attribute}' is not set")));
        }
        Ok(true)
    }
}
