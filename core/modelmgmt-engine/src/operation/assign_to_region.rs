use super::{invalid, read, same_value, ChangeSetOperation};
use crate::error::ValidationError;
use modelmgmt_model::{attr, ModelChangeSet, Models, NodeRef, ResolvedTarget};
use modelmgmt_types::is_empty_value;
use serde_json::Value;

/// Moves a field into a region, or out of any region when `newValue` is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignToRegion;

impl ChangeSetOperation for AssignToRegion {
    fn name(&self) -> &'static str {
        "assignToRegion"
    }

    fn is_applicable(&self, target: &ResolvedTarget, _change: &ModelChangeSet) -> bool {
        matches!(target.node, NodeRef::Field { .. })
            && target.attribute.as_deref().is_none_or(|a| a == attr::REGION_ID)
    }

    fn attribute(&self, _target: &ResolvedTarget) -> String {
        attr::REGION_ID.to_string()
    }

    fn validate(
        &self,
        models: &Models,
        target: &ResolvedTarget,
        change: &ModelChangeSet,
    ) -> Result<bool, ValidationError> {
        let current = read(models, target, attr::REGION_ID, change)?;
        let new_value = &change.new_value;
        if is_empty_value(new_value) {
            return Ok(!is_empty_value(&current));
        }

        let Value::String(region) = new_value else {
            return Err(invalid(change, "region id must be a string"));
        };
        if models.find_region(target.node.root_id(), region).is_none() {
            return Err(invalid(change, format!("unknown region '{region}'")));
        }
        Ok(!same_value(&current, new_value))
    }
}
