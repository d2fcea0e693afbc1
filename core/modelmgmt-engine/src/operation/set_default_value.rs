use super::{invalid, read, same_value, ChangeSetOperation};
use crate::error::ValidationError;
use modelmgmt_model::{attr, ModelChangeSet, Models, NodeRef, ResolvedTarget};

/// Sets the default value of a field.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetDefaultValue;

impl ChangeSetOperation for SetDefaultValue {
    fn name(&self) -> &'static str {
        "setDefaultValue"
    }

    fn is_applicable(&self, target: &ResolvedTarget, _change: &ModelChangeSet) -> bool {
        matches!(target.node, NodeRef::Field { .. })
            && target.attribute.as_deref().is_none_or(|a| a == attr::VALUE)
    }

    fn attribute(&self, _target: &ResolvedTarget) -> String {
        attr::VALUE.to_string()
    }

    fn validate(
        &self,
        models: &Models,
        target: &ResolvedTarget,
        change: &ModelChangeSet,
    ) -> Result<bool, ValidationError> {
        if change.new_value.is_object() {
            return Err(invalid(change, "default value must be a scalar or a list"));
        }
        let current = read(models, target, attr::VALUE, change)?;
        Ok(!same_value(&current, &change.new_value))
    }
}
