use super::{invalid, read, same_value, ChangeSetOperation};
use crate::error::ValidationError;
use modelmgmt_model::{MetaValueType, ModelChangeSet, Models, ResolvedTarget};
use modelmgmt_types::is_empty_value;

/// Generic write of any attribute declared in the meta-info catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifyAttribute;

impl ChangeSetOperation for ModifyAttribute {
    fn name(&self) -> &'static str {
        "modifyAttribute"
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
        let attribute = self.attribute(target);
        let kind = target.node.kind();
        let Some(meta) = models.meta_info().find(kind, &attribute) else {
            return Err(invalid(change, format!("unknown {kind} attribute '{attribute}'")));
        };

        let new_value = &change.new_value;
        if is_empty_value(new_value) {
            if meta.mandatory {
                return Err(invalid(change, format!("attribute '{attribute}' is mandatory")));
            }
        } else {
            meta.check_value(new_value)
                .map_err(|reason| invalid(change, reason))?;
            if meta.value_type == MetaValueType::Region {
                let region = new_value.as_str().unwrap_or_default();
                if models.find_region(target.node.root_id(), region).is_none() {
                    return Err(invalid(change, format!("unknown region '{region}'")));
                }
            }
        }

        let current = read(models, target, &attribute, change)?;
        if meta.read_only && !is_empty_value(&current) {
            return Err(invalid(change, format!("attribute '{attribute}' is read-only")));
        }
        Ok(!same_value(&current, new_value))
    }
}
