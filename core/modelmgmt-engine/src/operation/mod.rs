//! Change-set operations.
//!
//! Each operation interprets one kind of change-set: which attribute it
//! touches, whether the change is legal against the current store, and how to
//! write it. Operations are looked up by the `operation` name carried on the
//! change-set through an [`OperationRegistry`].

mod assign_to_region;
mod modify_attribute;
mod rename;
mod restore;
mod set_default_value;

pub use assign_to_region::AssignToRegion;
pub use modify_attribute::ModifyAttribute;
pub use rename::Rename;
pub use restore::Restore;
pub use set_default_value::SetDefaultValue;

use crate::error::ValidationError;
use modelmgmt_model::{AppliedChange, ModelChangeSet, ModelResult, Models, ResolvedTarget};
use modelmgmt_types::is_empty_value;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// One kind of change-set.
///
/// `validate` returns `Ok(false)` for a legal but redundant change (the
/// store already holds the new value); the engine rejects those as well.
pub trait ChangeSetOperation: Send + Sync {
    /// Name matched against `ModelChangeSet::operation`.
    fn name(&self) -> &'static str;

    /// Cheap structural check on the target shape.
    fn is_applicable(&self, target: &ResolvedTarget, change: &ModelChangeSet) -> bool;

    /// Attribute this operation writes on the target.
    fn attribute(&self, target: &ResolvedTarget) -> String;

    /// The live value the client's `oldValue` is compared against.
    fn current_value(&self, models: &Models, target: &ResolvedTarget) -> ModelResult<Value> {
        models.read_attribute(&target.node, &self.attribute(target))
    }

    /// Business-rule check against the current store.
    fn validate(
        &self,
        models: &Models,
        target: &ResolvedTarget,
        change: &ModelChangeSet,
    ) -> Result<bool, ValidationError>;

    /// Writes the change and reports what was written.
    fn apply(
        &self,
        models: &mut Models,
        target: &ResolvedTarget,
        change: &ModelChangeSet,
    ) -> ModelResult<AppliedChange> {
        let attribute = self.attribute(target);
        let old_value = models.write_attribute(&target.node, &attribute, change.new_value.clone())?;
        Ok(AppliedChange {
            selector: target.node.to_selector(None),
            attribute,
            old_value,
            new_value: change.new_value.clone(),
            language: None,
        })
    }
}

/// Operation name → implementation.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    operations: HashMap<&'static str, Arc<dyn ChangeSetOperation>>,
}

impl OperationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in operation.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ModifyAttribute));
        registry.register(Arc::new(AssignToRegion));
        registry.register(Arc::new(Rename));
        registry.register(Arc::new(SetDefaultValue));
        registry.register(Arc::new(Restore));
        registry
    }

    /// Registers an operation, returning the one it replaced.
    pub fn register(
        &mut self,
        operation: Arc<dyn ChangeSetOperation>,
    ) -> Option<Arc<dyn ChangeSetOperation>> {
        self.operations.insert(operation.name(), operation)
    }

    pub fn get(&self, name: &str) -> Option<&dyn ChangeSetOperation> {
        self.operations.get(name).map(|op| op.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.operations.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.names())
            .finish()
    }
}

/// Value equality where every empty value (null, blank string, empty
/// collection) counts as the same.
pub fn same_value(a: &Value, b: &Value) -> bool {
    a == b || (is_empty_value(a) && is_empty_value(b))
}

/// Builds a validation error for the target of `change`.
pub(crate) fn invalid(change: &ModelChangeSet, message: impl Into<String>) -> ValidationError {
    ValidationError::new(change.selector.clone(), message)
}

/// Reads the attribute, mapping model errors onto a validation failure.
pub(crate) fn read(
    models: &Models,
    target: &ResolvedTarget,
    attribute: &str,
    change: &ModelChangeSet,
) -> Result<Value, ValidationError> {
    models
        .read_attribute(&target.node, attribute)
        .map_err(|e| invalid(change, e.to_string()))
}
