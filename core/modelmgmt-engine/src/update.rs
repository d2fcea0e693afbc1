//! Update engine: turns a `ModelUpdateRequest` into a new store snapshot.
//!
//! The engine never mutates the snapshot it is given. A batch is applied to a
//! working copy which is handed back only when every change-set passed, so a
//! rejected batch leaves nothing behind.

use crate::error::{
    ChangeSetCollision, CollisionEntry, EngineError, EngineResult, ValidationError,
};
use crate::operation::{same_value, ChangeSetOperation, OperationRegistry};
use modelmgmt_model::{
    AppliedChange, ModelChangeSet, ModelError, ModelUpdateRequest, Models, ResolvedTarget,
    Selector,
};
use tracing::debug;

/// A batch that passed collision detection and validation.
#[derive(Debug, Clone)]
pub struct CommittedUpdate {
    /// The new snapshot, with its version already advanced.
    pub models: Models,
    /// Each submitted change-set with the write it produced, in request order.
    pub changes: Vec<(ModelChangeSet, AppliedChange)>,
}

/// Validates and applies change-set batches.
#[derive(Debug, Clone)]
pub struct UpdateEngine {
    registry: OperationRegistry,
}

impl Default for UpdateEngine {
    fn default() -> Self {
        Self::new(OperationRegistry::with_defaults())
    }
}

impl UpdateEngine {
    pub fn new(registry: OperationRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Runs one batch against `models`.
    ///
    /// Returns `Ok(None)` for an empty request. Otherwise either every
    /// change-set is applied and the version advances by exactly one, or
    /// the whole batch is rejected.
    pub fn update(
        &self,
        models: &Models,
        request: &ModelUpdateRequest,
    ) -> EngineResult<Option<CommittedUpdate>> {
        if request.is_empty() {
            return Ok(None);
        }

        if request.model_version != models.version() {
            debug!(
                client_version = request.model_version,
                version = models.version(),
                "stale request, comparing old values"
            );
            self.detect_collisions(models, request)?;
        }

        let mut working = models.clone();
        let mut errors = Vec::new();
        let mut changes = Vec::with_capacity(request.changes.len());

        for change in &request.changes {
            let target = resolve(&working, change)?;
            match self.validate_one(&working, &target, change) {
                Ok(operation) => match operation.apply(&mut working, &target, change) {
                    Ok(applied) => {
                        debug!(
                            selector = %change.selector,
                            operation = %change.operation,
                            attribute = %applied.attribute,
                            "applied change-set"
                        );
                        changes.push((change.clone(), applied));
                    }
                    Err(e) => errors.push(ValidationError::new(change.selector.clone(), e.to_string())),
                },
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(EngineError::Validation(errors));
        }

        working.increment_version();
        Ok(Some(CommittedUpdate {
            models: working,
            changes,
        }))
    }

    /// Compares every change-set's `oldValue` with the live value and fails
    /// with all mismatches at once.
    fn detect_collisions(&self, models: &Models, request: &ModelUpdateRequest) -> EngineResult<()> {
        let mut collisions = Vec::new();
        for change in &request.changes {
            let target = resolve(models, change)?;
            // Unknown or inapplicable operations are reported by validation.
            let Some(operation) = self.operation_for(&target, change) else {
                continue;
            };
            let Ok(actual) = operation.current_value(models, &target) else {
                continue;
            };
            if !same_value(&change.old_value, &actual) {
                collisions.push(CollisionEntry {
                    selector: change.selector.clone(),
                    expected: change.old_value.clone(),
                    actual,
                });
            }
        }

        if collisions.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Collision(ChangeSetCollision { collisions }))
        }
    }

    fn operation_for(
        &self,
        target: &ResolvedTarget,
        change: &ModelChangeSet,
    ) -> Option<&dyn ChangeSetOperation> {
        self.registry
            .get(&change.operation)
            .filter(|op| op.is_applicable(target, change))
    }

    fn validate_one(
        &self,
        models: &Models,
        target: &ResolvedTarget,
        change: &ModelChangeSet,
    ) -> Result<&dyn ChangeSetOperation, ValidationError> {
        let operation = self.registry.get(&change.operation).ok_or_else(|| {
            ValidationError::new(
                change.selector.clone(),
                format!("unknown operation '{}'", change.operation),
            )
        })?;
        if !operation.is_applicable(target, change) {
            return Err(ValidationError::new(
                change.selector.clone(),
                format!("operation '{}' does not apply to this selector", change.operation),
            ));
        }
        if !operation.validate(models, target, change)? {
            return Err(ValidationError::new(
                change.selector.clone(),
                format!(
                    "'{}' already holds the requested value",
                    operation.attribute(target)
                ),
            ));
        }
        Ok(operation)
    }
}

fn resolve(models: &Models, change: &ModelChangeSet) -> EngineResult<ResolvedTarget> {
    let selector = Selector::parse(&change.selector).map_err(|e| {
        EngineError::Validation(vec![ValidationError::new(change.selector.clone(), e.to_string())])
    })?;
    selector.resolve(models).map_err(|e| match e {
        ModelError::NotFound { selector } => EngineError::NotFound { selector },
        other => EngineError::Model(other),
    })
}
