//! Versioned model store for model management.
//!
//! Defines the in-memory representation every other component reads and
//! mutates through:
//! - [`ModelClass`], [`ModelDefinition`], [`ModelField`], [`ModelRegion`]: the model nodes
//! - [`NodeTable`]: insertion-ordered, id-indexed node arena
//! - [`ModelsMetaInfo`]: per-kind attribute catalog (type, cardinality, mandatory, read-only)
//! - [`Models`]: the store: node tables, meta-info and the version counter
//! - [`Selector`]: path-like addressing (`definition=PR0001/field=title`)
//! - [`ModelChangeSet`] and friends: the wire types of an update
//! - [`build_hierarchy`]: the derived class → definition tree
//!
//! Nodes never hold references to each other. Parent links, field ownership
//! and region membership are plain ids resolved through the store.

mod change_set;
mod error;
mod hierarchy;
mod meta_info;
mod models;
mod node;
mod response;
mod selector;
mod table;

pub use change_set::{
    AppliedChange, ChangeHistory, ChangeSetStatus, DeploymentRecord, ModelChangeSet,
    ModelChangeSetInfo, ModelDeploymentRequest, ModelUpdateRequest, ModelUpdateResponse,
};
pub use error::{ModelError, ModelResult};
pub use hierarchy::{build_hierarchy, ModelHierarchyClass, ModelHierarchyDefinition};
pub use meta_info::{Cardinality, MetaValueType, ModelMetaInfo, ModelsMetaInfo, DISPLAY_TYPES};
pub use models::Models;
pub use node::{
    attr, Attributes, Labels, ModelClass, ModelDefinition, ModelField, ModelRegion, NodeKind,
    DEFAULT_LANGUAGE,
};
pub use response::ModelResponse;
pub use selector::{resolve, NodeRef, ResolvedTarget, Segment, Selector};
pub use table::{Identified, NodeTable};
