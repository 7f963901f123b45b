//! Authorization module - permission catalog, policy evaluator, record filters
//!
//! This module implements the master-data console's access rules:
//! - Closed catalog of `<action>:<resource>` permission strings
//! - Super admin bypass
//! - Global permissions with plant-scoped CRUD overrides
//! - Coarse plant visibility gate (permitted / IT plants)
//! - Bulk record filters for list views
//! - A profile-bound projection for UI call sites

pub mod catalog;
mod context;
mod evaluator;
mod filter;
mod profile;

pub use catalog::{
    all_permissions, is_valid_permission, permissions, permissions_for_module, Action, Module, Role,
};
pub use context::{use_permissions, PermissionProvider, Permissions};
pub use evaluator::{
    can_access_resource, has_all_permissions, has_any_permission, has_permission,
    DefaultPolicyEvaluator, PolicyEvaluator,
};
pub use filter::{
    filter_by_module_and_resource, filter_by_resource_access, ResourceRef, ScopedRecord,
    RESOURCE_FIELD_ALIASES,
};
pub use profile::UserAuthProfile;

/// Identifier of a plant (site) that grants and records are scoped to.
pub type PlantId = i64;
