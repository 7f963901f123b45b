//! Profile-bound view of the evaluator for UI call sites.
//!
//! A [`PermissionProvider`] owns the current session profile and hands out
//! [`Permissions`] snapshots. Snapshots are rebuilt only when the profile
//! `Arc` is replaced; in-flight holders keep evaluating against the snapshot
//! they already have.

use std::cell::RefCell;
use std::sync::{Arc, PoisonError, RwLock};

use super::evaluator::{DefaultPolicyEvaluator, PolicyEvaluator};
use super::filter::{self, ScopedRecord};
use super::profile::UserAuthProfile;
use super::PlantId;
use crate::errors::{AuthzError, AuthzResult};

/// Evaluator closures and derived flags projected from one profile.
pub struct Permissions {
    profile: Option<Arc<UserAuthProfile>>,
    evaluator: Arc<dyn PolicyEvaluator>,
    pub is_super_admin: bool,
    pub is_approver: bool,
    pub is_it_bin: bool,
    pub it_plant_ids: Vec<PlantId>,
    pub permitted_plant_ids: Vec<PlantId>,
}

impl std::fmt::Debug for Permissions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Permissions")
            .field("user_id", &self.profile.as_ref().and_then(|p| p.user_id))
            .field("is_super_admin", &self.is_super_admin)
            .field("is_approver", &self.is_approver)
            .field("is_it_bin", &self.is_it_bin)
            .finish_non_exhaustive()
    }
}

impl Permissions {
    pub fn new(profile: Option<Arc<UserAuthProfile>>, evaluator: Arc<dyn PolicyEvaluator>) -> Self {
        let view = profile.as_deref();
        let is_super_admin = view.is_some_and(UserAuthProfile::is_super_admin);
        let is_approver = view.is_some_and(|p| p.is_approver);
        let is_it_bin = view.is_some_and(|p| p.is_it_bin);
        let it_plant_ids: Vec<PlantId> = view.map(|p| p.it_plant_ids.iter().copied().collect()).unwrap_or_default();
        let permitted_plant_ids: Vec<PlantId> = view
            .map(|p| p.permitted_plant_ids.iter().copied().collect())
            .unwrap_or_default();

        Self {
            profile,
            evaluator,
            is_super_admin,
            is_approver,
            is_it_bin,
            it_plant_ids,
            permitted_plant_ids,
        }
    }

    pub fn profile(&self) -> Option<&UserAuthProfile> {
        self.profile.as_deref()
    }

    pub fn has_permission(&self, permission: &str, resource_id: Option<PlantId>) -> bool {
        self.evaluator.has_permission(self.profile(), permission, resource_id)
    }

    pub fn has_any_permission(&self, permissions: &[&str], resource_id: Option<PlantId>) -> bool {
        self.evaluator.has_any_permission(self.profile(), permissions, resource_id)
    }

    pub fn has_all_permissions(&self, permissions: &[&str], resource_id: Option<PlantId>) -> bool {
        self.evaluator.has_all_permissions(self.profile(), permissions, resource_id)
    }

    pub fn can_access_resource(&self, resource_id: PlantId) -> bool {
        self.evaluator.can_access_resource(self.profile(), resource_id)
    }

    pub fn filter_by_module_and_resource<T: ScopedRecord>(&self, records: Vec<T>, module_id: &str) -> Vec<T> {
        filter::filter_by_module_and_resource(records, self.profile(), module_id)
    }

    pub fn filter_by_resource_access<T: ScopedRecord>(&self, records: Vec<T>) -> Vec<T> {
        filter::filter_by_resource_access(records, self.profile())
    }
}

/// Holds the session profile and the projection derived from it.
pub struct PermissionProvider {
    evaluator: Arc<dyn PolicyEvaluator>,
    current: RwLock<Arc<Permissions>>,
}

impl PermissionProvider {
    pub fn new(profile: Option<Arc<UserAuthProfile>>) -> Arc<Self> {
        Self::with_evaluator(profile, Arc::new(DefaultPolicyEvaluator::new()))
    }

    pub fn with_evaluator(
        profile: Option<Arc<UserAuthProfile>>,
        evaluator: Arc<dyn PolicyEvaluator>,
    ) -> Arc<Self> {
        let projection = Arc::new(Permissions::new(profile, Arc::clone(&evaluator)));
        Arc::new(Self {
            evaluator,
            current: RwLock::new(projection),
        })
    }

    /// Current projection. Cheap; callers may hold it across evaluations.
    pub fn permissions(&self) -> Arc<Permissions> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*current)
    }

    /// Replace the profile (login, logout, session refresh).
    ///
    /// Returns `true` when the projection was rebuilt, `false` when the same
    /// profile `Arc` was passed again.
    pub fn set_profile(&self, profile: Option<Arc<UserAuthProfile>>) -> bool {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let unchanged = match (&current.profile, &profile) {
            (None, None) => true,
            (Some(old), Some(new)) => Arc::ptr_eq(old, new),
            _ => false,
        };
        if unchanged {
            return false;
        }

        tracing::debug!(
            user_id = ?profile.as_ref().and_then(|p| p.user_id),
            profile = %profile.as_ref().map(|p| p.fingerprint()).unwrap_or_else(|| "none".to_string()),
            "re-projecting permissions"
        );
        *current = Arc::new(Permissions::new(profile, Arc::clone(&self.evaluator)));
        true
    }

    /// Run `f` with this provider active on the current thread.
    pub fn scope<R>(self: &Arc<Self>, f: impl FnOnce() -> R) -> R {
        ACTIVE.with(|stack| stack.borrow_mut().push(Arc::clone(self)));
        let _guard = ScopeGuard;
        f()
    }
}

thread_local! {
    static ACTIVE: RefCell<Vec<Arc<PermissionProvider>>> = const { RefCell::new(Vec::new()) };
}

struct ScopeGuard;

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        ACTIVE.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Projection of the innermost active provider.
///
/// Calling this outside [`PermissionProvider::scope`] is a wiring bug and
/// yields [`AuthzError::Configuration`].
pub fn use_permissions() -> AuthzResult<Arc<Permissions>> {
    ACTIVE
        .with(|stack| stack.borrow().last().map(|provider| provider.permissions()))
        .ok_or_else(|| AuthzError::configuration("use_permissions called outside a PermissionProvider scope"))
}
