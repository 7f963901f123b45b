use super::catalog::{is_valid_permission, Action};
use super::profile::UserAuthProfile;
use super::PlantId;

/// Policy evaluator trait for pluggable authorization logic
pub trait PolicyEvaluator: Send + Sync {
    /// Check if the profile may perform `permission`, optionally scoped to a plant
    fn has_permission(
        &self,
        profile: Option<&UserAuthProfile>,
        permission: &str,
        resource_id: Option<PlantId>,
    ) -> bool;

    /// Coarse plant visibility gate, independent of module and action
    fn can_access_resource(&self, profile: Option<&UserAuthProfile>, resource_id: PlantId) -> bool;

    fn has_any_permission(
        &self,
        profile: Option<&UserAuthProfile>,
        permissions: &[&str],
        resource_id: Option<PlantId>,
    ) -> bool {
        permissions
            .iter()
            .any(|permission| self.has_permission(profile, permission, resource_id))
    }

    fn has_all_permissions(
        &self,
        profile: Option<&UserAuthProfile>,
        permissions: &[&str],
        resource_id: Option<PlantId>,
    ) -> bool {
        permissions
            .iter()
            .all(|permission| self.has_permission(profile, permission, resource_id))
    }
}

/// Default policy evaluator for the master-data console
///
/// Evaluation order for `has_permission`:
/// 1. no profile -> deny
/// 2. permission not in the catalog -> deny, even for super admins
/// 3. super admin -> allow (skips every remaining step, resource scope included)
/// 4. no resource id -> global grant decides
/// 5. no scoped grant for the plant, or a non-CRUD action -> global grant decides
/// 6. scoped grant's flag for the action decides, with no global fallback
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicyEvaluator;

impl DefaultPolicyEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl PolicyEvaluator for DefaultPolicyEvaluator {
    fn has_permission(
        &self,
        profile: Option<&UserAuthProfile>,
        permission: &str,
        resource_id: Option<PlantId>,
    ) -> bool {
        has_permission(profile, permission, resource_id)
    }

    fn can_access_resource(&self, profile: Option<&UserAuthProfile>, resource_id: PlantId) -> bool {
        can_access_resource(profile, resource_id)
    }
}

pub fn has_permission(
    profile: Option<&UserAuthProfile>,
    permission: &str,
    resource_id: Option<PlantId>,
) -> bool {
    let Some(profile) = profile else {
        tracing::debug!(permission = %permission, "no profile, permission denied");
        return false;
    };

    if !is_valid_permission(permission) {
        tracing::debug!(
            user_id = ?profile.user_id,
            permission = %permission,
            "permission not in catalog"
        );
        return false;
    }

    if profile.is_super_admin() {
        tracing::debug!(
            user_id = ?profile.user_id,
            permission = %permission,
            "super_admin bypass"
        );
        return true;
    }

    let global_allowed = profile.has_permission(permission);

    let Some(plant_id) = resource_id else {
        return global_allowed;
    };

    // Module is deliberately not matched here, unlike the record filter. A CRUD
    // grant for one module at a plant answers scoped checks for every module at
    // that plant. Pinned by `test_scoped_lookup_ignores_module`; pending product review.
    let Some(grant) = profile.first_grant_for_plant(plant_id) else {
        return global_allowed;
    };

    let action = match Action::of_permission(permission) {
        Some(action) if action.is_crud() => action,
        _ => return global_allowed,
    };

    let allowed = grant.actions.allows(action);
    tracing::debug!(
        user_id = ?profile.user_id,
        permission = %permission,
        resource_id = plant_id,
        module_id = %grant.module_id,
        allowed,
        "scoped permission decision"
    );
    allowed
}

pub fn has_any_permission(
    profile: Option<&UserAuthProfile>,
    permissions: &[&str],
    resource_id: Option<PlantId>,
) -> bool {
    DefaultPolicyEvaluator.has_any_permission(profile, permissions, resource_id)
}

pub fn has_all_permissions(
    profile: Option<&UserAuthProfile>,
    permissions: &[&str],
    resource_id: Option<PlantId>,
) -> bool {
    DefaultPolicyEvaluator.has_all_permissions(profile, permissions, resource_id)
}

pub fn can_access_resource(profile: Option<&UserAuthProfile>, resource_id: PlantId) -> bool {
    let Some(profile) = profile else {
        return false;
    };

    if profile.is_super_admin() || profile.permitted_plant_ids.contains(&resource_id) {
        return true;
    }

    profile.is_it_bin && profile.it_plant_ids.contains(&resource_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::catalog::{all_permissions, permissions};
    use crate::models::profile::{PlantActions, PlantPermission};

    fn grant(module: &str, plant: PlantId, actions: PlantActions) -> PlantPermission {
        PlantPermission::new(module, plant, actions)
    }

    fn update_only() -> PlantActions {
        PlantActions {
            update: Some(true),
            ..PlantActions::default()
        }
    }

    #[test]
    fn test_absent_profile_denies() {
        assert!(!has_permission(None, permissions::READ_PLANT, None));
        assert!(!has_permission(None, permissions::READ_PLANT, Some(5)));
        assert!(!can_access_resource(None, 5));
    }

    #[test]
    fn test_super_admin_bypasses_all() {
        let profile = UserAuthProfile::new(1).with_roles([1]);
        for permission in all_permissions() {
            assert!(has_permission(Some(&profile), permission, None));
            assert!(has_permission(Some(&profile), permission, Some(42)));
        }
        assert!(can_access_resource(Some(&profile), 42));
    }

    #[test]
    fn test_super_admin_bypasses_scoped_false() {
        let profile = UserAuthProfile::new(1)
            .with_super_admin_flag(true)
            .with_plant_permissions(vec![grant("plant", 5, PlantActions::default())]);
        assert!(has_permission(Some(&profile), permissions::DELETE_PLANT, Some(5)));
    }

    #[test]
    fn test_unknown_permission_denied_even_for_super_admin() {
        let admin = UserAuthProfile::new(1).with_roles([1]);
        let user = UserAuthProfile::new(2).with_permissions(["drop:everything"]);
        assert!(!has_permission(Some(&admin), "drop:everything", None));
        assert!(!has_permission(Some(&user), "drop:everything", None));
    }

    #[test]
    fn test_global_permission_allows_with_or_without_resource() {
        let profile = UserAuthProfile::new(2).with_roles([4]).with_permissions([permissions::READ_PLANT]);
        assert!(has_permission(Some(&profile), permissions::READ_PLANT, None));
        assert!(has_permission(Some(&profile), permissions::READ_PLANT, Some(5)));
        assert!(!has_permission(Some(&profile), permissions::UPDATE_PLANT, None));
    }

    #[test]
    fn test_scoped_grant_decides_crud() {
        let profile = UserAuthProfile::new(2)
            .with_roles([4])
            .with_plant_permissions(vec![grant("plant", 5, update_only())]);
        assert!(has_permission(Some(&profile), permissions::UPDATE_PLANT, Some(5)));
        assert!(!has_permission(Some(&profile), permissions::DELETE_PLANT, Some(5)));
        assert!(!has_permission(Some(&profile), permissions::UPDATE_PLANT, Some(6)));
        assert!(!has_permission(Some(&profile), permissions::UPDATE_PLANT, None));
    }

    #[test]
    fn test_scoped_false_overrides_global() {
        let profile = UserAuthProfile::new(2)
            .with_permissions([permissions::DELETE_PLANT])
            .with_plant_permissions(vec![grant("plant", 5, update_only())]);
        assert!(!has_permission(Some(&profile), permissions::DELETE_PLANT, Some(5)));
        assert!(has_permission(Some(&profile), permissions::DELETE_PLANT, Some(6)));
        assert!(has_permission(Some(&profile), permissions::DELETE_PLANT, None));
    }

    #[test]
    fn test_non_crud_falls_back_to_global() {
        let everything = PlantActions {
            create: Some(true),
            read: Some(true),
            update: Some(true),
            delete: Some(true),
        };
        let profile = UserAuthProfile::new(2)
            .with_permissions([permissions::EXPORT_REPORT])
            .with_plant_permissions(vec![grant("plant", 5, everything)]);
        assert!(!has_permission(Some(&profile), permissions::APPROVE_PLANT, Some(5)));
        assert!(has_permission(Some(&profile), permissions::EXPORT_REPORT, Some(5)));
    }

    #[test]
    fn test_scoped_lookup_ignores_module() {
        // A vendor grant at plant 5 also answers a plant_master update check at plant 5.
        let profile = UserAuthProfile::new(2)
            .with_plant_permissions(vec![grant("vendor", 5, update_only())]);
        assert!(has_permission(Some(&profile), permissions::UPDATE_PLANT, Some(5)));
        assert!(has_permission(Some(&profile), permissions::UPDATE_SERVER, Some(5)));
    }

    #[test]
    fn test_first_matching_plant_entry_wins() {
        let profile = UserAuthProfile::new(2).with_plant_permissions(vec![
            grant("vendor", 5, PlantActions::default()),
            grant("plant", 5, update_only()),
        ]);
        assert!(!has_permission(Some(&profile), permissions::UPDATE_PLANT, Some(5)));
    }

    #[test]
    fn test_any_and_all() {
        let profile = UserAuthProfile::new(2).with_permissions([permissions::READ_PLANT]);
        let evaluator = DefaultPolicyEvaluator::new();
        let both = [permissions::READ_PLANT, permissions::UPDATE_PLANT];

        assert!(evaluator.has_any_permission(Some(&profile), &both, None));
        assert!(!evaluator.has_all_permissions(Some(&profile), &both, None));
        assert!(!has_any_permission(Some(&profile), &[], None));
        assert!(has_all_permissions(Some(&profile), &[], None));
    }

    #[test]
    fn test_resource_gate() {
        let profile = UserAuthProfile::new(2).with_permitted_plants([1, 2]).with_it_plants([3]);
        assert!(can_access_resource(Some(&profile), 1));
        assert!(!can_access_resource(Some(&profile), 3));

        let it_bin = profile.with_it_bin(true);
        assert!(can_access_resource(Some(&it_bin), 3));
        assert!(!can_access_resource(Some(&it_bin), 4));
    }

    #[test]
    fn test_resource_gate_is_independent_of_grants() {
        let profile = UserAuthProfile::new(2)
            .with_permissions([permissions::READ_PLANT])
            .with_plant_permissions(vec![grant("plant", 5, update_only())]);
        assert!(!can_access_resource(Some(&profile), 5));
    }
}
