use std::collections::{BTreeSet, HashSet};

use crate::authz::catalog::{Action, Role};
use crate::authz::PlantId;
use crate::errors::AuthzResult;
use crate::models::profile::{PlantActions, PlantPermission, RoleIdField, SessionProfile};
use crate::utils::fingerprint;

impl PlantActions {
    /// Only an explicit `true` grants; absent and `false` both deny.
    pub fn allows(&self, action: Action) -> bool {
        let flag = match action {
            Action::Create => self.create,
            Action::Read => self.read,
            Action::Update => self.update,
            Action::Delete => self.delete,
            _ => None,
        };
        flag == Some(true)
    }
}

impl PlantPermission {
    pub fn new(module_id: impl Into<String>, plant_id: PlantId, actions: PlantActions) -> Self {
        Self {
            module_id: module_id.into(),
            plant_id,
            actions,
        }
    }
}

/// Authenticated user's authorization profile, normalized at construction.
///
/// Treated as an immutable value: a session change produces a new profile
/// rather than mutating this one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserAuthProfile {
    pub user_id: Option<i64>,
    pub role_ids: BTreeSet<i64>,
    pub super_admin_flag: bool,
    pub is_approver: bool,
    pub is_it_bin: bool,
    pub global_permissions: HashSet<String>,
    /// Ordered; at most one entry per `(module_id, plant_id)`.
    pub plant_permissions: Vec<PlantPermission>,
    pub permitted_plant_ids: BTreeSet<PlantId>,
    pub it_plant_ids: BTreeSet<PlantId>,
}

impl UserAuthProfile {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// Decode a session payload, naming the offending field on failure.
    pub fn from_json(payload: &str) -> AuthzResult<Self> {
        let mut de = serde_json::Deserializer::from_str(payload);
        let session: SessionProfile = serde_path_to_error::deserialize(&mut de)?;
        Ok(Self::from(session))
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = i64>) -> Self {
        self.role_ids = roles.into_iter().collect();
        self
    }

    pub fn with_super_admin_flag(mut self, flag: bool) -> Self {
        self.super_admin_flag = flag;
        self
    }

    pub fn with_approver(mut self, flag: bool) -> Self {
        self.is_approver = flag;
        self
    }

    pub fn with_it_bin(mut self, flag: bool) -> Self {
        self.is_it_bin = flag;
        self
    }

    pub fn with_permissions<S: Into<String>>(mut self, perms: impl IntoIterator<Item = S>) -> Self {
        self.global_permissions = perms.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the scoped grants, dropping later duplicates of a `(module, plant)` pair.
    pub fn with_plant_permissions(mut self, grants: impl IntoIterator<Item = PlantPermission>) -> Self {
        self.plant_permissions = dedupe_first_wins(grants);
        self
    }

    pub fn with_permitted_plants(mut self, plants: impl IntoIterator<Item = PlantId>) -> Self {
        self.permitted_plant_ids = plants.into_iter().collect();
        self
    }

    pub fn with_it_plants(mut self, plants: impl IntoIterator<Item = PlantId>) -> Self {
        self.it_plant_ids = plants.into_iter().collect();
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role_ids.contains(&role.id())
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.global_permissions.contains(permission)
    }

    pub fn is_super_admin(&self) -> bool {
        self.super_admin_flag || self.has_role(Role::SuperAdmin)
    }

    /// First scoped grant for `plant_id`, regardless of module.
    pub fn first_grant_for_plant(&self, plant_id: PlantId) -> Option<&PlantPermission> {
        self.plant_permissions.iter().find(|grant| grant.plant_id == plant_id)
    }

    /// Plants granted for `module_id` through scoped grants.
    pub fn plants_for_module(&self, module_id: &str) -> HashSet<PlantId> {
        self.plant_permissions
            .iter()
            .filter(|grant| grant.module_id == module_id)
            .map(|grant| grant.plant_id)
            .collect()
    }

    /// Canonical wire form; sets are emitted sorted so equal profiles serialize equally.
    pub fn to_session(&self) -> SessionProfile {
        let mut global: Vec<String> = self.global_permissions.iter().cloned().collect();
        global.sort();

        SessionProfile {
            user_id: self.user_id,
            role_id: RoleIdField::Many(self.role_ids.iter().copied().collect()),
            is_super_admin: self.super_admin_flag,
            is_approver: self.is_approver,
            is_it_bin: self.is_it_bin,
            global_permissions: global,
            plant_permissions: self.plant_permissions.clone(),
            permitted_plant_ids: self.permitted_plant_ids.iter().copied().collect(),
            it_plant_ids: self.it_plant_ids.iter().copied().collect(),
        }
    }

    /// SHA-256 hex digest of the canonical wire form.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_vec(&self.to_session()).unwrap_or_default();
        fingerprint(&canonical)
    }
}

impl From<SessionProfile> for UserAuthProfile {
    fn from(session: SessionProfile) -> Self {
        Self {
            user_id: session.user_id,
            role_ids: session.role_id.into_vec().into_iter().collect(),
            super_admin_flag: session.is_super_admin,
            is_approver: session.is_approver,
            is_it_bin: session.is_it_bin,
            global_permissions: session.global_permissions.into_iter().collect(),
            plant_permissions: dedupe_first_wins(session.plant_permissions),
            permitted_plant_ids: session.permitted_plant_ids.into_iter().collect(),
            it_plant_ids: session.it_plant_ids.into_iter().collect(),
        }
    }
}

fn dedupe_first_wins(grants: impl IntoIterator<Item = PlantPermission>) -> Vec<PlantPermission> {
    let mut seen = HashSet::new();
    grants
        .into_iter()
        .filter(|grant| seen.insert((grant.module_id.clone(), grant.plant_id)))
        .collect()
}
