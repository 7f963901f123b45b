//! Bulk visibility filters for list and table call sites.
//!
//! Two filters exist side by side and are not interchangeable:
//! [`filter_by_module_and_resource`] uses module-scoped grants, while
//! [`filter_by_resource_access`] applies the coarse plant gate. Records that
//! carry no plant reference pass both filters (legacy data predating plant
//! scoping).

use serde_json::Value;

use super::evaluator::can_access_resource;
use super::profile::UserAuthProfile;
use super::PlantId;

/// Field names under which backend records carry their plant reference, in lookup order.
pub const RESOURCE_FIELD_ALIASES: [&str; 4] = ["plant_location_id", "plantLocationId", "plant_id", "plantId"];

/// Plant reference carried by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRef {
    /// No plant field at all; visible to everyone.
    Unscoped,
    Plant(PlantId),
    /// Field present but not a plant id; matches no grant.
    Unrecognized,
}

pub trait ScopedRecord {
    fn resource_ref(&self) -> ResourceRef;
}

impl ScopedRecord for Value {
    fn resource_ref(&self) -> ResourceRef {
        let Some(field) = RESOURCE_FIELD_ALIASES
            .iter()
            .filter_map(|alias| self.get(alias))
            .find(|value| !value.is_null())
        else {
            return ResourceRef::Unscoped;
        };

        let parsed = match field {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<PlantId>().ok(),
            _ => None,
        };
        parsed.map_or(ResourceRef::Unrecognized, ResourceRef::Plant)
    }
}

impl<T: ScopedRecord> ScopedRecord for &T {
    fn resource_ref(&self) -> ResourceRef {
        (*self).resource_ref()
    }
}

/// Keep records whose plant is granted for `module_id`, plus unscoped records.
///
/// Super admins get the input back untouched. No global permission is consulted.
pub fn filter_by_module_and_resource<T: ScopedRecord>(
    records: Vec<T>,
    profile: Option<&UserAuthProfile>,
    module_id: &str,
) -> Vec<T> {
    if profile.is_some_and(UserAuthProfile::is_super_admin) {
        return records;
    }

    let allowed = profile
        .map(|profile| profile.plants_for_module(module_id))
        .unwrap_or_default();

    let before = records.len();
    let visible: Vec<T> = records
        .into_iter()
        .filter(|record| match record.resource_ref() {
            ResourceRef::Unscoped => true,
            ResourceRef::Plant(plant_id) => allowed.contains(&plant_id),
            ResourceRef::Unrecognized => false,
        })
        .collect();

    tracing::debug!(
        user_id = ?profile.and_then(|p| p.user_id),
        module_id = %module_id,
        before,
        after = visible.len(),
        "filtered records by module grants"
    );
    visible
}

/// Keep records whose plant passes [`can_access_resource`], plus unscoped records.
pub fn filter_by_resource_access<T: ScopedRecord>(
    records: Vec<T>,
    profile: Option<&UserAuthProfile>,
) -> Vec<T> {
    records
        .into_iter()
        .filter(|record| match record.resource_ref() {
            ResourceRef::Unscoped => true,
            ResourceRef::Plant(plant_id) => can_access_resource(profile, plant_id),
            ResourceRef::Unrecognized => profile.is_some_and(UserAuthProfile::is_super_admin),
        })
        .collect()
}
