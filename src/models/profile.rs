use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::authz::PlantId;

// =============================================================================
// LENIENT DECODERS
// =============================================================================

/// Id as the legacy backend encodes it: a JSON number or a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientId {
    Number(i64),
    Text(String),
}

impl LenientId {
    fn into_id<E: de::Error>(self) -> Result<PlantId, E> {
        match self {
            LenientId::Number(id) => Ok(id),
            LenientId::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid plant id: {text:?}"))),
        }
    }
}

fn plant_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PlantId, D::Error> {
    LenientId::deserialize(deserializer)?.into_id()
}

/// `null` or missing decodes to an empty list.
fn plant_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<PlantId>, D::Error> {
    Option::<Vec<LenientId>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(LenientId::into_id)
        .collect()
}

/// `null` decodes to no roles, same as a missing `roleId`.
fn role_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RoleIdField, D::Error> {
    Ok(Option::<RoleIdField>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// ROLE ID
// =============================================================================

/// `roleId` as the account backend sends it: sometimes a number, sometimes a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleIdField {
    One(i64),
    Many(Vec<i64>),
}

impl Default for RoleIdField {
    fn default() -> Self {
        RoleIdField::Many(Vec::new())
    }
}

impl RoleIdField {
    pub fn into_vec(self) -> Vec<i64> {
        match self {
            RoleIdField::One(id) => vec![id],
            RoleIdField::Many(ids) => ids,
        }
    }
}

// =============================================================================
// PLANT-SCOPED GRANT
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantActions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantPermission {
    pub module_id: String,
    #[serde(deserialize_with = "plant_id")]
    pub plant_id: PlantId,
    #[serde(default)]
    pub actions: PlantActions,
}

// =============================================================================
// SESSION PROFILE (wire shape)
// =============================================================================

/// Authorization half of the login/session-refresh response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "role_id")]
    pub role_id: RoleIdField,
    #[serde(default)]
    pub is_super_admin: bool,
    #[serde(default)]
    pub is_approver: bool,
    #[serde(default, rename = "isITBin")]
    pub is_it_bin: bool,
    #[serde(default, alias = "permissions")]
    pub global_permissions: Vec<String>,
    #[serde(default)]
    pub plant_permissions: Vec<PlantPermission>,
    #[serde(default, deserialize_with = "plant_ids")]
    pub permitted_plant_ids: Vec<PlantId>,
    #[serde(default, rename = "itPlantIds", deserialize_with = "plant_ids")]
    pub it_plant_ids: Vec<PlantId>,
}
