use serde::{Deserialize, Serialize};

use crate::{
    db::InventoryFilter,
    model::{BloodGroup, Inventory, InventoryType, User},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryRequest {
    pub inventory_type: InventoryType,
    pub blood_group: BloodGroup,
    pub quantity: i64,
    /// E-mail of the donor (`in`) or hospital (`out`).
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub filters: InventoryFilter,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordPayload {
    pub inventory: Inventory,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InventoryPayload {
    pub inventory: Vec<Inventory>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DonarsPayload {
    pub donars: Vec<User>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HospitalsPayload {
    pub hospitals: Vec<User>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrganisationsPayload {
    pub organisations: Vec<User>,
}
