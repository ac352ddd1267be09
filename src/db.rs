use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::{
    BloodGroup, BloodTotals, Inventory, InventoryType, NewInventory, NewUser, Role, User,
};

#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique column (user e-mail) already holds the value.
    #[error("record already exists")]
    Duplicate,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Optional equality filters over inventory records. All set fields must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_type: Option<InventoryType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<BloodGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donar: Option<Uuid>,
}

impl InventoryFilter {
    pub fn organisation(id: Uuid) -> Self {
        Self {
            organisation: Some(id),
            ..Self::default()
        }
    }

    pub fn matches(&self, rec: &Inventory) -> bool {
        self.inventory_type.map_or(true, |t| t == rec.inventory_type)
            && self.blood_group.map_or(true, |g| g == rec.blood_group)
            && self.organisation.map_or(true, |o| o == rec.organisation)
            && self.hospital.map_or(true, |h| Some(h) == rec.hospital)
            && self.donar.map_or(true, |d| Some(d) == rec.donar)
    }
}

/// Which user reference of an inventory record to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryRef {
    Organisation,
    Hospital,
    Donar,
}

impl InventoryRef {
    pub fn pick(self, rec: &Inventory) -> Option<Uuid> {
        match self {
            InventoryRef::Organisation => Some(rec.organisation),
            InventoryRef::Hospital => rec.hospital,
            InventoryRef::Donar => rec.donar,
        }
    }
}

/// Every database operation the route handlers perform. One call per request
/// step; no multi-statement transactions.
#[async_trait]
pub trait BloodBankStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Newest first.
    async fn list_users_by_role(&self, role: Role) -> StoreResult<Vec<User>>;
    async fn list_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;

    async fn create_inventory(&self, record: NewInventory) -> StoreResult<Inventory>;
    /// Newest first, at most `limit` records when given.
    async fn list_inventory(
        &self,
        filter: &InventoryFilter,
        limit: Option<i64>,
    ) -> StoreResult<Vec<Inventory>>;
    async fn blood_totals(&self, organisation: Uuid, group: BloodGroup)
        -> StoreResult<BloodTotals>;
    /// Distinct non-null values of `field` over records matching `filter`.
    async fn distinct_refs(
        &self,
        filter: &InventoryFilter,
        field: InventoryRef,
    ) -> StoreResult<Vec<Uuid>>;
}
