//! In-process store used by handler and client tests.

use std::sync::RwLock;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{BloodBankStore, InventoryFilter, InventoryRef, StoreError, StoreResult};
use crate::model::{
    BloodGroup, BloodTotals, Inventory, InventoryType, NewInventory, NewUser, Role, User,
};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    inventory: RwLock<Vec<Inventory>>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Other(anyhow::anyhow!("memory store lock poisoned"))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BloodBankStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().map_err(poisoned)?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate);
        }
        let now = OffsetDateTime::now_utc();
        let created = User {
            id: Uuid::new_v4(),
            role: user.role,
            name: user.name,
            organisation_name: user.organisation_name,
            hospital_name: user.hospital_name,
            website: user.website,
            address: user.address,
            phone: user.phone,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_users_by_role(&self, role: Role) -> StoreResult<Vec<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.iter().rev().filter(|u| u.role == role).cloned().collect())
    }

    async fn list_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.iter().rev().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut users = self.users.write().map_err(poisoned)?;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }

    async fn create_inventory(&self, record: NewInventory) -> StoreResult<Inventory> {
        let now = OffsetDateTime::now_utc();
        let created = Inventory {
            id: Uuid::new_v4(),
            inventory_type: record.inventory_type,
            blood_group: record.blood_group,
            quantity: record.quantity,
            email: record.email,
            organisation: record.organisation,
            hospital: record.hospital,
            donar: record.donar,
            created_at: now,
            updated_at: now,
        };
        self.inventory.write().map_err(poisoned)?.push(created.clone());
        Ok(created)
    }

    async fn list_inventory(
        &self,
        filter: &InventoryFilter,
        limit: Option<i64>,
    ) -> StoreResult<Vec<Inventory>> {
        let records = self.inventory.read().map_err(poisoned)?;
        let limit = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(0));
        Ok(records
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn blood_totals(
        &self,
        organisation: Uuid,
        group: BloodGroup,
    ) -> StoreResult<BloodTotals> {
        let records = self.inventory.read().map_err(poisoned)?;
        let mut totals = BloodTotals::default();
        for r in records
            .iter()
            .filter(|r| r.organisation == organisation && r.blood_group == group)
        {
            let slot = match r.inventory_type {
                InventoryType::In => &mut totals.total_in,
                InventoryType::Out => &mut totals.total_out,
            };
            *slot = slot
                .checked_add(r.quantity)
                .ok_or_else(|| StoreError::Other(anyhow::anyhow!("blood total overflows i64")))?;
        }
        Ok(totals)
    }

    async fn distinct_refs(
        &self,
        filter: &InventoryFilter,
        field: InventoryRef,
    ) -> StoreResult<Vec<Uuid>> {
        let records = self.inventory.read().map_err(poisoned)?;
        let mut ids: Vec<Uuid> = Vec::new();
        for id in records.iter().filter(|r| filter.matches(r)).filter_map(|r| field.pick(r)) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donation(organisation: Uuid, quantity: i64) -> NewInventory {
        NewInventory {
            inventory_type: InventoryType::In,
            blood_group: BloodGroup::APositive,
            quantity,
            email: "donor@example.com".into(),
            organisation,
            hospital: None,
            donar: None,
        }
    }

    #[tokio::test]
    async fn overflowing_totals_are_an_error() {
        let store = MemoryStore::new();
        let org = Uuid::new_v4();
        store.create_inventory(donation(org, i64::MAX)).await.unwrap();
        store.create_inventory(donation(org, i64::MAX)).await.unwrap();

        let res = store.blood_totals(org, BloodGroup::APositive).await;
        assert!(matches!(res, Err(StoreError::Other(_))));
    }
}
