use anyhow::Context;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{BloodBankStore, InventoryFilter, InventoryRef, StoreError, StoreResult};
use crate::model::{
    BloodGroup, BloodTotals, Inventory, InventoryType, NewInventory, NewUser, Role, User,
};

const USER_COLUMNS: &str = "id, role, name, organisation_name, hospital_name, website, \
     address, phone, email, password_hash, created_at, updated_at";

const INVENTORY_COLUMNS: &str = "id, inventory_type, blood_group, quantity, email, \
     organisation, hospital, donar, created_at, updated_at";

/// `users` row; enum columns are TEXT and parsed on the way out.
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    role: String,
    name: Option<String>,
    organisation_name: Option<String>,
    hospital_name: Option<String>,
    website: Option<String>,
    address: String,
    phone: String,
    email: String,
    password_hash: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            role: r.role.parse::<Role>().context("users.role")?,
            name: r.name,
            organisation_name: r.organisation_name,
            hospital_name: r.hospital_name,
            website: r.website,
            address: r.address,
            phone: r.phone,
            email: r.email,
            password_hash: r.password_hash,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct InventoryRow {
    id: Uuid,
    inventory_type: String,
    blood_group: String,
    quantity: i64,
    email: String,
    organisation: Uuid,
    hospital: Option<Uuid>,
    donar: Option<Uuid>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<InventoryRow> for Inventory {
    type Error = StoreError;

    fn try_from(r: InventoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            inventory_type: r
                .inventory_type
                .parse::<InventoryType>()
                .context("inventories.inventory_type")?,
            blood_group: r
                .blood_group
                .parse::<BloodGroup>()
                .context("inventories.blood_group")?,
            quantity: r.quantity,
            email: r.email,
            organisation: r.organisation,
            hospital: r.hospital,
            donar: r.donar,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

fn map_sqlx(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StoreError::Duplicate;
        }
    }
    StoreError::Other(e.into())
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BloodBankStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, role, name, organisation_name, hospital_name, website,
                               address, phone, email, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user.role.as_str())
        .bind(user.name)
        .bind(user.organisation_name)
        .bind(user.hospital_name)
        .bind(user.website)
        .bind(user.address)
        .bind(user.phone)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx)?;
        row.try_into()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(map_sqlx)?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(map_sqlx)?;
        row.map(User::try_from).transpose()
    }

    async fn list_users_by_role(&self, role: Role) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at DESC"
        ))
        .bind(role.as_str())
        .fetch_all(&self.db)
        .await
        .map_err(map_sqlx)?;
        convert_all(rows)
    }

    async fn list_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1) ORDER BY created_at DESC"
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.db)
        .await
        .map_err(map_sqlx)?;
        convert_all(rows)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(map_sqlx)?;
        Ok(res.rows_affected() > 0)
    }

    async fn create_inventory(&self, record: NewInventory) -> StoreResult<Inventory> {
        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            r#"
            INSERT INTO inventories (id, inventory_type, blood_group, quantity, email,
                                     organisation, hospital, donar)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {INVENTORY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(record.inventory_type.as_str())
        .bind(record.blood_group.as_str())
        .bind(record.quantity)
        .bind(record.email)
        .bind(record.organisation)
        .bind(record.hospital)
        .bind(record.donar)
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx)?;
        row.try_into()
    }

    async fn list_inventory(
        &self,
        filter: &InventoryFilter,
        limit: Option<i64>,
    ) -> StoreResult<Vec<Inventory>> {
        let rows = sqlx::query_as::<_, InventoryRow>(&format!(
            r#"
            SELECT {INVENTORY_COLUMNS}
            FROM inventories
            WHERE ($1::text IS NULL OR inventory_type = $1)
              AND ($2::text IS NULL OR blood_group = $2)
              AND ($3::uuid IS NULL OR organisation = $3)
              AND ($4::uuid IS NULL OR hospital = $4)
              AND ($5::uuid IS NULL OR donar = $5)
            ORDER BY created_at DESC
            LIMIT $6
            "#
        ))
        .bind(filter.inventory_type.map(|t| t.as_str()))
        .bind(filter.blood_group.map(|g| g.as_str()))
        .bind(filter.organisation)
        .bind(filter.hospital)
        .bind(filter.donar)
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .map_err(map_sqlx)?;
        convert_all(rows)
    }

    async fn blood_totals(
        &self,
        organisation: Uuid,
        group: BloodGroup,
    ) -> StoreResult<BloodTotals> {
        let (total_in, total_out) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COALESCE(SUM(quantity) FILTER (WHERE inventory_type = 'in'), 0)::BIGINT,
                   COALESCE(SUM(quantity) FILTER (WHERE inventory_type = 'out'), 0)::BIGINT
            FROM inventories
            WHERE organisation = $1 AND blood_group = $2
            "#,
        )
        .bind(organisation)
        .bind(group.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(map_sqlx)?;
        Ok(BloodTotals { total_in, total_out })
    }

    async fn distinct_refs(
        &self,
        filter: &InventoryFilter,
        field: InventoryRef,
    ) -> StoreResult<Vec<Uuid>> {
        let column = match field {
            InventoryRef::Organisation => "organisation",
            InventoryRef::Hospital => "hospital",
            InventoryRef::Donar => "donar",
        };
        let ids = sqlx::query_scalar::<_, Uuid>(&format!(
            r#"
            SELECT DISTINCT {column}
            FROM inventories
            WHERE {column} IS NOT NULL
              AND ($1::text IS NULL OR inventory_type = $1)
              AND ($2::text IS NULL OR blood_group = $2)
              AND ($3::uuid IS NULL OR organisation = $3)
              AND ($4::uuid IS NULL OR hospital = $4)
              AND ($5::uuid IS NULL OR donar = $5)
            "#
        ))
        .bind(filter.inventory_type.map(|t| t.as_str()))
        .bind(filter.blood_group.map(|g| g.as_str()))
        .bind(filter.organisation)
        .bind(filter.hospital)
        .bind(filter.donar)
        .fetch_all(&self.db)
        .await
        .map_err(map_sqlx)?;
        Ok(ids)
    }
}
