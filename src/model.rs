use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Account type. The `donar` spelling is what existing clients send.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Organisation,
    Donar,
    Hospital,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Organisation => "organisation",
            Role::Donar => "donar",
            Role::Hospital => "hospital",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BloodGroup {
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::OPositive,
        BloodGroup::ONegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InventoryType {
    In,
    Out,
}

impl InventoryType {
    pub fn as_str(self) -> &'static str {
        match self {
            InventoryType::In => "in",
            InventoryType::Out => "out",
        }
    }
}

/// Raised when a stored enum column holds a value this build does not know.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "organisation" => Ok(Role::Organisation),
            "donar" => Ok(Role::Donar),
            "hospital" => Ok(Role::Hospital),
            other => Err(UnknownVariant { kind: "role", value: other.into() }),
        }
    }
}

impl FromStr for BloodGroup {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BloodGroup::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant { kind: "blood group", value: s.into() })
    }
}

impl FromStr for InventoryType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(InventoryType::In),
            "out" => Ok(InventoryType::Out),
            other => Err(UnknownVariant { kind: "inventory type", value: other.into() }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for InventoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account record: admins, donors, hospitals and organisations share one table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub address: String,
    pub phone: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String, // Argon2 hash, never leaves the server
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Name shown in listings: person name, else organisation or hospital name.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.organisation_name.as_deref())
            .or(self.hospital_name.as_deref())
            .unwrap_or(&self.email)
    }
}

/// Fields needed to insert a user; id and timestamps come from the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub role: Role,
    pub name: Option<String>,
    pub organisation_name: Option<String>,
    pub hospital_name: Option<String>,
    pub website: Option<String>,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
}

/// One blood-unit transaction between an organisation and a donor or hospital.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub inventory_type: InventoryType,
    pub blood_group: BloodGroup,
    pub quantity: i64, // millilitres
    pub email: String,
    pub organisation: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donar: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewInventory {
    pub inventory_type: InventoryType,
    pub blood_group: BloodGroup,
    pub quantity: i64,
    pub email: String,
    pub organisation: Uuid,
    pub hospital: Option<Uuid>,
    pub donar: Option<Uuid>,
}

/// Sums of `in` and `out` quantities for one organisation and blood group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BloodTotals {
    pub total_in: i64,
    pub total_out: i64,
}

impl BloodTotals {
    pub fn available(&self) -> i64 {
        self.total_in - self.total_out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BloodGroupSummary {
    pub blood_group: BloodGroup,
    pub total_in: i64,
    pub total_out: i64,
    pub available_blood: i64,
}

impl BloodGroupSummary {
    pub fn new(blood_group: BloodGroup, totals: BloodTotals) -> Self {
        Self {
            blood_group,
            total_in: totals.total_in,
            total_out: totals.total_out,
            available_blood: totals.available(),
        }
    }
}
