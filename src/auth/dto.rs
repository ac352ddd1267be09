use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    model::{NewUser, Role, User},
};

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Request body for registration. Which name field is required depends on `role`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub organisation_name: Option<String>,
    #[serde(default)]
    pub hospital_name: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn normalized(self) -> Self {
        Self {
            role: self.role,
            name: non_blank(self.name),
            organisation_name: non_blank(self.organisation_name),
            hospital_name: non_blank(self.hospital_name),
            website: non_blank(self.website),
            address: self.address.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password,
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if !is_valid_email(&self.email) {
            return Err(ApiError::BadRequest("Invalid email".into()));
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::BadRequest(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let missing_name = match self.role {
            Role::Admin | Role::Donar => self.name.is_none().then_some("name"),
            Role::Organisation => self.organisation_name.is_none().then_some("organisationName"),
            Role::Hospital => self.hospital_name.is_none().then_some("hospitalName"),
        };
        if let Some(field) = missing_name {
            return Err(ApiError::BadRequest(format!(
                "{field} is required for role {}",
                self.role
            )));
        }
        if self.address.is_empty() {
            return Err(ApiError::BadRequest("address is required".into()));
        }
        if self.phone.is_empty() {
            return Err(ApiError::BadRequest("phone is required".into()));
        }
        Ok(())
    }

    pub fn into_new_user(self, password_hash: String) -> NewUser {
        NewUser {
            role: self.role,
            name: self.name,
            organisation_name: self.organisation_name,
            hospital_name: self.hospital_name,
            website: self.website,
            address: self.address,
            phone: self.phone,
            email: self.email,
            password_hash,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub role: Role,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserPayload {
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginPayload {
    pub token: String,
    pub user: User,
}
