use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;

pub use extractors::{AdminUser, AuthUser};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
