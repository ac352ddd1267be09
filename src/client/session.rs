use std::io;

use thiserror::Error;
use tracing::info;

use super::{ApiClient, ClientError, TokenStore};
use crate::{auth::dto::LoginRequest, model::User};

#[derive(Debug, Error)]
pub enum SignInError {
    #[error(transparent)]
    Api(#[from] ClientError),

    #[error("could not save session: {0}")]
    Save(#[from] io::Error),
}

/// Logs in and persists the returned token. The store is untouched when
/// the login fails.
pub async fn sign_in(
    client: &ApiClient,
    store: &dyn TokenStore,
    request: &LoginRequest,
) -> Result<User, SignInError> {
    let payload = client.login(request).await?;
    store.save(&payload.token)?;
    info!(user_id = %payload.user.id, role = %payload.user.role, "session saved");
    Ok(payload.user)
}
