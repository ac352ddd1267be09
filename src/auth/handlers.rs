use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{normalize_email, LoginPayload, LoginRequest, RegisterRequest, UserPayload},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    envelope::{ApiResult, Envelope},
    error::{ApiError, JsonBody},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/current-user", get(current_user))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<Envelope<UserPayload>>), ApiError> {
    let payload = payload.normalized();
    if let Err(e) = payload.validate() {
        warn!(email = %payload.email, error = %e, "registration rejected");
        return Err(e);
    }

    if state.store.find_user_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("User already exists".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = state.store.create_user(payload.into_new_user(hash)).await?;

    info!(user_id = %user.id, role = %user.role, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("User Registered Successfully", UserPayload { user })),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<LoginPayload> {
    let email = normalize_email(&payload.email);

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(ApiError::NotFound("Invalid Credentials".into()));
    };

    if user.role != payload.role {
        warn!(user_id = %user.id, "login role mismatch");
        return Err(ApiError::Forbidden("role doesn't match".into()));
    }

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid Credentials".into()));
    }

    let token = JwtKeys::from_ref(&state).sign(user.id, user.role)?;

    info!(user_id = %user.id, role = %user.role, "user logged in");
    Ok(Json(Envelope::ok(
        "Login Successfully",
        LoginPayload { token, user },
    )))
}

#[instrument(skip(state))]
pub async fn current_user(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<UserPayload> {
    let user = state
        .store
        .find_user_by_id(caller.id)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %caller.id, "token for missing user");
            ApiError::NotFound("User not found".into())
        })?;

    Ok(Json(Envelope::ok("User Fetched Successfully", UserPayload { user })))
}
