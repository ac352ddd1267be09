use axum::{
    extract::State,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::AdminUser,
    envelope::{ApiResult, Envelope, NoData},
    error::{ApiError, PathParam},
    model::{Role, User},
    state::AppState,
};

/// Admin listing: `{ TotalCount, <key>: [...] }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DonarListPayload {
    #[serde(rename = "TotalCount")]
    pub total_count: usize,
    #[serde(rename = "donarData")]
    pub donar_data: Vec<User>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HospitalListPayload {
    #[serde(rename = "TotalCount")]
    pub total_count: usize,
    #[serde(rename = "hospitalData")]
    pub hospital_data: Vec<User>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrgListPayload {
    #[serde(rename = "TotalCount")]
    pub total_count: usize,
    #[serde(rename = "orgData")]
    pub org_data: Vec<User>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/donar-list", get(donar_list))
        .route("/hospital-list", get(hospital_list))
        .route("/org-list", get(org_list))
        .route("/delete-donar/:id", delete(delete_donar))
}

#[instrument(skip(state))]
pub async fn donar_list(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<DonarListPayload> {
    let donar_data = state.store.list_users_by_role(Role::Donar).await?;
    Ok(Json(Envelope::ok(
        "Donar List Fetched Successfully",
        DonarListPayload {
            total_count: donar_data.len(),
            donar_data,
        },
    )))
}

#[instrument(skip(state))]
pub async fn hospital_list(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<HospitalListPayload> {
    let hospital_data = state.store.list_users_by_role(Role::Hospital).await?;
    Ok(Json(Envelope::ok(
        "Hospital List Fetched Successfully",
        HospitalListPayload {
            total_count: hospital_data.len(),
            hospital_data,
        },
    )))
}

#[instrument(skip(state))]
pub async fn org_list(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<OrgListPayload> {
    let org_data = state.store.list_users_by_role(Role::Organisation).await?;
    Ok(Json(Envelope::ok(
        "Org List Fetched Successfully",
        OrgListPayload {
            total_count: org_data.len(),
            org_data,
        },
    )))
}

/// Deletes a donor account. Inventory rows keep their history with the
/// donor reference cleared.
#[instrument(skip(state))]
pub async fn delete_donar(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<NoData> {
    match state.store.find_user_by_id(id).await? {
        None => return Err(ApiError::NotFound("Record not found".into())),
        Some(user) if user.role != Role::Donar => {
            warn!(%admin_id, user_id = %id, role = %user.role, "refused non-donor delete");
            return Err(ApiError::BadRequest("Only donar accounts can be deleted".into()));
        }
        Some(_) => {}
    }
    if !state.store.delete_user(id).await? {
        return Err(ApiError::NotFound("Record not found".into()));
    }
    info!(%admin_id, user_id = %id, "user deleted");
    Ok(Json(Envelope::message("Record Deleted successfully")))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::model::Role;
    use crate::test_support::{bearer, call, seed_user, test_app};

    #[tokio::test]
    async fn lists_users_by_role_newest_first() {
        let (app, state) = test_app();
        let admin = seed_user(&state, Role::Admin, "root@example.com").await;
        seed_user(&state, Role::Donar, "first@example.com").await;
        seed_user(&state, Role::Donar, "second@example.com").await;
        seed_user(&state, Role::Hospital, "er@example.com").await;
        let token = bearer(&state, &admin);

        let (status, body) =
            call(&app, Method::GET, "/api/v1/admin/donar-list", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["TotalCount"], 2);
        assert_eq!(body["donarData"][0]["email"], "second@example.com");

        let (_, body) =
            call(&app, Method::GET, "/api/v1/admin/hospital-list", Some(&token), None).await;
        assert_eq!(body["TotalCount"], 1);

        let (_, body) =
            call(&app, Method::GET, "/api/v1/admin/org-list", Some(&token), None).await;
        assert_eq!(body["orgData"], json!([]));
    }

    #[tokio::test]
    async fn non_admins_are_refused() {
        let (app, state) = test_app();
        let donor = seed_user(&state, Role::Donar, "donor@example.com").await;
        let token = bearer(&state, &donor);

        let (status, body) =
            call(&app, Method::GET, "/api/v1/admin/donar-list", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn delete_user_then_missing() {
        let (app, state) = test_app();
        let admin = seed_user(&state, Role::Admin, "root@example.com").await;
        let donor = seed_user(&state, Role::Donar, "donor@example.com").await;
        let token = bearer(&state, &admin);
        let uri = format!("/api/v1/admin/delete-donar/{}", donor.id);

        let (status, body) = call(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Record Deleted successfully");
        assert!(state.store.find_user_by_id(donor.id).await.unwrap().is_none());

        let (status, _) = call(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_refuses_non_donor_accounts() {
        let (app, state) = test_app();
        let admin = seed_user(&state, Role::Admin, "root@example.com").await;
        let org = seed_user(&state, Role::Organisation, "org@example.com").await;
        let token = bearer(&state, &admin);

        for id in [org.id, admin.id] {
            let uri = format!("/api/v1/admin/delete-donar/{id}");
            let (status, body) = call(&app, Method::DELETE, &uri, Some(&token), None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "Only donar accounts can be deleted");
            assert!(state.store.find_user_by_id(id).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn malformed_id_gets_envelope() {
        let (app, state) = test_app();
        let admin = seed_user(&state, Role::Admin, "root@example.com").await;
        let token = bearer(&state, &admin);

        let (status, body) = call(
            &app,
            Method::DELETE,
            "/api/v1/admin/delete-donar/not-a-uuid",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    }
}
