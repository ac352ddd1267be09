use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{
    CreateInventoryRequest, DonarsPayload, FilterRequest, HospitalsPayload, InventoryPayload,
    OrganisationsPayload, RecordPayload,
};
use crate::{
    auth::{dto::normalize_email, AuthUser},
    db::{InventoryFilter, InventoryRef, StoreResult},
    envelope::{ApiResult, Envelope},
    error::{ApiError, JsonBody},
    model::{InventoryType, NewInventory, Role, User},
    state::AppState,
};

const RECENT_LIMIT: i64 = 3;
/// Largest quantity (ML) a single record may carry.
pub const MAX_QUANTITY: i64 = 1_000_000;

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/create-inventory", post(create_inventory))
        .route("/get-inventory", get(get_inventory))
        .route("/get-inventory-hospital", post(get_inventory_filtered))
        .route("/get-recent-inventory", get(get_recent_inventory))
        .route("/get-donars", get(get_donars))
        .route("/get-hospitals", get(get_hospitals))
        .route("/get-organisation", get(get_organisations_for_donar))
        .route("/get-organisation-for-hospital", get(get_organisations_for_hospital))
}

/// Users referenced by `field` on the records matching `filter`.
async fn referenced_users(
    state: &AppState,
    filter: &InventoryFilter,
    field: InventoryRef,
) -> StoreResult<Vec<User>> {
    let ids = state.store.distinct_refs(filter, field).await?;
    state.store.list_users_by_ids(&ids).await
}

#[instrument(skip(state, payload), fields(organisation = %caller.id))]
pub async fn create_inventory(
    State(state): State<AppState>,
    caller: AuthUser,
    JsonBody(payload): JsonBody<CreateInventoryRequest>,
) -> Result<(StatusCode, Json<Envelope<RecordPayload>>), ApiError> {
    if caller.role != Role::Organisation {
        return Err(ApiError::Forbidden(
            "Only organisations can record inventory".into(),
        ));
    }
    if payload.quantity <= 0 {
        return Err(ApiError::BadRequest("Quantity must be greater than zero".into()));
    }
    if payload.quantity > MAX_QUANTITY {
        return Err(ApiError::BadRequest(format!(
            "Quantity must not exceed {MAX_QUANTITY}ML"
        )));
    }

    let email = normalize_email(&payload.email);
    let counterparty = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User Not Found".into()))?;

    let (donar, hospital) = match payload.inventory_type {
        InventoryType::In => {
            if counterparty.role != Role::Donar {
                warn!(%email, role = %counterparty.role, "in-record for non-donor");
                return Err(ApiError::BadRequest("Not a donar account".into()));
            }
            (Some(counterparty.id), None)
        }
        InventoryType::Out => {
            if counterparty.role != Role::Hospital {
                warn!(%email, role = %counterparty.role, "out-record for non-hospital");
                return Err(ApiError::BadRequest("Not a hospital account".into()));
            }
            let available = state
                .store
                .blood_totals(caller.id, payload.blood_group)
                .await?
                .available();
            if available < payload.quantity {
                warn!(
                    blood_group = %payload.blood_group,
                    requested = payload.quantity,
                    available,
                    "insufficient stock"
                );
                return Err(ApiError::BadRequest(format!(
                    "Only {available}ML of {} is available",
                    payload.blood_group
                )));
            }
            (None, Some(counterparty.id))
        }
    };

    let inventory = state
        .store
        .create_inventory(NewInventory {
            inventory_type: payload.inventory_type,
            blood_group: payload.blood_group,
            quantity: payload.quantity,
            email,
            organisation: caller.id,
            hospital,
            donar,
        })
        .await?;

    info!(
        inventory_id = %inventory.id,
        kind = %inventory.inventory_type,
        blood_group = %inventory.blood_group,
        quantity = inventory.quantity,
        "inventory recorded"
    );
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("New Blood Record Added", RecordPayload { inventory })),
    ))
}

#[instrument(skip(state))]
pub async fn get_inventory(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<InventoryPayload> {
    let inventory = state
        .store
        .list_inventory(&InventoryFilter::organisation(caller.id), None)
        .await?;
    Ok(Json(Envelope::ok(
        "get all records successfully",
        InventoryPayload { inventory },
    )))
}

/// Pins the caller's own reference into `filter`; admins see everything.
fn scope_to_caller(mut filter: InventoryFilter, caller: &AuthUser) -> InventoryFilter {
    match caller.role {
        Role::Organisation => filter.organisation = Some(caller.id),
        Role::Hospital => filter.hospital = Some(caller.id),
        Role::Donar => filter.donar = Some(caller.id),
        Role::Admin => {}
    }
    filter
}

#[instrument(skip(state, payload))]
pub async fn get_inventory_filtered(
    State(state): State<AppState>,
    caller: AuthUser,
    JsonBody(payload): JsonBody<FilterRequest>,
) -> ApiResult<InventoryPayload> {
    let filter = scope_to_caller(payload.filters, &caller);
    let inventory = state.store.list_inventory(&filter, None).await?;
    Ok(Json(Envelope::ok(
        "get hospital consumer records successfully",
        InventoryPayload { inventory },
    )))
}

#[instrument(skip(state))]
pub async fn get_recent_inventory(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<InventoryPayload> {
    let inventory = state
        .store
        .list_inventory(&InventoryFilter::organisation(caller.id), Some(RECENT_LIMIT))
        .await?;
    Ok(Json(Envelope::ok(
        "recent Inventory Data",
        InventoryPayload { inventory },
    )))
}

#[instrument(skip(state))]
pub async fn get_donars(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<DonarsPayload> {
    let donars = referenced_users(
        &state,
        &InventoryFilter::organisation(caller.id),
        InventoryRef::Donar,
    )
    .await?;
    Ok(Json(Envelope::ok(
        "Donar Record Fetched Successfully",
        DonarsPayload { donars },
    )))
}

#[instrument(skip(state))]
pub async fn get_hospitals(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<HospitalsPayload> {
    let hospitals = referenced_users(
        &state,
        &InventoryFilter::organisation(caller.id),
        InventoryRef::Hospital,
    )
    .await?;
    Ok(Json(Envelope::ok(
        "Hospitals Data Fetched Successfully",
        HospitalsPayload { hospitals },
    )))
}

#[instrument(skip(state))]
pub async fn get_organisations_for_donar(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<OrganisationsPayload> {
    let filter = InventoryFilter {
        donar: Some(caller.id),
        ..InventoryFilter::default()
    };
    let organisations = referenced_users(&state, &filter, InventoryRef::Organisation).await?;
    Ok(Json(Envelope::ok(
        "Org Data Fetched Successfully",
        OrganisationsPayload { organisations },
    )))
}

#[instrument(skip(state))]
pub async fn get_organisations_for_hospital(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<OrganisationsPayload> {
    let filter = InventoryFilter {
        hospital: Some(caller.id),
        ..InventoryFilter::default()
    };
    let organisations = referenced_users(&state, &filter, InventoryRef::Organisation).await?;
    Ok(Json(Envelope::ok(
        "Hospital Org Data Fetched Successfully",
        OrganisationsPayload { organisations },
    )))
}
