use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    auth::AuthUser,
    envelope::{ApiResult, Envelope},
    model::{BloodGroup, BloodGroupSummary},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodGroupDataPayload {
    pub blood_group_data: Vec<BloodGroupSummary>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/bloodGroups-data", get(blood_group_details))
}

/// Per-group totals for the calling organisation, in `BloodGroup::ALL` order.
#[instrument(skip(state))]
pub async fn blood_group_details(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<BloodGroupDataPayload> {
    let mut blood_group_data = Vec::with_capacity(BloodGroup::ALL.len());
    for group in BloodGroup::ALL {
        let totals = state.store.blood_totals(caller.id, group).await?;
        blood_group_data.push(BloodGroupSummary::new(group, totals));
    }
    Ok(Json(Envelope::ok(
        "Blood Group Data Fetched Successfully",
        BloodGroupDataPayload { blood_group_data },
    )))
}
