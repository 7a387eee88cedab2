use axum::{Extension, Json, extract::State};

use harvest_types::api::{AvailableCountResponse, Claims};

use crate::error::ApiResult;
use crate::AppState;

/// How many volunteers could pick an offer up right now. Shown on the
/// restaurant dashboard.
pub async fn available_count(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> ApiResult<Json<AvailableCountResponse>> {
    let count = state.db.count_active_volunteers()?;
    Ok(Json(AvailableCountResponse { count }))
}
