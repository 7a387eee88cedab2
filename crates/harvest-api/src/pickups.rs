use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use harvest_db::models::{PickupRow, UserRow};
use harvest_types::api::{
    CancelPickupRequest, Claims, ClaimResponse, PickupDetailResponse, PickupTransitionResponse,
};
use harvest_types::models::{PickupStatus, Role};

use crate::error::{ApiError, ApiResult};
use crate::middleware::current_user;
use crate::views::{pickup_detail, pickup_response};
use crate::AppState;

pub async fn claim(
    state: State<AppState>,
    claims: Extension<Claims>,
    Path(offer_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<ClaimResponse>)> {
    crate::offers::do_claim(state, claims, offer_id).await
}

/// Pickup detail, enriched with the offer and both parties for the
/// conversation header.
pub async fn get_pickup(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PickupDetailResponse>> {
    let user = current_user(&state, &claims)?;
    let pickup = find_pickup(&state, id)?;
    require_participant(&user, &pickup, "Not authorized to view this pickup")?;

    let offer = state.db.get_offer(&pickup.food_offer_id)?;
    let restaurant = state.db.get_user_by_id(&pickup.restaurant_id)?;
    let volunteer = state.db.get_user_by_id(&pickup.volunteer_id)?;

    Ok(Json(PickupDetailResponse {
        pickup: pickup_detail(
            &pickup,
            offer.as_ref(),
            restaurant.as_ref(),
            volunteer.as_ref(),
        ),
    }))
}

pub async fn complete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PickupTransitionResponse>> {
    let user = current_user(&state, &claims)?;
    let pickup = find_pickup(&state, id)?;

    let db = state.clone();
    let offer_id = pickup.food_offer_id.clone();
    let (_, updated) =
        tokio::task::spawn_blocking(move || db.db.complete_offer(&offer_id, &user.id, Utc::now()))
            .await
            .map_err(|e| ApiError::internal(anyhow::anyhow!("join error: {e}")))??;

    Ok(Json(PickupTransitionResponse {
        message: "Pickup completed successfully! Thank you for reducing food waste.".into(),
        pickup: pickup_response(updated.as_ref().unwrap_or(&pickup)),
    }))
}

/// Restaurant releases the claim with an optional reason; the offer goes back
/// on the board.
pub async fn cancel(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<CancelPickupRequest>,
) -> ApiResult<Json<PickupTransitionResponse>> {
    let user = current_user(&state, &claims)?;
    if user.role != Role::Restaurant.as_str() {
        return Err(ApiError::Forbidden("Only restaurants can cancel pickups".into()));
    }

    let pickup = find_pickup(&state, id)?;
    let reason = req
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or("Cancelled by restaurant")
        .to_string();

    let db = state.clone();
    let offer_id = pickup.food_offer_id.clone();
    let (_, updated) = tokio::task::spawn_blocking(move || {
        db.db.release_claim(
            &offer_id,
            &user.id,
            PickupStatus::Cancelled,
            Some(&reason),
            Utc::now(),
        )
    })
    .await
    .map_err(|e| ApiError::internal(anyhow::anyhow!("join error: {e}")))??;

    Ok(Json(PickupTransitionResponse {
        message: "Pickup cancelled. The offer is now available for other volunteers.".into(),
        pickup: pickup_response(updated.as_ref().unwrap_or(&pickup)),
    }))
}

fn find_pickup(state: &AppState, id: Uuid) -> ApiResult<PickupRow> {
    state
        .db
        .get_pickup(&id.to_string())?
        .ok_or_else(|| ApiError::NotFound("Pickup not found".into()))
}

pub(crate) fn require_participant(
    user: &UserRow,
    pickup: &PickupRow,
    message: &str,
) -> ApiResult<()> {
    let is_admin =
        user.role == Role::MasterAdmin.as_str() || user.role == Role::OrgAdmin.as_str();
    if user.id != pickup.restaurant_id && user.id != pickup.volunteer_id && !is_admin {
        return Err(ApiError::Forbidden(message.into()));
    }
    Ok(())
}
