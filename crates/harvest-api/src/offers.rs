use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use harvest_db::models::OfferRow;
use harvest_types::api::{
    Claims, ClaimResponse, CreateOfferRequest, OfferListResponse, OfferTransitionResponse,
};
use harvest_types::models::{OfferStatus, PickupStatus, Role, UserStatus};

use crate::error::{ApiError, ApiResult};
use crate::middleware::current_user;
use crate::views::{offer_response, pickup_response};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OfferListQuery {
    #[serde(rename = "restaurantId")]
    pub restaurant_id: Option<Uuid>,
}

pub async fn create_offer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateOfferRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = current_user(&state, &claims)?;
    if user.role != Role::Restaurant.as_str() {
        return Err(ApiError::Forbidden("Only restaurants can post offers".into()));
    }
    if user.status != UserStatus::Active.as_str() {
        return Err(ApiError::Forbidden(
            "Complete onboarding before posting offers".into(),
        ));
    }

    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("title is required".into()));
    }
    if req.description.trim().is_empty() {
        return Err(ApiError::Validation("description is required".into()));
    }
    if req.quantity == 0 {
        return Err(ApiError::Validation(
            "quantity must be a positive number".into(),
        ));
    }

    let now = Utc::now().to_rfc3339();
    let offer = OfferRow {
        id: Uuid::new_v4().to_string(),
        restaurant_id: user.id.clone(),
        restaurant_name: user.name.clone(),
        title: req.title.trim().to_string(),
        description: req.description.trim().to_string(),
        quantity: req.quantity,
        food_type: req.food_type.clone(),
        dietary_info: serde_json::to_string(&req.dietary_info)
            .map_err(|e| ApiError::internal(anyhow::Error::new(e)))?,
        expiration_time: req.expiration_time.to_rfc3339(),
        status: OfferStatus::Open.to_string(),
        claimed_by: None,
        claimed_by_name: None,
        claimed_at: None,
        pickup_id: None,
        completed_at: None,
        cancelled_at: None,
        created_at: now.clone(),
        updated_at: now,
    };
    state.db.insert_offer(&offer)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "offer": offer_response(&offer) })),
    ))
}

/// Open offers for volunteers; a restaurant's own board with `?restaurantId=`.
pub async fn list_offers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<OfferListQuery>,
) -> ApiResult<Json<OfferListResponse>> {
    let user = current_user(&state, &claims)?;

    let rows = match query.restaurant_id {
        Some(restaurant_id) => {
            let restaurant_id = restaurant_id.to_string();
            let is_admin = user.role == Role::MasterAdmin.as_str()
                || user.role == Role::OrgAdmin.as_str();
            if user.id != restaurant_id && !is_admin {
                return Err(ApiError::Forbidden(
                    "Not authorized to view these offers".into(),
                ));
            }

            let db = state.clone();
            tokio::task::spawn_blocking(move || db.db.list_offers_by_restaurant(&restaurant_id))
                .await
                .map_err(|e| ApiError::internal(anyhow::anyhow!("join error: {e}")))??
        }
        None => {
            let db = state.clone();
            tokio::task::spawn_blocking(move || db.db.list_open_offers())
                .await
                .map_err(|e| ApiError::internal(anyhow::anyhow!("join error: {e}")))??
        }
    };

    Ok(Json(OfferListResponse {
        offers: rows.iter().map(offer_response).collect(),
    }))
}

pub async fn get_offer(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let offer = state
        .db
        .get_offer(&id.to_string())?
        .ok_or_else(|| ApiError::NotFound("Offer not found".into()))?;

    Ok(Json(serde_json::json!({ "offer": offer_response(&offer) })))
}

pub async fn claim(
    state: State<AppState>,
    claims: Extension<Claims>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<ClaimResponse>)> {
    do_claim(state, claims, id).await
}

/// Shared by `POST /food_offers/{id}/claim` and `POST /pickups/claim/{id}`.
pub(crate) async fn do_claim(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    offer_id: Uuid,
) -> ApiResult<(StatusCode, Json<ClaimResponse>)> {
    let user = current_user(&state, &claims)?;
    if user.role != Role::Volunteer.as_str() {
        return Err(ApiError::Forbidden("Only volunteers can claim offers".into()));
    }
    if user.status != UserStatus::Active.as_str() {
        return Err(ApiError::Forbidden(
            "Complete onboarding before claiming offers".into(),
        ));
    }

    let db = state.clone();
    let id = offer_id.to_string();
    let (_, pickup) =
        tokio::task::spawn_blocking(move || db.db.claim_offer(&id, &user, Utc::now()))
            .await
            .map_err(|e| ApiError::internal(anyhow::anyhow!("join error: {e}")))??;

    Ok((
        StatusCode::CREATED,
        Json(ClaimResponse {
            pickup: pickup_response(&pickup),
            message: "Offer claimed successfully! You can now message the restaurant.".into(),
        }),
    ))
}

pub async fn confirm(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OfferTransitionResponse>> {
    let user = current_user(&state, &claims)?;

    let db = state.clone();
    let id = id.to_string();
    let (offer, _) =
        tokio::task::spawn_blocking(move || db.db.confirm_offer(&id, &user.id, Utc::now()))
            .await
            .map_err(|e| ApiError::internal(anyhow::anyhow!("join error: {e}")))??;

    Ok(Json(OfferTransitionResponse {
        message: "Pickup confirmed. The volunteer has been notified.".into(),
        offer: offer_response(&offer),
    }))
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OfferTransitionResponse>> {
    let user = current_user(&state, &claims)?;

    let db = state.clone();
    let id = id.to_string();
    let (offer, _) = tokio::task::spawn_blocking(move || {
        db.db
            .release_claim(&id, &user.id, PickupStatus::Rejected, None, Utc::now())
    })
    .await
    .map_err(|e| ApiError::internal(anyhow::anyhow!("join error: {e}")))??;

    Ok(Json(OfferTransitionResponse {
        message: "Pickup declined. The offer is open again.".into(),
        offer: offer_response(&offer),
    }))
}

pub async fn complete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OfferTransitionResponse>> {
    let user = current_user(&state, &claims)?;

    let db = state.clone();
    let id = id.to_string();
    let (offer, _) =
        tokio::task::spawn_blocking(move || db.db.complete_offer(&id, &user.id, Utc::now()))
            .await
            .map_err(|e| ApiError::internal(anyhow::anyhow!("join error: {e}")))??;

    Ok(Json(OfferTransitionResponse {
        message: "Pickup completed successfully! Thank you for reducing food waste.".into(),
        offer: offer_response(&offer),
    }))
}

pub async fn cancel(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OfferTransitionResponse>> {
    let user = current_user(&state, &claims)?;

    let db = state.clone();
    let id = id.to_string();
    let offer =
        tokio::task::spawn_blocking(move || db.db.cancel_offer(&id, &user.id, Utc::now()))
            .await
            .map_err(|e| ApiError::internal(anyhow::anyhow!("join error: {e}")))??;

    Ok(Json(OfferTransitionResponse {
        message: "Offer cancelled.".into(),
        offer: offer_response(&offer),
    }))
}

/// Volunteer withdraws their claim, subject to the 24-hour cutoff.
pub async fn cancel_pickup(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OfferTransitionResponse>> {
    let user = current_user(&state, &claims)?;

    let db = state.clone();
    let id = id.to_string();
    let (offer, _) =
        tokio::task::spawn_blocking(move || db.db.withdraw_claim(&id, &user.id, Utc::now()))
            .await
            .map_err(|e| ApiError::internal(anyhow::anyhow!("join error: {e}")))??;

    Ok(Json(OfferTransitionResponse {
        message: "Pickup cancelled. The offer is now available for other volunteers.".into(),
        offer: offer_response(&offer),
    }))
}
