use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use harvest_db::models::MessageRow;
use harvest_types::api::{
    Claims, ConversationResponse, SendMessageRequest, SentMessageResponse,
};
use harvest_types::models::MessageKind;

use crate::error::{ApiError, ApiResult};
use crate::middleware::current_user;
use crate::pickups::require_participant;
use crate::views::{message_response, pickup_response};
use crate::AppState;

/// Full conversation for a pickup, plus the pickup itself so clients can
/// refresh its status on the same poll.
pub async fn conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(pickup_id): Path<Uuid>,
) -> ApiResult<Json<ConversationResponse>> {
    let user = current_user(&state, &claims)?;
    let pickup = state
        .db
        .get_pickup(&pickup_id.to_string())?
        .ok_or_else(|| ApiError::NotFound("Pickup not found".into()))?;
    require_participant(&user, &pickup, "Not authorized to view this conversation")?;

    let db = state.clone();
    let id = pickup.id.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.messages_for_pickup(&id))
        .await
        .map_err(|e| ApiError::internal(anyhow::anyhow!("join error: {e}")))??;

    Ok(Json(ConversationResponse {
        messages: rows.iter().map(message_response).collect(),
        pickup: pickup_response(&pickup),
    }))
}

pub async fn send(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::Validation("Message content is required".into()));
    }

    let user = current_user(&state, &claims)?;
    let pickup = state
        .db
        .get_pickup(&req.pickup_id.to_string())?
        .ok_or_else(|| ApiError::NotFound("Pickup not found".into()))?;

    // Admins may read conversations but only the parties speak in them.
    if user.id != pickup.restaurant_id && user.id != pickup.volunteer_id {
        return Err(ApiError::Forbidden(
            "Only the restaurant and volunteer can message in this pickup".into(),
        ));
    }

    let message = MessageRow {
        id: Uuid::new_v4().to_string(),
        pickup_id: pickup.id.clone(),
        sender_id: Some(user.id.clone()),
        sender_name: Some(user.name.clone()),
        kind: MessageKind::Text.to_string(),
        content: content.to_string(),
        created_at: Utc::now().to_rfc3339(),
    };
    state.db.insert_message(&message)?;

    Ok((
        StatusCode::CREATED,
        Json(SentMessageResponse {
            message: message_response(&message),
        }),
    ))
}
