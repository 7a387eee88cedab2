use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use harvest_types::api::Claims;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

const DEMO_TOKEN_PREFIX: &str = "demo-token-";

/// Extract and validate the bearer token, then stash [`Claims`] on the
/// request. Demo tokens are resolved against the user store instead of being
/// decoded, so a demo client can act as any seeded account.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

    let claims = if state.demo && token.starts_with(DEMO_TOKEN_PREFIX) {
        demo_claims(&state, &token[DEMO_TOKEN_PREFIX.len()..])?
    } else {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".into()))?
        .claims
    };

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn demo_claims(state: &AppState, uid: &str) -> ApiResult<Claims> {
    let id: Uuid = uid
        .parse()
        .map_err(|_| ApiError::Unauthorized("Invalid demo token".into()))?;

    let user = state
        .db
        .get_user_by_id(&id.to_string())?
        .ok_or_else(|| ApiError::Unauthorized("Unknown demo user".into()))?;

    let role = user
        .role
        .parse()
        .map_err(|_| ApiError::Unauthorized("Unknown demo user".into()))?;

    Ok(Claims {
        sub: id,
        role,
        exp: 0,
    })
}

/// Loads the authenticated user's row. 401 rather than 404: a token for a
/// deleted account is no longer valid.
pub fn current_user(
    state: &AppState,
    claims: &Claims,
) -> ApiResult<harvest_db::models::UserRow> {
    state
        .db
        .get_user_by_id(&claims.sub.to_string())?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".into()))
}
