use std::collections::BTreeMap;

use axum::{Extension, Json, extract::State};

use harvest_types::api::{Claims, ReportSummaryResponse};
use harvest_types::models::Role;

use crate::error::{ApiError, ApiResult};
use crate::middleware::current_user;
use crate::AppState;

/// Platform-wide aggregates for admin dashboards.
pub async fn summary(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<ReportSummaryResponse>> {
    let user = current_user(&state, &claims)?;
    let is_admin =
        user.role == Role::MasterAdmin.as_str() || user.role == Role::OrgAdmin.as_str();
    if !is_admin {
        return Err(ApiError::Forbidden("Only admins can view reports".into()));
    }

    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.report_summary())
        .await
        .map_err(|e| ApiError::internal(anyhow::anyhow!("join error: {e}")))??;

    Ok(Json(ReportSummaryResponse {
        total_offers: row.total_offers,
        offers_by_status: row.offers_by_status.into_iter().collect::<BTreeMap<_, _>>(),
        total_pickups: row.total_pickups,
        completed_pickups: row.completed_pickups,
        quantity_offered: row.quantity_offered,
        quantity_rescued: row.quantity_rescued,
        active_restaurants: row.active_restaurants,
        active_volunteers: row.active_volunteers,
        organizations: row.organizations,
    }))
}
