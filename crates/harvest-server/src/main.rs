use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use harvest_api::middleware::require_auth;
use harvest_api::{AppState, AppStateInner, auth, messages, offers, pickups, reports, volunteers};
use harvest_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "harvest=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("HARVEST_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let demo = matches!(
        std::env::var("HARVEST_DEMO").as_deref(),
        Ok("1") | Ok("true")
    );
    let db_path = std::env::var("HARVEST_DB_PATH").ok();
    let host = std::env::var("HARVEST_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("HARVEST_PORT")
        .unwrap_or_else(|_| "3002".into())
        .parse()?;

    // Init database. Demo mode without an explicit path stays in memory.
    let db = match (&db_path, demo) {
        (Some(path), _) => Database::open(&PathBuf::from(path))?,
        (None, true) => Database::open_in_memory()?,
        (None, false) => Database::open(&PathBuf::from("harvest.db"))?,
    };

    if demo {
        info!("Demo mode enabled: demo-token-<uid> bearer tokens are accepted");
    }

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        demo,
    });

    // Routes
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/admin-exists", get(auth::admin_exists))
        .route("/auth/master-admin/register", post(auth::register_master_admin))
        .route("/auth/master-admin/login", post(auth::master_admin_login))
        .route("/auth/admin/login", post(auth::admin_login))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/master-admin/create-org-admin", post(auth::create_org_admin))
        .route("/auth/master-admin/create-restaurant", post(auth::create_restaurant))
        .route("/auth/master-admin/users", get(auth::master_admin_users))
        .route("/auth/org-admin/create-volunteer", post(auth::create_volunteer))
        .route("/auth/org-admin/volunteers", get(auth::org_volunteers))
        .route("/auth/complete-onboarding", post(auth::complete_onboarding))
        .route("/auth/me", get(auth::me))
        .route("/auth/change-password", post(auth::change_password))
        .route("/auth/suspend-user", post(auth::suspend_user))
        .route("/auth/unsuspend-user", post(auth::unsuspend_user))
        .route("/auth/delete-user/{user_id}", delete(auth::delete_user))
        .route("/food_offers", post(offers::create_offer))
        .route("/food_offers", get(offers::list_offers))
        .route("/food_offers/{id}", get(offers::get_offer))
        .route("/food_offers/{id}/claim", post(offers::claim))
        .route("/food_offers/{id}/confirm", post(offers::confirm))
        .route("/food_offers/{id}/reject", post(offers::reject))
        .route("/food_offers/{id}/complete", post(offers::complete))
        .route("/food_offers/{id}/cancel", post(offers::cancel))
        .route("/food_offers/{id}/cancel_pickup", post(offers::cancel_pickup))
        .route("/pickups/claim/{offer_id}", post(pickups::claim))
        .route("/pickups/{pickup_id}", get(pickups::get_pickup))
        .route("/pickups/{pickup_id}/complete", post(pickups::complete))
        .route("/pickups/{pickup_id}/cancel", post(pickups::cancel))
        .route("/messages/conversation/{pickup_id}", get(messages::conversation))
        .route("/messages/send", post(messages::send))
        .route("/volunteers/available-count", get(volunteers::available_count))
        .route("/reports/summary", get(reports::summary))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Harvest server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "Harvest Food Rescue API",
        "status": "ok",
        "health": "/health",
        "demo": state.demo,
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "demo": state.demo,
    }))
}
