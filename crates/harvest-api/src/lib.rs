pub mod auth;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod offers;
pub mod pickups;
pub mod reports;
pub mod views;
pub mod volunteers;

use std::sync::Arc;

use harvest_db::Database;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Demo mode: `demo-token-<uid>` bearer tokens are accepted in place of
    /// JWTs and the store defaults to in-memory SQLite.
    pub demo: bool,
}

pub type AppState = Arc<AppStateInner>;
