// Library exports for civic-server
// The seed binary and integration tests build on these modules

pub mod api;
pub mod config;
pub mod db;
pub mod password;
pub mod seed;
pub mod session;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};

use state::AppState;

/// Build the API router without transport layers
pub fn app(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication routes
        .route("/auth/login", post(api::auth::login))
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/validate", get(api::auth::validate_session))
        // Reference data
        .route("/regions", get(api::reference::list_regions))
        .route("/offices", get(api::reference::list_offices))
        // Votes
        .route(
            "/votes/:kind/:id",
            get(api::votes::get_tally).post(api::votes::cast_vote),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
