use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use crate::state::AppState;
use super::handlers::{api_fetch, auto_refresh, health, index, keep_alive, ping, status};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/fetch", get(api_fetch))
        .route("/health", get(health))
        .route("/ping", get(ping))
        .route("/keep-alive", get(keep_alive))
        .route("/status", get(status))
        .route("/auto-refresh", get(auto_refresh))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
