use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::{request_tracing, state::ServerState};

use super::{eval::handler_eval, feed::handler_feed};

pub struct AppRouter;

impl AppRouter {
    /// Minimal HTTP surface: liveness plus the feed and evaluation-report endpoints
    /// (SPEC_FULL §1, §6 — no auth middleware beyond what those two endpoints need).
    pub fn create(state: ServerState) -> Router {
        Router::new()
            .route("/", get(|| async { "youtube-link-pipeline server" }))
            .route("/users/:id/feed", get(handler_feed))
            .route("/users/:id/eval", get(handler_eval))
            .layer(request_tracing::trace_with_request_id_layer())
            .layer(CorsLayer::permissive())
            .with_state(state)
            .fallback(handler_404)
    }
}

pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Route does not exist")
}
