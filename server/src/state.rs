use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{enrichment::YouTubeClient, inbox_sync::InboxCredentials, kv::KvStore};

/// Composition root: every handler and worker is constructed once at startup with a clone of
/// this (teacher's single `ServerState` struct threaded through `axum::extract::State`).
/// The YouTube rate limiter is owned by `youtube_client` alone — nothing else in the pipeline
/// rate-limits against the shared store, so it isn't duplicated here.
#[derive(Clone)]
pub struct ServerState {
    pub conn: DatabaseConnection,
    pub http_client: reqwest::Client,
    pub kv: Arc<dyn KvStore>,
    pub youtube_client: Arc<YouTubeClient>,
    pub inbox_credentials: Arc<dyn InboxCredentials>,
}
