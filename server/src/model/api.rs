use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db_core::prelude::Classification;

/// Response shape for `GET /users/:id/feed` — latest Ranking per Link, joined with
/// VideoMetadata (SPEC_FULL §6 HTTP surface).
#[derive(Debug, Serialize)]
pub struct FeedItem {
    pub link_id: Uuid,
    pub video_id: String,
    pub canonical_url: String,
    pub title: String,
    pub channel_title: String,
    pub final_score: f64,
    pub classification: Classification,
    pub explanation: String,
    pub topic_tags: Vec<String>,
    pub ranked_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub items: Vec<FeedItem>,
}

/// Response shape for `GET /users/:id/eval` (SPEC_FULL §4.7).
#[derive(Debug, Serialize)]
pub struct EvalReport {
    pub precision_at_k: Vec<PrecisionAtK>,
    pub coverage: f64,
    pub novelty: f64,
    pub stability: f64,
}

#[derive(Debug, Serialize)]
pub struct PrecisionAtK {
    pub k: usize,
    pub precision: f64,
}
