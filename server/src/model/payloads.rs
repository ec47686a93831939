use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tagged sum type for everything that flows through `job_tracking.payload`
/// (SPEC_FULL §9 "dynamic JSON blobs for queue payloads").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum JobPayload {
    EmailProcess {
        user_id: Uuid,
        message_id: String,
    },
    Enrich {
        video_ids: Vec<String>,
    },
    RankCompute {
        user_id: Uuid,
        link_id: Uuid,
    },
}

impl JobPayload {
    pub fn queue_name(&self) -> &'static str {
        match self {
            JobPayload::EmailProcess { .. } => "email_process",
            JobPayload::Enrich { .. } => "enrich",
            JobPayload::RankCompute { .. } => "rank_compute",
        }
    }
}
