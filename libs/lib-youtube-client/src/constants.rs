use serde::{Deserialize, Serialize};

pub const YOUTUBE_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3";

/// Maximum number of video ids the `videos.list` endpoint accepts per call.
pub const MAX_IDS_PER_BATCH: usize = 50;

/// Cost in quota units for a single `videos.list` call requesting
/// `snippet,contentDetails,statistics`, per the published cost table.
pub const VIDEOS_LIST_QUOTA: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaCosts {
    pub videos_list: u32,
}

impl Default for QuotaCosts {
    fn default() -> Self {
        Self {
            videos_list: VIDEOS_LIST_QUOTA,
        }
    }
}

pub const VIDEO_ID_LEN: usize = 11;
