use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use lib_youtube_client::constants::{MAX_IDS_PER_BATCH, YOUTUBE_ENDPOINT};
use serde::{Deserialize, Serialize};

use crate::{
    circuit_breaker::CircuitBreaker,
    error::{AppError, AppResult},
    kv::KvStore,
    model::ctrl::video_metadata_ctrl::VideoMetadataCtrl,
    rate_limiters::RateLimiters,
    server_config::cfg,
};

use super::duration::parse_iso8601_duration;

#[derive(Debug, Clone)]
pub struct VideoMetadataRecord {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_title: String,
    pub published_at: DateTime<Utc>,
    pub duration_seconds: i32,
    pub category: Option<String>,
    pub description_keywords: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub view_count: i64,
    pub like_count: i64,
}

/// On-disk shape for the `video:metadata:{id}` cache entry. `published_at` is kept as an ISO
/// string so the cache stays a plain JSON blob readers must rehydrate (SPEC_FULL §4.3 step 5).
#[derive(Debug, Serialize, Deserialize)]
struct CachedVideoMetadata {
    video_id: String,
    title: String,
    channel_id: String,
    channel_title: String,
    published_at: String,
    duration_seconds: i32,
    category: Option<String>,
    description_keywords: Vec<String>,
    thumbnail_url: Option<String>,
    view_count: i64,
    like_count: i64,
}

impl From<&VideoMetadataRecord> for CachedVideoMetadata {
    fn from(r: &VideoMetadataRecord) -> Self {
        Self {
            video_id: r.video_id.clone(),
            title: r.title.clone(),
            channel_id: r.channel_id.clone(),
            channel_title: r.channel_title.clone(),
            published_at: r.published_at.to_rfc3339(),
            duration_seconds: r.duration_seconds,
            category: r.category.clone(),
            description_keywords: r.description_keywords.clone(),
            thumbnail_url: r.thumbnail_url.clone(),
            view_count: r.view_count,
            like_count: r.like_count,
        }
    }
}

impl TryFrom<CachedVideoMetadata> for VideoMetadataRecord {
    type Error = AppError;

    fn try_from(c: CachedVideoMetadata) -> Result<Self, Self::Error> {
        let published_at = DateTime::parse_from_rfc3339(&c.published_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

        Ok(Self {
            video_id: c.video_id,
            title: c.title,
            channel_id: c.channel_id,
            channel_title: c.channel_title,
            published_at,
            duration_seconds: c.duration_seconds,
            category: c.category,
            description_keywords: c.description_keywords,
            thumbnail_url: c.thumbnail_url,
            view_count: c.view_count,
            like_count: c.like_count,
        })
    }
}

const CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

fn cache_key(video_id: &str) -> String {
    format!("video:metadata:{video_id}")
}

#[derive(Debug, Deserialize)]
struct YoutubeThumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct YoutubeThumbnails {
    default: Option<YoutubeThumbnail>,
}

#[derive(Debug, Deserialize)]
struct YoutubeSnippet {
    #[serde(rename = "publishedAt")]
    published_at: String,
    #[serde(rename = "channelId")]
    channel_id: String,
    title: String,
    description: Option<String>,
    #[serde(rename = "channelTitle")]
    channel_title: String,
    #[serde(rename = "categoryId")]
    category_id: Option<String>,
    thumbnails: Option<YoutubeThumbnails>,
}

#[derive(Debug, Deserialize)]
struct YoutubeContentDetails {
    duration: String,
}

#[derive(Debug, Deserialize)]
struct YoutubeStatistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YoutubeVideoItem {
    id: String,
    snippet: YoutubeSnippet,
    #[serde(rename = "contentDetails")]
    content_details: YoutubeContentDetails,
    statistics: YoutubeStatistics,
}

#[derive(Debug, Deserialize)]
struct YoutubeVideosResponse {
    #[serde(default)]
    items: Vec<YoutubeVideoItem>,
}

#[derive(Debug, Deserialize)]
struct YoutubeErrorDetail {
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YoutubeErrorBody {
    errors: Option<Vec<YoutubeErrorDetail>>,
}

#[derive(Debug, Deserialize)]
struct YoutubeErrorResponse {
    error: YoutubeErrorBody,
}

fn extract_description_keywords(description: Option<&str>) -> Vec<String> {
    description
        .unwrap_or_default()
        .split_whitespace()
        .filter(|t| t.len() > 3)
        .take(20)
        .map(|t| t.to_lowercase())
        .collect()
}

pub struct YouTubeClient {
    http_client: reqwest::Client,
    api_key: String,
    kv: Arc<dyn KvStore>,
    breaker: CircuitBreaker,
    rate_limiters: RateLimiters,
}

impl YouTubeClient {
    pub fn new(
        http_client: reqwest::Client,
        api_key: String,
        kv: Arc<dyn KvStore>,
        rate_limiters: RateLimiters,
    ) -> Self {
        let breaker = CircuitBreaker::new(kv.clone(), "youtube");
        Self {
            http_client,
            api_key,
            kv,
            breaker,
            rate_limiters,
        }
    }

    /// Cache probe -> circuit check -> batched upstream fetch -> parse -> write-through
    /// (SPEC_FULL §4.3).
    pub async fn get_metadata(
        &self,
        conn: &sea_orm::DatabaseConnection,
        video_ids: &[String],
    ) -> AppResult<HashMap<String, VideoMetadataRecord>> {
        let mut results = HashMap::new();
        let mut misses = Vec::new();

        for id in video_ids {
            match self.kv.get(&cache_key(id)).await? {
                Some(raw) => {
                    if let Ok(cached) = serde_json::from_str::<CachedVideoMetadata>(&raw) {
                        if let Ok(record) = VideoMetadataRecord::try_from(cached) {
                            results.insert(id.clone(), record);
                            continue;
                        }
                    }
                    misses.push(id.clone());
                }
                None => misses.push(id.clone()),
            }
        }

        if misses.is_empty() {
            return Ok(results);
        }

        self.breaker.guard().await?;

        let batch_size = cfg.youtube.batch_size.min(MAX_IDS_PER_BATCH);
        for chunk in misses.chunks(batch_size) {
            let fetched = self.fetch_batch_with_retry(chunk).await?;
            for record in fetched {
                self.write_through(conn, &record).await?;
                results.insert(record.video_id.clone(), record);
            }
        }

        Ok(results)
    }

    async fn write_through(
        &self,
        conn: &sea_orm::DatabaseConnection,
        record: &VideoMetadataRecord,
    ) -> AppResult<()> {
        let cached = CachedVideoMetadata::from(record);
        let serialized = serde_json::to_string(&cached)?;
        self.kv
            .set_with_ttl(&cache_key(&record.video_id), serialized, CACHE_TTL)
            .await?;

        VideoMetadataCtrl::upsert(
            conn,
            record.video_id.clone(),
            record.title.clone(),
            record.channel_id.clone(),
            record.channel_title.clone(),
            record.published_at,
            record.duration_seconds,
            record.category.clone(),
            record.description_keywords.clone(),
            record.thumbnail_url.clone(),
            record.view_count,
            record.like_count,
        )
        .await
    }

    async fn fetch_batch_with_retry(
        &self,
        video_ids: &[String],
    ) -> AppResult<Vec<VideoMetadataRecord>> {
        let max_attempts = cfg.queue.default_max_attempts.max(1) as u32;

        for attempt in 0..max_attempts {
            self.rate_limiters.acquire_one().await?;

            let resp = self
                .http_client
                .get(format!("{YOUTUBE_ENDPOINT}/videos"))
                .query(&[
                    ("part", "snippet,contentDetails,statistics"),
                    ("id", &video_ids.join(",")),
                    ("key", &self.api_key),
                ])
                .send()
                .await?;

            let status = resp.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or_else(|| 2u64.pow(attempt));
                tokio::time::sleep(Duration::from_secs(retry_after)).await;
                continue;
            }

            if status == reqwest::StatusCode::FORBIDDEN {
                let body = resp.json::<YoutubeErrorResponse>().await.ok();
                let quota_exhausted = body
                    .and_then(|b| b.error.errors)
                    .map(|errors| {
                        errors
                            .iter()
                            .any(|e| e.reason.as_deref() == Some("quotaExceeded"))
                    })
                    .unwrap_or(false);

                if quota_exhausted {
                    self.breaker.record_failure().await?;
                    return Err(AppError::QuotaExceeded);
                }

                self.breaker.record_failure().await?;
                if attempt + 1 == max_attempts {
                    return Err(AppError::TransientUpstream(
                        "youtube api returned 403".to_string(),
                    ));
                }
                tokio::time::sleep(Duration::from_millis(1000 * 2u64.pow(attempt))).await;
                continue;
            }

            if !status.is_success() {
                self.breaker.record_failure().await?;
                if attempt + 1 == max_attempts {
                    return Err(AppError::TransientUpstream(format!(
                        "youtube api returned {status}"
                    )));
                }
                tokio::time::sleep(Duration::from_millis(1000 * 2u64.pow(attempt))).await;
                continue;
            }

            let data = resp.json::<YoutubeVideosResponse>().await?;
            self.breaker.record_success().await?;

            return Ok(data.items.into_iter().map(parse_video_item).collect());
        }

        Err(AppError::TransientUpstream(
            "youtube api retries exhausted".to_string(),
        ))
    }
}

fn parse_video_item(item: YoutubeVideoItem) -> VideoMetadataRecord {
    let published_at = DateTime::parse_from_rfc3339(&item.snippet.published_at)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    VideoMetadataRecord {
        video_id: item.id,
        title: item.snippet.title,
        channel_id: item.snippet.channel_id,
        channel_title: item.snippet.channel_title,
        published_at,
        duration_seconds: parse_iso8601_duration(&item.content_details.duration),
        category: item.snippet.category_id,
        description_keywords: extract_description_keywords(item.snippet.description.as_deref()),
        thumbnail_url: item.snippet.thumbnails.and_then(|t| t.default).map(|d| d.url),
        view_count: item
            .statistics
            .view_count
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
        like_count: item
            .statistics
            .like_count
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_twenty_long_tokens_lowercased() {
        let description = "The Quick brown fox jumps over a lazy dog repeatedly for testing purposes and more words to pad beyond twenty total tokens in this sentence of description text here";
        let keywords = extract_description_keywords(Some(description));
        assert!(keywords.len() <= 20);
        assert!(keywords.iter().all(|k| k.len() > 3));
        assert!(keywords.iter().all(|k| k == &k.to_lowercase()));
    }

    #[test]
    fn empty_description_yields_no_keywords() {
        assert!(extract_description_keywords(None).is_empty());
    }
}
