use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;

use crate::{db_core::prelude::*, error::AppResult};

pub struct VideoMetadataCtrl;

impl VideoMetadataCtrl {
    pub async fn get_by_id(
        conn: &DatabaseConnection,
        video_id: &str,
    ) -> AppResult<Option<video_metadata::Model>> {
        let row = VideoMetadata::find_by_id(video_id.to_string())
            .one(conn)
            .await?;

        Ok(row)
    }

    /// Authoritative write on a cache miss or refresh (SPEC_FULL §4.3 step 5): `ON CONFLICT
    /// (video_id) DO UPDATE`.
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert(
        conn: &DatabaseConnection,
        video_id: String,
        title: String,
        channel_id: String,
        channel_title: String,
        published_at: DateTime<Utc>,
        duration_seconds: i32,
        category: Option<String>,
        description_keywords: Vec<String>,
        thumbnail_url: Option<String>,
        view_count: i64,
        like_count: i64,
    ) -> AppResult<()> {
        let active = video_metadata::ActiveModel {
            video_id: Set(video_id),
            title: Set(title),
            channel_id: Set(channel_id),
            channel_title: Set(channel_title),
            published_at: Set(published_at.into()),
            duration_seconds: Set(duration_seconds),
            category: Set(category),
            description_keywords: Set(serde_json::json!(description_keywords)),
            thumbnail_url: Set(thumbnail_url),
            view_count: Set(view_count),
            like_count: Set(like_count),
            fetched_at: Set(Utc::now().into()),
        };

        VideoMetadata::insert(active)
            .on_conflict(
                OnConflict::column(video_metadata::Column::VideoId)
                    .update_columns([
                        video_metadata::Column::Title,
                        video_metadata::Column::ChannelId,
                        video_metadata::Column::ChannelTitle,
                        video_metadata::Column::PublishedAt,
                        video_metadata::Column::DurationSeconds,
                        video_metadata::Column::Category,
                        video_metadata::Column::DescriptionKeywords,
                        video_metadata::Column::ThumbnailUrl,
                        video_metadata::Column::ViewCount,
                        video_metadata::Column::LikeCount,
                        video_metadata::Column::FetchedAt,
                    ])
                    .to_owned(),
            )
            .exec(conn)
            .await?;

        Ok(())
    }
}
