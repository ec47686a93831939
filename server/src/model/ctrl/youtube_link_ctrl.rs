use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use uuid::Uuid;

use crate::{db_core::prelude::*, error::AppResult};

pub struct YoutubeLinkCtrl;

impl YoutubeLinkCtrl {
    /// `true` iff `(user_id, video_id)` already existed before this insert — used to set
    /// `is_duplicate` (SPEC_FULL §3 YoutubeLink). Must run inside the same transaction as the
    /// insert that follows.
    pub async fn user_already_has_video<C>(
        db: &C,
        user_id: Uuid,
        video_id: &str,
    ) -> AppResult<bool>
    where
        C: sea_orm::ConnectionTrait,
    {
        let existing = YoutubeLink::find()
            .filter(youtube_link::Column::UserId.eq(user_id))
            .filter(youtube_link::Column::VideoId.eq(video_id))
            .one(db)
            .await?;

        Ok(existing.is_some())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_idempotent<C>(
        db: &C,
        id: Uuid,
        user_id: Uuid,
        email_id: Uuid,
        video_id: String,
        canonical_url: String,
        playlist_id: Option<String>,
        is_duplicate: bool,
    ) -> AppResult<Option<youtube_link::Model>>
    where
        C: sea_orm::ConnectionTrait,
    {
        let active = youtube_link::ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            email_id: Set(email_id),
            video_id: Set(video_id.clone()),
            canonical_url: Set(canonical_url),
            playlist_id: Set(playlist_id),
            extracted_at: Set(Utc::now().into()),
            is_duplicate: Set(is_duplicate),
        };

        let inserted = YoutubeLink::insert(active)
            .on_conflict(
                OnConflict::columns([
                    youtube_link::Column::UserId,
                    youtube_link::Column::EmailId,
                    youtube_link::Column::VideoId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        if inserted == 0 {
            return Ok(None);
        }

        let row = YoutubeLink::find()
            .filter(youtube_link::Column::UserId.eq(user_id))
            .filter(youtube_link::Column::EmailId.eq(email_id))
            .filter(youtube_link::Column::VideoId.eq(video_id))
            .one(db)
            .await?;

        Ok(row)
    }

    pub async fn video_ids_missing_metadata<C>(
        db: &C,
        video_ids: &[String],
    ) -> AppResult<Vec<String>>
    where
        C: sea_orm::ConnectionTrait,
    {
        let known: Vec<String> = VideoMetadata::find()
            .filter(video_metadata::Column::VideoId.is_in(video_ids.to_vec()))
            .all(db)
            .await?
            .into_iter()
            .map(|m| m.video_id)
            .collect();

        Ok(video_ids
            .iter()
            .filter(|id| !known.contains(id))
            .cloned()
            .collect())
    }

    /// `(user_id, link_id)` for every link pointing at `video_id`, across all users — used to
    /// fan a single Enrich job's result out into one RankCompute job per affected link
    /// (SPEC_FULL §4.3, §5 per-link ordering).
    pub async fn links_by_video_id(
        conn: &DatabaseConnection,
        video_id: &str,
    ) -> AppResult<Vec<(Uuid, Uuid)>> {
        let rows = YoutubeLink::find()
            .filter(youtube_link::Column::VideoId.eq(video_id))
            .all(conn)
            .await?;

        Ok(rows.into_iter().map(|r| (r.user_id, r.id)).collect())
    }

    pub async fn count_extracted_in_range(
        conn: &DatabaseConnection,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<u64> {
        let count = YoutubeLink::find()
            .filter(youtube_link::Column::UserId.eq(user_id))
            .filter(youtube_link::Column::ExtractedAt.gte(start))
            .filter(youtube_link::Column::ExtractedAt.lt(end))
            .count(conn)
            .await?;

        Ok(count)
    }
}
