//! `SeaORM` Entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "video_metadata")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_title: String,
    pub published_at: DateTimeWithTimeZone,
    pub duration_seconds: i32,
    pub category: Option<String>,
    pub description_keywords: Json,
    pub thumbnail_url: Option<String>,
    pub view_count: i64,
    pub like_count: i64,
    pub fetched_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::youtube_link::Entity")]
    YoutubeLink,
}

impl Related<super::youtube_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::YoutubeLink.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
