//! `SeaORM` Entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_expires_at: DateTimeWithTimeZone,
    pub sync_cursor: Option<String>,
    pub needs_reauthorization: bool,
    pub preferences: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::email::Entity")]
    Email,
    #[sea_orm(has_many = "super::youtube_link::Entity")]
    YoutubeLink,
    #[sea_orm(has_many = "super::sender_stats::Entity")]
    SenderStats,
    #[sea_orm(has_many = "super::ranking::Entity")]
    Ranking,
    #[sea_orm(has_many = "super::feedback::Entity")]
    Feedback,
}

impl Related<super::email::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Email.def()
    }
}

impl Related<super::youtube_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::YoutubeLink.def()
    }
}

impl Related<super::sender_stats::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SenderStats.def()
    }
}

impl Related<super::ranking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ranking.def()
    }
}

impl Related<super::feedback::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feedback.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
