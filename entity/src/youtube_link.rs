//! `SeaORM` Entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "youtube_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub email_id: Uuid,
    pub video_id: String,
    pub canonical_url: String,
    pub playlist_id: Option<String>,
    pub extracted_at: DateTimeWithTimeZone,
    pub is_duplicate: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::email::Entity",
        from = "Column::EmailId",
        to = "super::email::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Email,
    #[sea_orm(
        belongs_to = "super::video_metadata::Entity",
        from = "Column::VideoId",
        to = "super::video_metadata::Column::VideoId",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    VideoMetadata,
    #[sea_orm(has_many = "super::ranking::Entity")]
    Ranking,
    #[sea_orm(has_many = "super::feedback::Entity")]
    Feedback,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::email::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Email.def()
    }
}

impl Related<super::video_metadata::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VideoMetadata.def()
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
