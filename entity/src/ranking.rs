//! `SeaORM` Entity

use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::Classification;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "rankings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub link_id: Uuid,
    pub ranked_at: DateTimeWithTimeZone,
    pub sender_score: f64,
    pub thread_score: f64,
    pub freshness_score: f64,
    pub topic_match_score: f64,
    pub noise_penalty: f64,
    pub final_score: f64,
    pub classification: Classification,
    pub explanation: String,
    pub topic_tags: Json,
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
        belongs_to = "super::youtube_link::Entity",
        from = "Column::LinkId",
        to = "super::youtube_link::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    YoutubeLink,
    #[sea_orm(has_many = "super::feedback::Entity")]
    Feedback,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::youtube_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::YoutubeLink.def()
    }
}

impl Related<super::feedback::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feedback.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
