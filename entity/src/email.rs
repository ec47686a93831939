//! `SeaORM` Entity

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "emails")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub external_message_id: String,
    pub thread_id: String,
    pub sender_address: String,
    pub sender_display_name: Option<String>,
    pub subject: Option<String>,
    pub received_at: DateTimeWithTimeZone,
    pub preview_snippet: String,
    pub labels: Json,
    pub thread_reply_count: i32,
    pub is_thread_reply: bool,
    pub created_at: DateTimeWithTimeZone,
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
    #[sea_orm(has_many = "super::youtube_link::Entity")]
    YoutubeLink,
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

impl ActiveModelBehavior for ActiveModel {}
