//! `SeaORM` Entity

use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::{Classification, FeedbackAction};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "feedback")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub link_id: Uuid,
    pub ranking_id: Option<Uuid>,
    pub action: FeedbackAction,
    pub relevance_label: Option<Classification>,
    pub provided_at: DateTimeWithTimeZone,
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
    #[sea_orm(
        belongs_to = "super::ranking::Entity",
        from = "Column::RankingId",
        to = "super::ranking::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Ranking,
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

impl Related<super::ranking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ranking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
