//! `SeaORM` Entity

use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::JobStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "job_tracking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub queue_name: String,
    pub payload: Json,
    pub idempotency_key: Option<String>,
    pub status: JobStatus,
    pub attempt: i32,
    pub max_attempts: i32,
    pub next_visible_at: DateTimeWithTimeZone,
    pub locked_by: Option<String>,
    pub locked_until: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub completed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
