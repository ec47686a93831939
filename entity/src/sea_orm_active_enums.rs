//! `SeaORM` Entity, hand-maintained to match the `migration` crate's enum columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Classification {
    #[sea_orm(string_value = "watch_now")]
    WatchNow,
    #[sea_orm(string_value = "save")]
    Save,
    #[sea_orm(string_value = "skip")]
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum FeedbackAction {
    #[sea_orm(string_value = "watched")]
    Watched,
    #[sea_orm(string_value = "saved")]
    Saved,
    #[sea_orm(string_value = "skipped")]
    Skipped,
    #[sea_orm(string_value = "dismissed")]
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum JobStatus {
    #[sea_orm(string_value = "queued")]
    Queued,
    #[sea_orm(string_value = "running")]
    Running,
    #[sea_orm(string_value = "succeeded")]
    Succeeded,
    #[sea_orm(string_value = "failed")]
    Failed,
}
