pub use entity::prelude::*;
pub use entity::{
    email, feedback, job_record, ranking, sender_stats, user, video_metadata, youtube_link,
};
pub use entity::sea_orm_active_enums::{Classification, FeedbackAction, JobStatus};
pub use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    JoinType, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Set,
};
