//! `SeaORM` Entity prelude, re-exporting every entity under its model-name alias.

pub use super::email::Entity as Email;
pub use super::feedback::Entity as Feedback;
pub use super::job_record::Entity as JobRecord;
pub use super::ranking::Entity as Ranking;
pub use super::sender_stats::Entity as SenderStats;
pub use super::user::Entity as User;
pub use super::video_metadata::Entity as VideoMetadata;
pub use super::youtube_link::Entity as YoutubeLink;
