pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users_table;
mod m20250101_000002_create_emails_table;
mod m20250101_000003_create_video_metadata_table;
mod m20250101_000004_create_youtube_links_table;
mod m20250101_000005_create_sender_stats_table;
mod m20250101_000006_create_rankings_table;
mod m20250101_000007_create_feedback_table;
mod m20250101_000008_create_job_tracking_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users_table::Migration),
            Box::new(m20250101_000002_create_emails_table::Migration),
            Box::new(m20250101_000003_create_video_metadata_table::Migration),
            Box::new(m20250101_000004_create_youtube_links_table::Migration),
            Box::new(m20250101_000005_create_sender_stats_table::Migration),
            Box::new(m20250101_000006_create_rankings_table::Migration),
            Box::new(m20250101_000007_create_feedback_table::Migration),
            Box::new(m20250101_000008_create_job_tracking_table::Migration),
        ]
    }
}
