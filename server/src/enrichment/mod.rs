pub mod client;
pub mod duration;

pub use client::{VideoMetadataRecord, YouTubeClient};
