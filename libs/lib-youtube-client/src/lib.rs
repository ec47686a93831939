pub mod constants;

pub use constants::{QuotaCosts, VIDEOS_LIST_QUOTA};
