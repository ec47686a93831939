pub mod dispatch;
pub mod worker;

pub use worker::{QueuePools, QueueWorkerPool};
