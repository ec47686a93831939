pub mod client;
pub mod credentials;
pub mod synchronizer;

pub use client::{GmailInboxClient, InboxClient};
pub use credentials::{GoogleInboxCredentials, InboxCredentials};
pub use synchronizer::InboxSynchronizer;
