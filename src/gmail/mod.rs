//! Gmail module: message listing and header extraction.
//!
//! [`MailProvider`] is the seam the agent talks to; [`GmailClient`] is the
//! REST implementation.

mod client;
mod summary;
mod types;

use async_trait::async_trait;

use crate::Result;

pub use client::{GmailClient, MAX_RESULTS_CAP};
pub use summary::{header_value, summarize_message, NO_SUBJECT, UNKNOWN_SENDER};
pub use types::{GmailMessage, MessageHeader, MessageSummary};

/// Mail provider trait - list and fetch messages with a bearer token
#[async_trait]
pub trait MailProvider: Send + Sync {
    /// Ids matching a Gmail search query, in provider order
    async fn list_message_ids(&self, token: &str, query: &str, limit: u32) -> Result<Vec<String>>;

    /// One message summary, `None` if the provider has no such id
    async fn get_message(&self, token: &str, id: &str) -> Result<Option<MessageSummary>>;
}
