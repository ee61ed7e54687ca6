pub mod config;
pub mod error;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Notification;

/// Task-board side of the relay: where comments come from and go back to.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    /// Unread "comment on card" notifications for the configured member,
    /// in the order the board returns them. An empty list is not an error.
    async fn fetch_unread_comment_notifications(&self) -> Result<Vec<Notification>>;

    /// Append a comment to a card.
    async fn post_comment(&self, card_id: &str, text: &str) -> Result<()>;

    /// Mark every notification on the account as read, not only the ones
    /// processed in this run.
    async fn mark_all_read(&self) -> Result<()>;
}

/// Conversational agent that produces a reply for a piece of text.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn get_reply(&self, message: &str) -> Result<String>;

    /// Human-readable name for log lines (e.g., "pandorabots").
    fn name(&self) -> &'static str;
}
