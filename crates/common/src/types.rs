use chrono::{DateTime, Utc};

/// An unread "comment on card" notification from the task board.
///
/// Read-only: built from the API response, processed once, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub card_id: String,
    pub comment_text: String,
    /// Card title, when the API includes it
    pub card_name: Option<String>,
    /// When the comment was made, when the API includes it
    pub date: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn new(
        id: impl Into<String>,
        card_id: impl Into<String>,
        comment_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            card_id: card_id.into(),
            comment_text: comment_text.into(),
            card_name: None,
            date: None,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Notifications returned by the fetch
    pub found: usize,
    /// Replies posted as card comments
    pub replied: usize,
    /// Whether the bulk mark-all-read call was issued
    pub marked_read: bool,
}
