//! Comment relay pipeline.
//!
//! One pass over the task board:
//! 1. Fetch unread comment notifications
//! 2. For each, in source order: ask the responder for a reply, post it on the card
//! 3. Mark every notification read (skipped when nothing was found)
//!
//! Fail-fast: the first error aborts the pass. Replies already posted stay
//! posted and nothing is marked read, so a re-run replies to them again.

use std::fmt::Display;
use std::io::Write;

use responder_common::error::Result;
use responder_common::types::{Notification, RunSummary};
use responder_common::{NotificationSource, Responder};

/// Sequences one relay pass between a notification source and a responder.
pub struct CommentProcessor<S, R> {
    source: S,
    responder: R,
}

impl<S, R> CommentProcessor<S, R>
where
    S: NotificationSource,
    R: Responder,
{
    pub fn new(source: S, responder: R) -> Self {
        Self { source, responder }
    }

    /// Run a single pass, writing human-readable progress lines to `out`.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<RunSummary> {
        let notifications = self.source.fetch_unread_comment_notifications().await?;
        let found = notifications.len();

        tracing::info!(count = found, "Fetched unread comment notifications");
        progress(out, format_args!("{found} notifications found."));

        if notifications.is_empty() {
            progress(
                out,
                "There is no comment to reply. So finish to response comments.",
            );
            return Ok(RunSummary {
                found,
                ..RunSummary::default()
            });
        }

        let mut replied = 0;
        for notification in &notifications {
            self.process_notification(notification, out).await?;
            replied += 1;
        }

        progress(out, "Bot has read all notifications...");
        self.source.mark_all_read().await?;

        progress(out, "Done");
        tracing::info!(found, replied, "Relay pass complete");

        Ok(RunSummary {
            found,
            replied,
            marked_read: true,
        })
    }

    /// Reply to one notification: responder first, then the card comment.
    async fn process_notification<W: Write>(
        &self,
        notification: &Notification,
        out: &mut W,
    ) -> Result<()> {
        progress(out, format_args!("Notification ID: {}", notification.id));
        progress(out, format_args!("Comment Text: {}", notification.comment_text));
        progress(out, format_args!("Card ID: {}", notification.card_id));

        tracing::info!(
            notification_id = %notification.id,
            card_id = %notification.card_id,
            card_name = notification.card_name.as_deref().unwrap_or(""),
            date = ?notification.date,
            responder = self.responder.name(),
            "Processing comment notification"
        );

        progress(out, "Bot is thinking response...");
        let reply = self.responder.get_reply(&notification.comment_text).await?;
        progress(out, format_args!("Bot response: {reply}"));

        progress(out, "Bot is commenting to card...");
        self.source
            .post_comment(&notification.card_id, &reply)
            .await?;

        Ok(())
    }
}

/// Progress output is informational; a broken pipe must not abort the pass.
fn progress<W: Write>(out: &mut W, line: impl Display) {
    if let Err(e) = writeln!(out, "{line}") {
        tracing::warn!(error = %e, "Failed to write progress line");
    }
}
