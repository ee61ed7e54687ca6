//! Wire shapes of Trello's notification listing.
//!
//! Only the fields the relay reads are modelled. A `commentCard`
//! notification looks like:
//!
//! ```json
//! {
//!   "id": "5f1c...",
//!   "type": "commentCard",
//!   "date": "2014-03-02T10:15:00.000Z",
//!   "data": { "text": "hello", "card": { "id": "52f3...", "name": "Todo" } }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::Deserialize;

use responder_common::error::{RelayError, Result};
use responder_common::types::Notification;

#[derive(Debug, Deserialize)]
struct RawNotification {
    id: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    data: RawData,
}

#[derive(Debug, Default, Deserialize)]
struct RawData {
    text: Option<String>,
    card: Option<RawCard>,
}

#[derive(Debug, Deserialize)]
struct RawCard {
    id: String,
    name: Option<String>,
}

/// Parse a notification listing body into domain notifications.
///
/// Fails if the body is not a JSON array of records, or a record lacks the
/// comment text or the card id.
pub fn parse_notifications(body: &str) -> Result<Vec<Notification>> {
    let raw: Vec<RawNotification> = serde_json::from_str(body)
        .map_err(|e| RelayError::Parse(format!("notification list: {e}")))?;

    raw.into_iter().map(into_notification).collect()
}

fn into_notification(raw: RawNotification) -> Result<Notification> {
    let comment_text = raw
        .data
        .text
        .ok_or_else(|| RelayError::Parse(format!("notification {} has no data.text", raw.id)))?;
    let card = raw
        .data
        .card
        .ok_or_else(|| RelayError::Parse(format!("notification {} has no data.card", raw.id)))?;

    // A malformed timestamp is not worth failing the run over.
    let date = raw
        .date
        .as_deref()
        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|d| d.with_timezone(&Utc));

    Ok(Notification {
        id: raw.id,
        card_id: card.id,
        comment_text,
        card_name: card.name,
        date,
    })
}
