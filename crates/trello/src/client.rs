use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use responder_common::NotificationSource;
use responder_common::config::{AppConfig, Credentials};
use responder_common::error::{RelayError, Result};
use responder_common::types::Notification;

use crate::model::parse_notifications;

/// Trello REST client scoped to one member's notifications.
pub struct TrelloClient {
    base_url: Url,
    api_key: String,
    api_token: String,
    user_id: String,
    client: reqwest::Client,
}

impl TrelloClient {
    pub fn new(base_url: &str, credentials: &Credentials, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RelayError::Config(format!("invalid Trello base URL {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RelayError::Config(format!(
                "Trello base URL {base_url} cannot take path segments"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Transport(format!("cannot build Trello HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            api_key: credentials.api_key.clone(),
            api_token: credentials.api_token.clone(),
            user_id: credentials.user_id.clone(),
            client,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            &config.trello_api_url,
            &config.credentials,
            config.http_timeout(),
        )
    }

    /// Base URL extended with `segments`, each percent-encoded as one path segment.
    fn api_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn auth(&self) -> [(&'static str, &str); 2] {
        [("key", self.api_key.as_str()), ("token", self.api_token.as_str())]
    }

    /// Send a request and turn anything but a 2xx into a transport error.
    async fn send(&self, request: reqwest::RequestBuilder, op: &str) -> Result<reqwest::Response> {
        let resp = request
            .send()
            .await
            .map_err(|e| RelayError::Transport(format!("Trello {op} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Transport(format!(
                "Trello {op} returned {status}: {}",
                body.trim()
            )));
        }

        Ok(resp)
    }
}

#[async_trait]
impl NotificationSource for TrelloClient {
    async fn fetch_unread_comment_notifications(&self) -> Result<Vec<Notification>> {
        let url = self.api_url(&["members", self.user_id.as_str(), "notifications"]);
        tracing::debug!(user_id = %self.user_id, "Fetching unread comment notifications");

        let request = self
            .client
            .get(url)
            .query(&self.auth())
            .query(&[("read_filter", "unread"), ("filter", "commentCard")]);

        let body = self
            .send(request, "notification listing")
            .await?
            .text()
            .await
            .map_err(|e| RelayError::Transport(format!("Trello notification listing body: {e}")))?;

        parse_notifications(&body)
    }

    async fn post_comment(&self, card_id: &str, text: &str) -> Result<()> {
        let url = self.api_url(&["cards", card_id, "actions", "comments"]);
        tracing::debug!(card_id, chars = text.chars().count(), "Posting card comment");

        let request = self
            .client
            .post(url)
            .query(&self.auth())
            .form(&[("text", text)]);

        self.send(request, "comment post").await?;
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<()> {
        tracing::debug!("Marking all notifications read");

        let request = self
            .client
            .post(self.api_url(&["notifications", "all", "read"]))
            .query(&self.auth());

        self.send(request, "mark-all-read").await?;
        Ok(())
    }
}
