use std::time::Duration;

use async_trait::async_trait;

use responder_common::Responder;
use responder_common::config::AppConfig;
use responder_common::error::{RelayError, Result};

use crate::talk::parse_talk_response;

/// Pandorabots client bound to a single bot.
pub struct PandoraClient {
    base_url: String,
    bot_id: String,
    client: reqwest::Client,
}

impl PandoraClient {
    pub fn new(base_url: impl Into<String>, bot_id: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                RelayError::Transport(format!("cannot build Pandorabots HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bot_id: bot_id.into(),
            client,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.pandora_api_url.clone(),
            config.credentials.bot_id.clone(),
            config.http_timeout(),
        )
    }

    fn talk_url(&self) -> String {
        format!("{}/talk-xml", self.base_url)
    }
}

#[async_trait]
impl Responder for PandoraClient {
    async fn get_reply(&self, message: &str) -> Result<String> {
        tracing::debug!(bot_id = %self.bot_id, chars = message.chars().count(), "Requesting bot reply");

        let resp = self
            .client
            .post(self.talk_url())
            .form(&[("botid", self.bot_id.as_str()), ("input", message)])
            .send()
            .await
            .map_err(|e| RelayError::Transport(format!("Pandorabots talk failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| RelayError::Transport(format!("Pandorabots talk body: {e}")))?;

        if !status.is_success() {
            return Err(RelayError::Transport(format!(
                "Pandorabots talk returned {status}: {}",
                body.trim()
            )));
        }

        parse_talk_response(&body)?.into_reply()
    }

    fn name(&self) -> &'static str {
        "pandorabots"
    }
}
