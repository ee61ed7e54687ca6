pub mod processor;

use std::io::Write;

use responder_common::config::AppConfig;
use responder_common::error::Result;
use responder_common::types::RunSummary;
use responder_pandora::PandoraClient;
use responder_trello::TrelloClient;

use crate::processor::CommentProcessor;

/// Wire the Trello and Pandorabots clients from `config` and run one pass.
pub async fn run_once<W: Write>(config: &AppConfig, out: &mut W) -> Result<RunSummary> {
    let trello = TrelloClient::from_config(config)?;
    let pandora = PandoraClient::from_config(config)?;

    CommentProcessor::new(trello, pandora).run(out).await
}
