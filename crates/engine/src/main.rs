use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use responder_common::config::{AppConfig, CONFIG_TEMPLATE_PATH};
use responder_common::error::RelayError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize tracing; stdout is reserved for progress lines
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("responder_engine=info,responder_trello=info,responder_pandora=info")
        }))
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!("Trello responder starting...");

    // Load configuration before any network work
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            if let RelayError::ConfigMissing { path } = &e {
                println!("Copy {CONFIG_TEMPLATE_PATH} to {} at first.", path.display());
            }
            tracing::error!(error = %e, "Cannot load configuration");
            eprintln!("{e}");
            return ExitCode::from(e.exit_code());
        }
    };

    let mut stdout = std::io::stdout().lock();
    match responder_engine::run_once(&config, &mut stdout).await {
        Ok(summary) => {
            tracing::info!(
                found = summary.found,
                replied = summary.replied,
                marked_read = summary.marked_read,
                "Trello responder finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Relay pass aborted");
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
