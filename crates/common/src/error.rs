use std::path::PathBuf;

use thiserror::Error;

/// Error kinds shared by the adapters and the orchestrator.
///
/// None of these are recovered locally: every error aborts the run, and the
/// binary maps the kind to a process exit code.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Configuration missing: {}", path.display())]
    ConfigMissing { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl RelayError {
    /// Process exit code for this error kind. `0` is reserved for success.
    pub fn exit_code(&self) -> u8 {
        match self {
            RelayError::ConfigMissing { .. } | RelayError::Config(_) => 1,
            RelayError::Transport(_) => 2,
            RelayError::Parse(_) => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
