use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OutreachError>;

#[derive(Error, Debug)]
pub enum OutreachError {
    #[error("Remote service error: {0}")]
    RemoteService(String),

    #[error("Scrape job ended with status {status}")]
    TerminalJobFailure { status: String },

    #[error("Missing input file {}: {guidance}", path.display())]
    MissingInputFile { path: PathBuf, guidance: String },

    #[error("Send failed for {target}: {reason}")]
    SendFailure { target: String, reason: String },

    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Messaging client disconnected: {0}")]
    Disconnected(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OutreachError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OutreachError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn missing_input(path: impl Into<PathBuf>, guidance: impl Into<String>) -> Self {
        OutreachError::MissingInputFile {
            path: path.into(),
            guidance: guidance.into(),
        }
    }
}
