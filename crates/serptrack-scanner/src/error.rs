use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read input file {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("giving up on {url} after {attempts} retries, last status HTTP {last_status}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_status: u16,
    },

    #[error("invalid search URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error for {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("task for keyword '{keyword}' panicked: {reason}")]
    TaskPanicked { keyword: String, reason: String },
}

impl ScanError {
    /// Whether this error came from talking to the search engine.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Request { .. } | Self::HttpStatus { .. } | Self::RetriesExhausted { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
