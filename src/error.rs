use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a page scan or its setup
#[derive(Debug, Error)]
pub enum ScanError {
    /// The page URL used as base for relative links could not be parsed
    #[error("invalid page URL '{url}': {source}")]
    InvalidPageUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A saved page or configuration file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration JSON could not be parsed
    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Configuration parsed but holds unusable values
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
