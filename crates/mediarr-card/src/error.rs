//! Error types for card setup and remote playback.

use thiserror::Error;

/// Fatal at setup: the card cannot be instantiated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The raw configuration was not a key/value map.
    #[error("Card configuration must be a map of options")]
    NotAMap,

    /// No section has an entity configured.
    #[error("Please define at least one media entity ({hint})")]
    NoMediaEntity { hint: String },
}

/// Errors talking to the media server's control API.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server rejected the request ({status})")]
    Rejected { status: u16 },

    /// Response body could not be understood
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Plex URL or token missing from the card configuration
    #[error("Plex URL or token not available")]
    NotConfigured,
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
