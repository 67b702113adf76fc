use std::time::Duration;

use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

pub const PROVIDER_FALLBACK_MESSAGE: &str = "Could not fetch video data. Please try again.";

/// Failure of a single fetch. `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Please enter a valid TikTok URL")]
    EmptyInput,
    #[error("Request timed out. Please check your connection.")]
    Timeout { after: Duration },
    #[error("Server error: {status}")]
    Transport { status: u16 },
    #[error("Network error: {reason}")]
    Network { reason: String },
    #[error("Failed to load video. Please check the link.")]
    Malformed { reason: String },
    #[error("Invalid URL or the video is private/deleted.")]
    InvalidOrPrivate,
    #[error("{message}")]
    Provider { code: i64, message: String },
    #[error("fetch client setup failed: {0}")]
    Setup(String),
}

impl FetchError {
    /// Provider failure with the generic fallback when `message` is blank.
    pub fn provider(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            PROVIDER_FALLBACK_MESSAGE.to_string()
        } else {
            message
        };
        FetchError::Provider { code, message }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        FetchError::Malformed {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable name, used for JSON output and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::EmptyInput => "empty_input",
            FetchError::Timeout { .. } => "timeout",
            FetchError::Transport { .. } => "transport_error",
            FetchError::Network { .. } => "network_error",
            FetchError::Malformed { .. } => "malformed_response",
            FetchError::InvalidOrPrivate => "invalid_or_private_video",
            FetchError::Provider { .. } => "provider_error",
            FetchError::Setup(_) => "setup_error",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Transport {
                status: status.as_u16(),
            },
            None => FetchError::Network {
                reason: err.to_string(),
            },
        }
    }
}
