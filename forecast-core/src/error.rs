//! Errors produced while fetching a forecast.

use thiserror::Error;

/// Shown to the user for every failed fetch, whatever the cause.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch forecast. Check the location and try again.";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed forecast response: {0}")]
    MalformedResponse(String),

    #[error("Location could not be resolved: {0}")]
    InvalidLocation(String),

    #[error("Provider rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl GatewayError {
    /// User-facing message. All failures look the same to the user; the
    /// variant is kept for logs.
    pub fn user_message(&self) -> &'static str {
        FETCH_FAILED_MESSAGE
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::MalformedResponse(_) => "malformed_response",
            Self::InvalidLocation(_) => "invalid_location",
            Self::Rejected { .. } => "rejected",
        }
    }
}
