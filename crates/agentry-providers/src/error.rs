// Provider error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider's API key is not configured
    #[error("{0} is not set")]
    MissingApiKey(&'static str),

    /// The API answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not have the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        ProviderError::InvalidResponse(msg.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for errors reported by the remote API itself
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            ProviderError::Api { .. } | ProviderError::InvalidResponse(_)
        )
    }
}
