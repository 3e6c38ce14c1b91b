use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User-facing category of a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    AuthExpired,
    ServerError,
    ClientError,
    Network,
    Timeout,
}

impl FailureKind {
    pub fn message(self) -> &'static str {
        match self {
            FailureKind::NotFound => "The requested content no longer exists.",
            FailureKind::AuthExpired => "Your session has expired. Sign in again.",
            FailureKind::ServerError => "The content service failed. Try again in a moment.",
            FailureKind::ClientError => "The request was rejected. Check the selected options.",
            FailureKind::Network => "Could not reach the content service. Check your connection.",
            FailureKind::Timeout => "The content service took too long to answer.",
        }
    }
}

#[derive(Debug, Error)]
pub enum ContentAgentError {
    #[error("content service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid base url '{0}'")]
    InvalidBaseUrl(String),
}

impl ContentAgentError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ContentAgentError::Status { status, .. } => match *status {
                404 => FailureKind::NotFound,
                401 | 403 => FailureKind::AuthExpired,
                500..=599 => FailureKind::ServerError,
                _ => FailureKind::ClientError,
            },
            ContentAgentError::Network(_) => FailureKind::Network,
            ContentAgentError::Timeout => FailureKind::Timeout,
            ContentAgentError::InvalidResponse(_) => FailureKind::ServerError,
            ContentAgentError::InvalidBaseUrl(_) => FailureKind::ClientError,
        }
    }
}

impl From<reqwest::Error> for ContentAgentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ContentAgentError::Timeout
        } else if e.is_decode() {
            ContentAgentError::InvalidResponse(e.to_string())
        } else {
            ContentAgentError::Network(e.to_string())
        }
    }
}
