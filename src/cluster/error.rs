use thiserror::Error;

use crate::utils::CommandError;

/// Failures talking to the cluster or its credential source
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Kubernetes API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode {what}: {message}")]
    Decode { what: String, message: String },

    #[error("Invalid cluster endpoint '{endpoint}': {message}")]
    Endpoint { endpoint: String, message: String },

    #[error("Invalid resource name '{0}'")]
    InvalidName(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error(transparent)]
    Command(#[from] CommandError),
}

impl ClusterError {
    pub fn decode(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Decode { what: what.into(), message: err.to_string() }
    }

    /// HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ClusterError::Api { status, .. } => Some(*status),
            ClusterError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
