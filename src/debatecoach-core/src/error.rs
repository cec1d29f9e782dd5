//! Error types for the coaching and debate pipelines.

use serde::Serialize;
use thiserror::Error;

use crate::session::SessionId;

#[derive(Error, Debug)]
pub enum CoachError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid {category} pattern '{pattern}': {source}")]
    InvalidPattern {
        category: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("No API credentials configured: set UPSTAGE_API_KEY and/or PERPLEXITY_API_KEY")]
    NoCredentials,

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Unknown session: {0}")]
    SessionNotFound(SessionId),

    #[error("The opponent has already conceded; start a new debate session")]
    SessionSurrendered,

    #[error("Coaching has not started: choose a topic and a position first")]
    CoachingNotStarted,
}

/// Broad failure categories surfaced to the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigurationMissing,
    TransportFailure,
}

/// Failure of a single call to an external service.
///
/// These never escape the pipelines; they are attached to degraded results
/// so callers can still tell what went wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum ServiceError {
    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("service returned an empty response")]
    EmptyResponse,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::NotConfigured(_) => ErrorKind::ConfigurationMissing,
            ServiceError::Transport(_) | ServiceError::Api(_) | ServiceError::EmptyResponse => {
                ErrorKind::TransportFailure
            }
        }
    }
}

impl From<async_openai::error::OpenAIError> for ServiceError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        ServiceError::Api(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_kinds() {
        assert_eq!(
            ServiceError::NotConfigured("retrieval service".into()).kind(),
            ErrorKind::ConfigurationMissing
        );
        assert_eq!(
            ServiceError::Transport("timeout".into()).kind(),
            ErrorKind::TransportFailure
        );
        assert_eq!(ServiceError::EmptyResponse.kind(), ErrorKind::TransportFailure);
    }

    #[test]
    fn test_service_error_display() {
        let err = ServiceError::NotConfigured("PERPLEXITY_API_KEY".into());
        assert_eq!(err.to_string(), "PERPLEXITY_API_KEY is not configured");
    }

    #[test]
    fn test_service_error_serializes_tagged() {
        let json = serde_json::to_value(ServiceError::Api("quota exceeded".into())).unwrap();
        assert_eq!(json, serde_json::json!({"type": "api", "detail": "quota exceeded"}));

        let json = serde_json::to_value(ServiceError::EmptyResponse).unwrap();
        assert_eq!(json, serde_json::json!({"type": "empty_response"}));
    }
}
