//! Error types for the Spotify connector
//!
//! Every public API returns `Result<T, Error>` where Error is defined here.
//! Upstream failures are folded into [`Error::Api`], which keeps the
//! original transport error as its source.

use crate::auth::extract_jsonpath;
use thiserror::Error;

/// The main error type for the Spotify connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Credential / Authentication Errors
    // ============================================================================
    #[error("{integration}: No credentials got returned!")]
    CredentialsMissing { integration: String },

    #[error("No credentials stored for credential type '{credential_type}'")]
    CredentialNotFound { credential_type: String },

    #[error("Token refresh failed: {message}")]
    TokenRefresh { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid HTTP method: {method}")]
    InvalidMethod { method: String },

    // ============================================================================
    // Upstream API Errors
    // ============================================================================
    #[error("{integration} API error: {message}")]
    Api {
        integration: String,
        status: Option<u16>,
        message: String,
        #[source]
        source: Box<Error>,
    },

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Pagination error: {message}")]
    Pagination { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing credentials error for an integration
    pub fn credentials_missing(integration: impl Into<String>) -> Self {
        Self::CredentialsMissing {
            integration: integration.into(),
        }
    }

    /// Create a store lookup error for a credential type
    pub fn credential_not_found(credential_type: impl Into<String>) -> Self {
        Self::CredentialNotFound {
            credential_type: credential_type.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a pagination error
    pub fn pagination(message: impl Into<String>) -> Self {
        Self::Pagination {
            message: message.into(),
        }
    }

    /// Wrap an upstream error, tagging it with the integration name.
    ///
    /// When the cause is an HTTP status error whose body follows the
    /// `{"error": {"status": .., "message": ..}}` shape, the status and
    /// message are lifted from the body.
    pub fn api(integration: impl Into<String>, source: Error) -> Self {
        let (status, message) = match &source {
            Error::HttpStatus { status, body } => {
                let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
                let upstream_status = parsed
                    .as_ref()
                    .and_then(|v| extract_jsonpath(v, "error.status"))
                    .and_then(|s| s.parse::<u16>().ok());
                let upstream_message = parsed
                    .as_ref()
                    .and_then(|v| extract_jsonpath(v, "error.message"));
                (
                    Some(upstream_status.unwrap_or(*status)),
                    upstream_message.unwrap_or_else(|| source.to_string()),
                )
            }
            Error::RateLimited { .. } => (Some(429), source.to_string()),
            _ => (None, source.to_string()),
        };

        Self::Api {
            integration: integration.into(),
            status,
            message,
            source: Box::new(source),
        }
    }

    /// Upstream HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => *status,
            Error::HttpStatus { status, .. } => Some(*status),
            Error::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

/// Result type alias for the Spotify connector
pub type Result<T> = std::result::Result<T, Error>;
