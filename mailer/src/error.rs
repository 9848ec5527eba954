//! Typed errors for digest delivery.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while authenticating or sending a message.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// OAuth client registration file is missing
    #[error(
        "credentials file '{}' not found; download an OAuth client (Desktop app) from the Google Cloud Console",
        path.display()
    )]
    MissingCredentials { path: PathBuf },

    /// Credentials or token file could not be parsed
    #[error("invalid {what}: {reason}")]
    InvalidCredentials { what: &'static str, reason: String },

    /// Interactive consent flow failed
    #[error("authorization failed: {0}")]
    Consent(String),

    /// Send attempted before authentication
    #[error("mail service not authenticated; call authenticate() first")]
    NotAuthenticated,

    /// Remote API answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeliveryError>;
