//! Error types for a sweep run
//!
//! Every `SweepError` is fatal: it aborts the run and the binary exits
//! non-zero. Per-file revocation failures never become a `SweepError`; they
//! are recorded in the revocation report instead.

use thiserror::Error;

use crate::google_api::GoogleApiError;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sheet '{0}' has no header row")]
    EmptySheet(String),

    #[error("Email column not found within the first {span} columns")]
    EmailColumnNotFound { span: usize },

    #[error("Google API: {0}")]
    Google(#[from] GoogleApiError),
}

impl SweepError {
    /// Raw API response body, when the failure came back from Google.
    pub fn details(&self) -> Option<&str> {
        match self {
            SweepError::Google(err) => err.response_body(),
            _ => None,
        }
    }

    /// Get a user-facing recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SweepError::Config(_) => "Check the sweep config file.",
            SweepError::Io(_) => "Check file permissions on the config and token paths.",
            SweepError::EmptySheet(_) => "Verify the spreadsheet id points at the roster.",
            SweepError::EmailColumnNotFound { .. } => {
                "Add an 'Email' header to the roster or widen columnSpan."
            }
            SweepError::Google(GoogleApiError::AuthExpired)
            | SweepError::Google(GoogleApiError::TokenNotFound(_)) => {
                "Re-authorize and place a fresh token.json at the configured tokenPath."
            }
            SweepError::Google(_) => "Check network access and the sheet/file sharing settings.",
        }
    }
}
