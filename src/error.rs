//! Global error handling module for the episode harvester
//!
//! This module provides a unified error type that handles all application
//! errors and converts them to appropriate HTTP responses with consistent
//! JSON structure.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::fetch::AdapterError;
use crate::models::ApiError;

/// Application-wide error type that unifies all error sources
#[derive(Debug, Error)]
pub enum AppError {
    /// A source adapter failed and no other tier could compensate
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// Every configured tier for the chosen mode returned zero records
    #[error("No episodes found; attempted tiers: {}", .attempted.join(", "))]
    NoEpisodesFound {
        /// Names of the tiers that were tried, in order
        attempted: Vec<String>,
    },

    /// The locator does not match any accepted shape for the chosen mode;
    /// raised before any network I/O
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    /// Validation errors (bad request)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Create an invalid-locator error
    pub fn invalid_locator(msg: impl Into<String>) -> Self {
        AppError::InvalidLocator(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request - caller supplied something unusable
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidLocator(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found - every tier exhausted without a record
            AppError::NoEpisodesFound { .. } => StatusCode::NOT_FOUND,

            // Adapter errors that surface directly
            AppError::Adapter(adapter_err) => match adapter_err {
                AdapterError::NotFound => StatusCode::NOT_FOUND,
                AdapterError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                AdapterError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                AdapterError::NetworkError(_) | AdapterError::MalformedResponse(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },

            // 500 Internal Server Error
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::InvalidLocator(msg) => format!("Invalid locator: {}", msg),
            AppError::Internal(msg) => msg.clone(),

            AppError::NoEpisodesFound { attempted } => format!(
                "No episodes found; attempted tiers: {}. Retry with a different source mode.",
                attempted.join(", ")
            ),

            AppError::Adapter(adapter_err) => match adapter_err {
                AdapterError::NotFound => "The requested content was not found upstream".to_string(),
                AdapterError::RateLimited => {
                    "Upstream is rate limiting requests, please try again later".to_string()
                }
                AdapterError::Timeout(secs) => {
                    format!("Upstream did not respond within {} seconds", secs)
                }
                AdapterError::NetworkError(msg) => format!("Failed to reach upstream: {}", msg),
                AdapterError::MalformedResponse(msg) => {
                    format!("Upstream returned an unreadable response: {}", msg)
                }
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_response = ApiError::new(self.user_message());

        HttpResponse::build(status).json(error_response)
    }
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_status_code() {
        let error = AppError::validation("Season must be at least 1");
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_locator_status_code() {
        let error = AppError::invalid_locator("not a content page URL");
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_no_episodes_found_status_code() {
        let error = AppError::NoEpisodesFound {
            attempted: vec!["embedded-json".to_string()],
        };
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_adapter_error_status_codes() {
        let error = AppError::Adapter(AdapterError::RateLimited);
        assert_eq!(error.status_code(), StatusCode::TOO_MANY_REQUESTS);

        let error = AppError::Adapter(AdapterError::Timeout(30));
        assert_eq!(error.status_code(), StatusCode::GATEWAY_TIMEOUT);

        let error = AppError::Adapter(AdapterError::NetworkError("refused".to_string()));
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);

        let error = AppError::Adapter(AdapterError::NotFound);
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_error_status_code() {
        let error = AppError::internal("Something went wrong");
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_no_episodes_found_lists_attempted_tiers() {
        let error = AppError::NoEpisodesFound {
            attempted: vec![
                "embedded-json".to_string(),
                "dom-query".to_string(),
                "regex-scan".to_string(),
            ],
        };
        let message = error.user_message();
        assert!(message.contains("embedded-json"));
        assert!(message.contains("dom-query"));
        assert!(message.contains("regex-scan"));
    }

    #[test]
    fn test_adapter_error_user_messages() {
        let error = AppError::Adapter(AdapterError::RateLimited);
        assert!(error.user_message().contains("rate limiting"));

        let error = AppError::Adapter(AdapterError::Timeout(10));
        assert!(error.user_message().contains("10 seconds"));
    }

    #[test]
    fn test_error_display() {
        let error = AppError::validation("test error");
        assert_eq!(format!("{}", error), "Validation error: test error");

        let error = AppError::invalid_locator("bad path");
        assert_eq!(format!("{}", error), "Invalid locator: bad path");
    }

    #[test]
    fn test_from_adapter_error() {
        let adapter_err = AdapterError::NetworkError("timeout".to_string());
        let app_err: AppError = adapter_err.into();
        assert!(matches!(app_err, AppError::Adapter(_)));
    }
}
