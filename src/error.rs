//! Error types
//!
//! `ApiError` covers everything that can go wrong talking to the remote API.
//! It is `Clone` because it travels inside `NetworkResponse` messages.
//! `ValidationError` is raised by the client before any request is made.

use thiserror::Error;

/// Failures of a remote API call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request failed: {0}")]
    Request(String),

    /// The server rejected the session token (HTTP 401)
    #[error("Session expired, please sign in again")]
    Unauthorized,

    /// Non-success status with the server's message, if it sent one
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_connect() {
            ApiError::Connect(e.to_string())
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Request(e.to_string())
        }
    }
}

/// Result alias for API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Client-side validation failures. These block submission and are never sent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Amount must be a number, got '{0}'")]
    InvalidAmount(String),

    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    #[error("Insufficient Cash Balance")]
    InsufficientBalance { amount: f64, balance: f64 },

    #[error("Select a category")]
    MissingCategory,

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Start date must not be after end date")]
    InvertedDateRange,

    #[error("Category title is required")]
    EmptyCategoryTitle,

    #[error("Category '{0}' already exists")]
    DuplicateCategory(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_message() {
        let err = ValidationError::InsufficientBalance {
            amount: 50.0,
            balance: 20.0,
        };
        assert_eq!(err.to_string(), "Insufficient Cash Balance");
    }

    #[test]
    fn test_status_error_shows_server_message() {
        let err = ApiError::Status {
            status: 400,
            message: "Email is not registered".to_string(),
        };
        assert_eq!(err.to_string(), "Email is not registered");
        assert!(!err.is_unauthorized());
        assert!(ApiError::Unauthorized.is_unauthorized());
    }
}
