//! Error Handling Infrastructure
//!
//! This module defines all error types used throughout Phrasebook.
//! All errors are structured and map to specific error codes for programmatic handling.
//!
//! # Error Categories
//! - `Validation`: Missing mandatory credentials or malformed init commands
//! - `ConnectionFailed`: Database connection errors
//! - `QueryFailed`: Lookup execution errors
//! - `Decode`: Stored payloads that cannot be decoded
//! - `Settings`: Settings artifact I/O errors

use thiserror::Error;

/// Main error type for Phrasebook operations
#[derive(Error, Debug)]
pub enum PhrasebookError {
    /// Missing mandatory credentials or malformed init command
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Database connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Lookup execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// Stored payload could not be decoded
    #[error("Payload decode failed: {0}")]
    Decode(String),

    /// Settings artifact error (unwritable path, invalid location, etc.)
    #[error("Settings error: {0}")]
    Settings(String),
}

impl PhrasebookError {
    /// Convert error to error code string
    ///
    /// Error codes are stable and suitable for programmatic handling by callers.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::ConnectionFailed(_) => "CONNECTION_FAILED",
            Self::QueryFailed(_) => "QUERY_FAILED",
            Self::Decode(_) => "DECODE_FAILED",
            Self::Settings(_) => "SETTINGS_ERROR",
        }
    }

    /// Get human-readable error message (no sensitive data)
    ///
    /// This message never contains credential values.
    #[must_use]
    pub fn message(&self) -> String {
        // Use Display implementation from thiserror
        self.to_string()
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed(message.into())
    }

    /// Create a query failed error
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::QueryFailed(message.into())
    }

    /// Create a payload decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create a settings artifact error
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings(message.into())
    }
}

/// Result type alias for Phrasebook operations
pub type Result<T> = std::result::Result<T, PhrasebookError>;
