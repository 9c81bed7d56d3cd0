// src/application/error_handling.rs
//
// User-facing error mapping
//
// ARCHITECTURE:
// - Maps internal errors → user-friendly responses
// - Provides a consistent error format for the view
// - Never exposes internal implementation details
// - Logs errors for debugging

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Standard error response for the view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
}

/// Error categories for the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Unknown book id
    NotFound,

    /// Rejected input (missing field, duplicate id)
    Validation,

    /// Unreadable import file or stored data
    Parse,

    /// Key-value storage failure
    Storage,

    /// SQLite / connection pool failure
    Database,

    /// Demo API failure
    ExternalService,

    /// File system error
    FileSystem,

    /// Other/unknown error
    Internal,
}

impl ErrorResponse {
    /// Create error response from AppError
    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::NotFound(_) => Self::new(ErrorType::NotFound, error.to_string(), None),

            AppError::Validation(domain_error) => {
                Self::new(ErrorType::Validation, domain_error.to_string(), None)
            }

            AppError::Parse(message) => {
                log::warn!("Parse error: {}", message);
                Self::new(ErrorType::Parse, "Invalid book data", Some(message))
            }

            AppError::Storage(message) => {
                log::error!("Storage error: {}", message);
                Self::new(ErrorType::Storage, "Storage operation failed", Some(message))
            }

            AppError::Database(db_error) => {
                log::error!("Database error: {:?}", db_error);
                Self::new(
                    ErrorType::Database,
                    "Database operation failed",
                    Some("Check logs for details".to_string()),
                )
            }

            AppError::Pool(pool_error) => {
                log::error!("Connection pool error: {}", pool_error);
                Self::new(ErrorType::Database, "Database connection failed", None)
            }

            AppError::Serialization(serde_error) => {
                log::error!("Serialization error: {:?}", serde_error);
                Self::new(ErrorType::Internal, "Data serialization failed", None)
            }

            AppError::Io(io_error) => {
                log::error!("IO error: {:?}", io_error);
                Self::new(
                    ErrorType::FileSystem,
                    "File system operation failed",
                    Some(io_error.to_string()),
                )
            }

            AppError::Http(http_error) => {
                log::error!("HTTP error: {}", http_error);
                Self::new(
                    ErrorType::ExternalService,
                    "External service error",
                    Some(http_error.to_string()),
                )
            }

            AppError::Config(message) => {
                log::error!("Configuration error: {}", message);
                Self::new(ErrorType::Internal, "Invalid configuration", Some(message))
            }

            AppError::Other(message) => {
                log::error!("Other error: {}", message);
                Self::new(ErrorType::Internal, message, None)
            }
        }
    }

    /// Toast text: the message, followed by the details when present
    pub fn display_message(&self) -> String {
        match &self.details {
            Some(details) => format!("{}: {}", self.message, details),
            None => self.message.clone(),
        }
    }

    fn new(error_type: ErrorType, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error_type,
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self::from_app_error(error)
    }
}
