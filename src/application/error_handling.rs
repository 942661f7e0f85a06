// src/application/error_handling.rs
//
// Error Handling for Commands
//
// ARCHITECTURE:
// - Maps internal errors → user-visible, non-fatal responses
// - Provides consistent error format for the UI
// - Never exposes internal implementation details
// - Logs errors for debugging

use log::error;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Standard error response for UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
}

/// Error categories for UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Unknown entry id (404)
    NotFound,

    /// Input rejected before any request was made (400)
    Validation,

    /// Missing or rejected session (401)
    NotAuthenticated,

    /// Another change to the same entry is still in flight (409)
    Conflict,

    /// Library backend or catalog failure (502)
    ExternalService,

    /// Unreadable or invalid configuration
    Configuration,

    /// File system error (500)
    FileSystem,

    /// Other/unknown error (500)
    Internal,
}

impl ErrorResponse {
    /// Create error response from AppError
    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::NotFound(what) => Self::not_found(&what),

            AppError::Validation(domain_error) => Self {
                success: false,
                error_type: ErrorType::Validation,
                message: "Invalid input".to_string(),
                details: Some(domain_error.to_string()),
            },

            AppError::NotAuthenticated => Self {
                success: false,
                error_type: ErrorType::NotAuthenticated,
                message: "Sign in to sync your library".to_string(),
                details: None,
            },

            AppError::MutationInProgress(entry_id) => Self {
                success: false,
                error_type: ErrorType::Conflict,
                message: "Another change to this entry is still being saved".to_string(),
                details: Some(entry_id),
            },

            AppError::Transport(message) => {
                error!("Remote call failed: {}", message);

                Self {
                    success: false,
                    error_type: ErrorType::ExternalService,
                    message: "Could not reach the library service".to_string(),
                    details: Some(message),
                }
            }

            AppError::Config(message) => Self {
                success: false,
                error_type: ErrorType::Configuration,
                message: "Configuration is invalid".to_string(),
                details: Some(message),
            },

            AppError::Serialization(serde_error) => {
                error!("Serialization error: {:?}", serde_error);

                Self {
                    success: false,
                    error_type: ErrorType::Internal,
                    message: "Data serialization failed".to_string(),
                    details: None,
                }
            }

            AppError::Io(io_error) => {
                error!("IO error: {:?}", io_error);

                Self {
                    success: false,
                    error_type: ErrorType::FileSystem,
                    message: "File system operation failed".to_string(),
                    details: Some(io_error.to_string()),
                }
            }
        }
    }

    /// Create validation error
    pub fn validation(message: String) -> Self {
        Self {
            success: false,
            error_type: ErrorType::Validation,
            message,
            details: None,
        }
    }

    /// Create not found error
    pub fn not_found(resource: &str) -> Self {
        Self {
            success: false,
            error_type: ErrorType::NotFound,
            message: format!("{} not found", resource),
            details: None,
        }
    }
}

/// Helper trait to convert Results to ErrorResponse
pub trait ToErrorResponse<T> {
    fn to_error_response(self) -> Result<T, String>;
}

impl<T> ToErrorResponse<T> for Result<T, AppError> {
    fn to_error_response(self) -> Result<T, String> {
        self.map_err(|e| {
            let error_response = ErrorResponse::from_app_error(e);
            serde_json::to_string(&error_response).unwrap_or_else(|_| "Internal error".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn test_not_found_error() {
        let error = ErrorResponse::from_app_error(AppError::NotFound("Entry 7".to_string()));
        assert_eq!(error.error_type, ErrorType::NotFound);
        assert_eq!(error.message, "Entry 7 not found");
    }

    #[test]
    fn test_validation_error_keeps_domain_detail() {
        let error = ErrorResponse::from_app_error(AppError::Validation(DomainError::EmptyTitle));
        assert_eq!(error.error_type, ErrorType::Validation);
        assert_eq!(error.details.as_deref(), Some("Title is required"));
    }

    #[test]
    fn test_transport_and_conflict() {
        let transport =
            ErrorResponse::from_app_error(AppError::Transport("HTTP 500".to_string()));
        assert_eq!(transport.error_type, ErrorType::ExternalService);

        let conflict = ErrorResponse::from_app_error(AppError::MutationInProgress("1".to_string()));
        assert_eq!(conflict.error_type, ErrorType::Conflict);
        assert_eq!(conflict.details.as_deref(), Some("1"));
    }

    #[test]
    fn test_serialization() {
        let result: Result<(), AppError> = Err(AppError::NotAuthenticated);
        let json = result.to_error_response().unwrap_err();
        assert!(json.contains("not_authenticated"));
        assert!(json.contains("\"success\":false"));
    }
}
