//! Unified error handling for admin.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lifex_core::CredentialError;
use thiserror::Error;

use crate::db::RepositoryError;

/// Application-level error type for the admin site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Password could not be changed.
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Session(_) | Self::Credential(CredentialError::Storage(_))
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Credential(CredentialError::TooShort { .. }) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Session(_) | Self::Credential(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Don't expose internal details to clients
        let message = if self.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lifex_core::StorageError;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Credential(CredentialError::TooShort { min: 6, actual: 3 });
        assert_eq!(
            err.to_string(),
            "Credential error: password must be at least 6 characters (got 3)"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::Credential(CredentialError::TooShort {
                min: 6,
                actual: 3
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Credential(CredentialError::Storage(
                StorageError::Unavailable("down".to_string())
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Cache(
                StorageError::Unavailable("down".to_string())
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = AppError::Database(RepositoryError::Cache(StorageError::Unavailable(
            "connection refused at 10.0.0.5".to_string(),
        )));
        assert!(err.is_server_error());

        let err = AppError::Credential(CredentialError::TooShort { min: 6, actual: 3 });
        assert!(!err.is_server_error());
    }
}
