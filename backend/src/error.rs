//! Error handling for the seafood stock service
//!
//! Provides consistent JSON error responses. Engine errors keep their
//! machine-readable codes so the UI can decide how to present them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{SaleError, SaleErrors};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Engine errors
    #[error("Sale rejected: {0}")]
    Sale(SaleErrors),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

impl From<SaleError> for AppError {
    fn from(error: SaleError) -> Self {
        AppError::Sale(error.into())
    }
}

impl From<SaleErrors> for AppError {
    fn from(errors: SaleErrors) -> Self {
        AppError::Sale(errors)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("request".to_string(), errors.to_string()));
        AppError::Validation { field, message }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    /// Full engine error list when a sale was rejected
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<SaleError>,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// HTTP status for an engine error
fn sale_error_status(error: &SaleError) -> StatusCode {
    match error {
        SaleError::StalePreview | SaleError::DuplicateTransaction { .. } => StatusCode::CONFLICT,
        SaleError::LedgerMutation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        SaleError::InvalidQuantity { .. }
        | SaleError::InvalidLine { .. }
        | SaleError::MissingCustomer
        | SaleError::InvalidCustomer { .. }
        | SaleError::EmptySale
        | SaleError::InsufficientStock { .. }
        | SaleError::InvalidBatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Sale(errors) => errors
                .errors()
                .iter()
                .map(sale_error_status)
                .max_by_key(|s| s.as_u16())
                .unwrap_or(StatusCode::UNPROCESSABLE_ENTITY),
            AppError::DatabaseError(_) | AppError::MigrationError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_detail, errors) = match &self {
            AppError::Validation { field, message } => (
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
                Vec::new(),
            ),
            AppError::NotFound(resource) => (
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                },
                Vec::new(),
            ),
            AppError::Sale(sale_errors) => {
                let first = sale_errors.first();
                (
                    ErrorDetail {
                        code: first.code().to_uppercase(),
                        message: first.to_string(),
                        field: None,
                    },
                    sale_errors.errors().to_vec(),
                )
            }
            AppError::DatabaseError(_) | AppError::MigrationError(_) => (
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message: "A database error occurred".to_string(),
                    field: None,
                },
                Vec::new(),
            ),
        };

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: error_detail,
                errors,
            }),
        )
            .into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_stock_errors_are_unprocessable() {
        let error: AppError = SaleError::EmptySale.into();
        assert_eq!(error.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_conflicts_win_over_validation() {
        let errors =
            SaleErrors::new(vec![SaleError::MissingCustomer, SaleError::StalePreview]).unwrap();
        assert_eq!(AppError::Sale(errors).status(), StatusCode::CONFLICT);

        let duplicate: AppError = SaleError::DuplicateTransaction {
            transaction_id: Uuid::nil(),
        }
        .into();
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_customer_errors_are_unprocessable() {
        let error: AppError = SaleError::InvalidCustomer { max_chars: 200 }.into();
        assert_eq!(error.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_database_errors_are_server_errors() {
        let error: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_ledger_fault_is_server_error() {
        let error: AppError = SaleError::LedgerMutation {
            message: "negative remaining".to_string(),
        }
        .into();
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(
            AppError::NotFound("Batch".to_string()).status(),
            StatusCode::NOT_FOUND
        );
    }
}
