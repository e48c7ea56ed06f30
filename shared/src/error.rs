//! Error taxonomy for stock allocation and sale commits
//!
//! Every failure is returned as a value. Previews collect them into
//! [`SalePreview::errors`](crate::models::SalePreview); commits return them as
//! a [`SaleErrors`] list.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum SaleError {
    #[error("Quantity must be greater than zero (got {quantity_kg} kg)")]
    InvalidQuantity { quantity_kg: Decimal },

    #[error("Line {}: {message}", .line + 1)]
    InvalidLine {
        line: usize,
        field: String,
        message: String,
    },

    #[error("Customer name is required")]
    MissingCustomer,

    #[error("Customer name must be at most {max_chars} characters")]
    InvalidCustomer { max_chars: usize },

    #[error("Sale has no valid lines")]
    EmptySale,

    #[error(
        "Insufficient stock for product {product_id}: requested {requested_kg} kg, available {available_kg} kg"
    )]
    InsufficientStock {
        product_id: String,
        requested_kg: Decimal,
        available_kg: Decimal,
    },

    #[error("Stock changed since the preview was computed; refresh the preview and try again")]
    StalePreview,

    #[error("Transaction {transaction_id} has already been committed")]
    DuplicateTransaction { transaction_id: Uuid },

    #[error("Invalid batch: {message}")]
    InvalidBatch { message: String },

    /// Internal-consistency fault detected while applying a consumption
    #[error("Ledger mutation rejected: {message}")]
    LedgerMutation { message: String },
}

impl SaleError {
    /// Stable machine-readable code, identical to the serialized `code` tag
    pub fn code(&self) -> &'static str {
        match self {
            SaleError::InvalidQuantity { .. } => "invalid_quantity",
            SaleError::InvalidLine { .. } => "invalid_line",
            SaleError::MissingCustomer => "missing_customer",
            SaleError::InvalidCustomer { .. } => "invalid_customer",
            SaleError::EmptySale => "empty_sale",
            SaleError::InsufficientStock { .. } => "insufficient_stock",
            SaleError::StalePreview => "stale_preview",
            SaleError::DuplicateTransaction { .. } => "duplicate_transaction",
            SaleError::InvalidBatch { .. } => "invalid_batch",
            SaleError::LedgerMutation { .. } => "ledger_mutation",
        }
    }
}

/// A non-empty list of errors returned by a rejected commit. Only built
/// through [`SaleErrors::new`] or from a single error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SaleErrors(Vec<SaleError>);

impl SaleErrors {
    /// Wrap a list of errors. Returns `None` for an empty list.
    pub fn new(errors: Vec<SaleError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    pub fn errors(&self) -> &[SaleError] {
        &self.0
    }

    pub fn first(&self) -> &SaleError {
        &self.0[0]
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|e| e.code() == code)
    }

    pub fn into_inner(self) -> Vec<SaleError> {
        self.0
    }
}

impl From<SaleError> for SaleErrors {
    fn from(error: SaleError) -> Self {
        Self(vec![error])
    }
}

impl std::fmt::Display for SaleErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for SaleErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message_names_quantities() {
        let error = SaleError::InsufficientStock {
            product_id: "TUNA-LOIN".to_string(),
            requested_kg: Decimal::from(90),
            available_kg: Decimal::from(80),
        };
        assert_eq!(
            error.to_string(),
            "Insufficient stock for product TUNA-LOIN: requested 90 kg, available 80 kg"
        );
    }

    #[test]
    fn test_invalid_line_is_one_based_in_message() {
        let error = SaleError::InvalidLine {
            line: 0,
            field: "requestedKg".to_string(),
            message: "Quantity must be greater than zero".to_string(),
        };
        assert_eq!(error.to_string(), "Line 1: Quantity must be greater than zero");
    }

    #[test]
    fn test_serialized_code_matches_code() {
        let errors = [
            SaleError::MissingCustomer,
            SaleError::InvalidCustomer { max_chars: 200 },
            SaleError::EmptySale,
            SaleError::StalePreview,
            SaleError::DuplicateTransaction {
                transaction_id: Uuid::nil(),
            },
            SaleError::LedgerMutation {
                message: "x".to_string(),
            },
        ];
        for error in errors {
            let json = serde_json::to_value(&error).unwrap();
            assert_eq!(json["code"], error.code());
        }
    }

    #[test]
    fn test_sale_errors_rejects_empty_list() {
        assert!(SaleErrors::new(vec![]).is_none());
        let errors = SaleErrors::new(vec![SaleError::EmptySale, SaleError::MissingCustomer]).unwrap();
        assert!(errors.contains("missing_customer"));
        assert_eq!(errors.to_string(), "Sale has no valid lines; Customer name is required");
    }
}
