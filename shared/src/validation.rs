//! Validation utilities for sale requests and production batches

use rust_decimal::Decimal;

use crate::error::SaleError;
use crate::models::{NewStockBatch, SaleRequestLine};

/// Largest quantity a sale line or a batch may carry
pub const MAX_QUANTITY_KG: i64 = 1_000_000;
/// Largest price or cost per kg
pub const MAX_PRICE_PER_KG: i64 = 1_000_000;
/// Quantities are tracked to the gram
pub const QUANTITY_SCALE: u32 = 3;
pub const PRICE_SCALE: u32 = 4;
pub const MAX_CUSTOMER_NAME_CHARS: usize = 200;

fn exceeds_scale(value: Decimal, scale: u32) -> bool {
    value.normalize().scale() > scale
}

// ============================================================================
// Sale Request Validations
// ============================================================================

/// Validate the customer name is present (whitespace-only counts as missing)
/// and fits the transaction record
pub fn validate_customer_name(customer_name: &str) -> Result<(), SaleError> {
    let customer_name = customer_name.trim();
    if customer_name.is_empty() {
        return Err(SaleError::MissingCustomer);
    }
    if customer_name.chars().count() > MAX_CUSTOMER_NAME_CHARS {
        return Err(SaleError::InvalidCustomer {
            max_chars: MAX_CUSTOMER_NAME_CHARS,
        });
    }
    Ok(())
}

/// Validate the quantity and price of a sale line.
///
/// Returns every problem found on the line, in field order. Lines without a
/// product are blank form rows and are never flagged.
pub fn validate_sale_line(index: usize, line: &SaleRequestLine) -> Vec<SaleError> {
    let mut errors = Vec::new();
    if line.product().is_none() {
        return errors;
    }

    let invalid = |field: &str, message: String| SaleError::InvalidLine {
        line: index,
        field: field.to_string(),
        message,
    };

    let quantity = if line.requested_kg <= Decimal::ZERO {
        Some("Quantity must be greater than zero".to_string())
    } else if line.requested_kg > Decimal::from(MAX_QUANTITY_KG) {
        Some(format!("Quantity cannot exceed {} kg", MAX_QUANTITY_KG))
    } else if exceeds_scale(line.requested_kg, QUANTITY_SCALE) {
        Some(format!("Quantity can have at most {} decimal places", QUANTITY_SCALE))
    } else {
        None
    };
    if let Some(message) = quantity {
        errors.push(invalid("requestedKg", message));
    }

    let price = if line.price_per_kg <= Decimal::ZERO {
        Some("Price per kg must be greater than zero".to_string())
    } else if line.price_per_kg > Decimal::from(MAX_PRICE_PER_KG) {
        Some(format!("Price per kg cannot exceed {}", MAX_PRICE_PER_KG))
    } else if exceeds_scale(line.price_per_kg, PRICE_SCALE) {
        Some(format!("Price per kg can have at most {} decimal places", PRICE_SCALE))
    } else {
        None
    };
    if let Some(message) = price {
        errors.push(invalid("pricePerKg", message));
    }

    errors
}

/// Validate a requested or allocated quantity
pub fn validate_quantity(quantity_kg: Decimal) -> Result<(), SaleError> {
    if quantity_kg <= Decimal::ZERO {
        return Err(SaleError::InvalidQuantity { quantity_kg });
    }
    Ok(())
}

// ============================================================================
// Batch Validations
// ============================================================================

/// Validate batch number format (1-64 chars, alphanumeric plus `-`, `_`, `/`)
pub fn validate_batch_number(batch_number: &str) -> Result<(), &'static str> {
    let batch_number = batch_number.trim();
    if batch_number.is_empty() {
        return Err("Batch number is required");
    }
    if batch_number.len() > 64 {
        return Err("Batch number must be at most 64 characters");
    }
    if !batch_number
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/'))
    {
        return Err("Batch number may only contain letters, digits, '-', '_' and '/'");
    }
    Ok(())
}

/// Validate a production event before it becomes a batch
pub fn validate_new_batch(input: &NewStockBatch) -> Result<(), SaleError> {
    if input.product_id.trim().is_empty() {
        return Err(SaleError::InvalidBatch {
            message: "Product is required".to_string(),
        });
    }
    validate_batch_number(&input.batch_number).map_err(|message| SaleError::InvalidBatch {
        message: message.to_string(),
    })?;
    validate_quantity(input.total_kg)?;
    if input.cost_per_kg < Decimal::ZERO {
        return Err(SaleError::InvalidBatch {
            message: "Cost per kg cannot be negative".to_string(),
        });
    }
    validate_batch_bounds(input.total_kg, input.cost_per_kg)
}

/// Upper bounds and precision for a batch's weight and cost basis.
///
/// Together with the sale line bounds these keep every cost, revenue and
/// margin computed from a batch within `Decimal` range.
pub fn validate_batch_bounds(total_kg: Decimal, cost_per_kg: Decimal) -> Result<(), SaleError> {
    let message = if total_kg > Decimal::from(MAX_QUANTITY_KG) {
        format!("Total weight cannot exceed {} kg", MAX_QUANTITY_KG)
    } else if exceeds_scale(total_kg, QUANTITY_SCALE) {
        format!("Total weight can have at most {} decimal places", QUANTITY_SCALE)
    } else if cost_per_kg > Decimal::from(MAX_PRICE_PER_KG) {
        format!("Cost per kg cannot exceed {}", MAX_PRICE_PER_KG)
    } else if exceeds_scale(cost_per_kg, PRICE_SCALE) {
        format!("Cost per kg can have at most {} decimal places", PRICE_SCALE)
    } else {
        return Ok(());
    };
    Err(SaleError::InvalidBatch { message })
}
