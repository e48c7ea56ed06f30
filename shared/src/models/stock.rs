//! Finished-goods stock models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SaleError;

/// A production run of one product with its own cost basis.
///
/// `remaining_kg + sold_kg == total_kg` holds for every batch the ledger
/// hands out, and `is_available` always mirrors `remaining_kg > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockBatch {
    pub id: Uuid,
    /// Opaque product catalog key
    pub product_id: String,
    /// Human-readable lot label (e.g. "SAL-2024-031")
    pub batch_number: String,
    /// Defines FIFO order
    pub production_date: DateTime<Utc>,
    pub total_kg: Decimal,
    pub sold_kg: Decimal,
    pub remaining_kg: Decimal,
    pub cost_per_kg: Decimal,
    pub is_available: bool,
    pub packaging_type: PackagingType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How a batch was packed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackagingType {
    Frozen,
    Chilled,
    VacuumPacked,
    Canned,
    Dried,
    Bulk,
}

impl PackagingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackagingType::Frozen => "frozen",
            PackagingType::Chilled => "chilled",
            PackagingType::VacuumPacked => "vacuum_packed",
            PackagingType::Canned => "canned",
            PackagingType::Dried => "dried",
            PackagingType::Bulk => "bulk",
        }
    }
}

impl std::str::FromStr for PackagingType {
    type Err = SaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frozen" => Ok(PackagingType::Frozen),
            "chilled" => Ok(PackagingType::Chilled),
            "vacuum_packed" => Ok(PackagingType::VacuumPacked),
            "canned" => Ok(PackagingType::Canned),
            "dried" => Ok(PackagingType::Dried),
            "bulk" => Ok(PackagingType::Bulk),
            other => Err(SaleError::InvalidBatch {
                message: format!("Unknown packaging type '{}'", other),
            }),
        }
    }
}

impl std::fmt::Display for PackagingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackagingType::Frozen => write!(f, "Frozen"),
            PackagingType::Chilled => write!(f, "Chilled"),
            PackagingType::VacuumPacked => write!(f, "Vacuum Packed"),
            PackagingType::Canned => write!(f, "Canned"),
            PackagingType::Dried => write!(f, "Dried"),
            PackagingType::Bulk => write!(f, "Bulk"),
        }
    }
}

/// Production event input for a new batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStockBatch {
    pub product_id: String,
    pub batch_number: String,
    pub production_date: DateTime<Utc>,
    pub total_kg: Decimal,
    pub cost_per_kg: Decimal,
    pub packaging_type: PackagingType,
}

impl StockBatch {
    /// Create a fresh, unsold batch from a production event.
    pub fn produce(id: Uuid, input: NewStockBatch, now: DateTime<Utc>) -> Result<Self, SaleError> {
        crate::validation::validate_new_batch(&input)?;

        Ok(Self {
            id,
            product_id: input.product_id.trim().to_string(),
            batch_number: input.batch_number.trim().to_string(),
            production_date: input.production_date,
            total_kg: input.total_kg,
            sold_kg: Decimal::ZERO,
            remaining_kg: input.total_kg,
            cost_per_kg: input.cost_per_kg,
            is_available: input.total_kg > Decimal::ZERO,
            packaging_type: input.packaging_type,
            created_at: now,
            updated_at: now,
        })
    }

    /// Check the conservation invariant and the derived availability flag.
    pub fn check_invariants(&self) -> Result<(), SaleError> {
        if self.remaining_kg < Decimal::ZERO || self.sold_kg < Decimal::ZERO {
            return Err(SaleError::InvalidBatch {
                message: format!("Batch {} has a negative quantity", self.batch_number),
            });
        }
        if self.remaining_kg + self.sold_kg != self.total_kg {
            return Err(SaleError::InvalidBatch {
                message: format!(
                    "Batch {}: remaining {} kg + sold {} kg does not equal total {} kg",
                    self.batch_number, self.remaining_kg, self.sold_kg, self.total_kg
                ),
            });
        }
        if self.is_available != (self.remaining_kg > Decimal::ZERO) {
            return Err(SaleError::InvalidBatch {
                message: format!("Batch {} has a stale availability flag", self.batch_number),
            });
        }
        crate::validation::validate_batch_bounds(self.total_kg, self.cost_per_kg)
    }

    /// Move `kg` from remaining to sold. Callers must have checked `kg <= remaining_kg`.
    pub(crate) fn consume(&mut self, kg: Decimal, now: DateTime<Utc>) {
        self.remaining_kg -= kg;
        self.sold_kg += kg;
        self.is_available = self.remaining_kg > Decimal::ZERO;
        self.updated_at = now;
    }
}

/// The portion of one request line drawn from one batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAllocation {
    pub stock_id: Uuid,
    pub batch_number: String,
    pub product_id: String,
    /// Position of the request line this allocation serves
    pub line_index: usize,
    pub allocated_kg: Decimal,
    /// Copied from the batch at allocation time
    pub cost_per_kg: Decimal,
    /// Copied from the request line
    pub price_per_kg: Decimal,
    pub available_kg_at_allocation_time: Decimal,
}

impl StockAllocation {
    /// Same batch, line, weight and prices. Ignores how much the batch held
    /// when the draw was computed.
    pub fn draws_same_as(&self, other: &Self) -> bool {
        self.stock_id == other.stock_id
            && self.line_index == other.line_index
            && self.allocated_kg == other.allocated_kg
            && self.cost_per_kg == other.cost_per_kg
            && self.price_per_kg == other.price_per_kg
    }

    pub fn cost(&self) -> Decimal {
        self.allocated_kg * self.cost_per_kg
    }

    pub fn revenue(&self) -> Decimal {
        self.allocated_kg * self.price_per_kg
    }
}
