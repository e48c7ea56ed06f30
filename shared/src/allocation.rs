//! FIFO allocation of a requested quantity across production batches

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SaleError;
use crate::ledger::StockLedger;
use crate::models::StockAllocation;
use crate::validation::validate_quantity;

/// Best-effort allocation for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationOutcome {
    pub product_id: String,
    pub requested_kg: Decimal,
    pub allocations: Vec<StockAllocation>,
    /// `requested_kg - allocated`, positive when stock ran out
    pub unmet_kg: Decimal,
}

impl AllocationOutcome {
    pub fn allocated_kg(&self) -> Decimal {
        self.allocations.iter().map(|a| a.allocated_kg).sum()
    }

    pub fn is_fulfilled(&self) -> bool {
        self.unmet_kg <= Decimal::ZERO
    }
}

/// Read-only FIFO allocator over a ledger snapshot.
///
/// Remembers what earlier calls drew from each batch, so several lines of the
/// same sale never claim the same kilograms twice.
#[derive(Debug)]
pub struct FifoAllocator<'a> {
    ledger: &'a StockLedger,
    drawn: HashMap<Uuid, Decimal>,
}

impl<'a> FifoAllocator<'a> {
    pub fn new(ledger: &'a StockLedger) -> Self {
        Self {
            ledger,
            drawn: HashMap::new(),
        }
    }

    fn drawn_from(&self, stock_id: &Uuid) -> Decimal {
        self.drawn.get(stock_id).copied().unwrap_or(Decimal::ZERO)
    }

    /// Kilograms of a product not yet claimed by this allocator
    pub fn available_kg(&self, product_id: &str) -> Decimal {
        self.ledger
            .available_batches_for(product_id)
            .iter()
            .map(|b| (b.remaining_kg - self.drawn_from(&b.id)).max(Decimal::ZERO))
            .sum()
    }

    /// Split `requested_kg` across the product's batches, oldest first.
    ///
    /// Running out of stock is not an error here; the shortfall is reported
    /// as `unmet_kg`.
    pub fn allocate(
        &mut self,
        product_id: &str,
        requested_kg: Decimal,
        line_index: usize,
        price_per_kg: Decimal,
    ) -> Result<AllocationOutcome, SaleError> {
        validate_quantity(requested_kg)?;

        let mut outstanding = requested_kg;
        let mut allocations = Vec::new();

        for batch in self.ledger.available_batches_for(product_id) {
            if outstanding <= Decimal::ZERO {
                break;
            }
            let available = batch.remaining_kg - self.drawn_from(&batch.id);
            if available <= Decimal::ZERO {
                continue;
            }

            let take = outstanding.min(available);
            allocations.push(StockAllocation {
                stock_id: batch.id,
                batch_number: batch.batch_number.clone(),
                product_id: batch.product_id.clone(),
                line_index,
                allocated_kg: take,
                cost_per_kg: batch.cost_per_kg,
                price_per_kg,
                available_kg_at_allocation_time: available,
            });
            *self.drawn.entry(batch.id).or_insert(Decimal::ZERO) += take;
            outstanding -= take;
        }

        Ok(AllocationOutcome {
            product_id: product_id.to_string(),
            requested_kg,
            allocations,
            unmet_kg: outstanding,
        })
    }
}

/// Allocate a single request against a fresh view of the ledger
pub fn allocate_fifo(
    ledger: &StockLedger,
    product_id: &str,
    requested_kg: Decimal,
) -> Result<AllocationOutcome, SaleError> {
    FifoAllocator::new(ledger).allocate(product_id, requested_kg, 0, Decimal::ZERO)
}
