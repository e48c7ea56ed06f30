//! Stock ledger: the single source of truth for batch availability

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::SaleError;
use crate::models::{StockAllocation, StockBatch};

/// Owns every production batch, indexed by batch id.
///
/// Batches are only mutated through [`StockLedger::apply_consumption`], which
/// either applies a whole allocation set or leaves every batch untouched.
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    batches: BTreeMap<Uuid, StockBatch>,
    committed: BTreeSet<Uuid>,
    version: u64,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted batches and committed transaction ids.
    pub fn restore(
        batches: impl IntoIterator<Item = StockBatch>,
        committed: impl IntoIterator<Item = Uuid>,
    ) -> Result<Self, SaleError> {
        let mut ledger = Self::new();
        for batch in batches {
            ledger.insert_batch(batch)?;
        }
        ledger.committed.extend(committed);
        Ok(ledger)
    }

    /// Register a batch produced elsewhere
    pub fn insert_batch(&mut self, batch: StockBatch) -> Result<(), SaleError> {
        batch.check_invariants()?;
        if self.batches.contains_key(&batch.id) {
            return Err(SaleError::InvalidBatch {
                message: format!("Batch {} is already registered", batch.id),
            });
        }
        self.batches.insert(batch.id, batch);
        self.version += 1;
        Ok(())
    }

    pub fn batch(&self, id: &Uuid) -> Option<&StockBatch> {
        self.batches.get(id)
    }

    /// All batches in id order, including depleted ones
    pub fn batches(&self) -> impl Iterator<Item = &StockBatch> {
        self.batches.values()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Batches of `product_id` with stock left, oldest production first.
    ///
    /// Batches produced at the same instant are ordered by id so the order is
    /// total and allocation is reproducible.
    pub fn available_batches_for(&self, product_id: &str) -> Vec<&StockBatch> {
        let mut batches: Vec<&StockBatch> = self
            .batches
            .values()
            .filter(|b| b.product_id == product_id && b.remaining_kg > Decimal::ZERO)
            .collect();
        batches.sort_by(|a, b| {
            a.production_date
                .cmp(&b.production_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        batches
    }

    /// Total remaining kg across all batches of a product
    pub fn available_kg_for(&self, product_id: &str) -> Decimal {
        self.available_batches_for(product_id)
            .iter()
            .map(|b| b.remaining_kg)
            .sum()
    }

    /// Move allocated quantities from remaining to sold.
    ///
    /// Every allocation is checked against the current state before any batch
    /// is touched. Allocations that draw the same batch more than once are
    /// checked against their combined amount.
    pub fn apply_consumption(
        &mut self,
        allocations: &[StockAllocation],
        at: DateTime<Utc>,
    ) -> Result<(), SaleError> {
        let mut per_batch: BTreeMap<Uuid, Decimal> = BTreeMap::new();
        for allocation in allocations {
            if allocation.allocated_kg <= Decimal::ZERO {
                return Err(SaleError::InvalidQuantity {
                    quantity_kg: allocation.allocated_kg,
                });
            }
            *per_batch.entry(allocation.stock_id).or_insert(Decimal::ZERO) +=
                allocation.allocated_kg;
        }

        for (stock_id, kg) in &per_batch {
            let batch = self
                .batches
                .get(stock_id)
                .ok_or_else(|| SaleError::LedgerMutation {
                    message: format!("Unknown batch {}", stock_id),
                })?;
            if *kg > batch.remaining_kg {
                return Err(SaleError::InsufficientStock {
                    product_id: batch.product_id.clone(),
                    requested_kg: *kg,
                    available_kg: batch.remaining_kg,
                });
            }
        }

        for (stock_id, kg) in per_batch {
            if let Some(batch) = self.batches.get_mut(&stock_id) {
                batch.consume(kg, at);
            }
        }
        self.version += 1;
        Ok(())
    }

    /// Monotonic counter bumped on every mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn has_committed(&self, transaction_id: Uuid) -> bool {
        self.committed.contains(&transaction_id)
    }

    pub(crate) fn record_commit(&mut self, transaction_id: Uuid) {
        self.committed.insert(transaction_id);
    }

    pub fn committed_transactions(&self) -> impl Iterator<Item = &Uuid> {
        self.committed.iter()
    }
}
