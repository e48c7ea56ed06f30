//! Stock service: batch registration and availability queries

use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{NewStockBatch, PackagingType, StockBatch, StockLedger};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::{LedgerHandle, PgStockStore};

#[derive(Clone)]
pub struct StockService {
    ledger: LedgerHandle,
    store: Option<PgStockStore>,
}

/// Input for registering a production batch
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBatchInput {
    #[validate(length(min = 1, max = 64, message = "Product is required"))]
    pub product_id: String,
    #[validate(length(min = 1, max = 64, message = "Batch number must be 1-64 characters"))]
    pub batch_number: String,
    /// Defaults to the time of registration
    pub production_date: Option<DateTime<Utc>>,
    pub total_kg: Decimal,
    pub cost_per_kg: Decimal,
    pub packaging_type: PackagingType,
}

impl RegisterBatchInput {
    fn into_new_batch(self, now: DateTime<Utc>) -> NewStockBatch {
        NewStockBatch {
            product_id: self.product_id,
            batch_number: self.batch_number,
            production_date: self.production_date.unwrap_or(now),
            total_kg: self.total_kg,
            cost_per_kg: self.cost_per_kg,
            packaging_type: self.packaging_type,
        }
    }
}

/// Query parameters for listing batches
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchQuery {
    pub product_id: Option<String>,
    pub include_depleted: Option<bool>,
}

/// Current availability of one product
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAvailability {
    pub product_id: String,
    pub available_kg: Decimal,
    pub batch_count: usize,
    /// Available batches in consumption order
    pub batches: Vec<StockBatch>,
    pub ledger_version: u64,
}

impl StockService {
    pub fn new(ledger: LedgerHandle, store: Option<PgStockStore>) -> Self {
        Self { ledger, store }
    }

    pub async fn register_batch(&self, input: RegisterBatchInput) -> AppResult<StockBatch> {
        input.validate()?;

        let now = Utc::now();
        let batch = StockBatch::produce(Uuid::new_v4(), input.into_new_batch(now), now)?;

        let mut ledger = self.ledger.lock().await;
        let mut draft = ledger.clone();
        draft.insert_batch(batch.clone())?;

        if let Some(store) = &self.store {
            store.insert_batch(&batch).await?;
        }

        *ledger = draft;
        self.ledger.publish(&ledger);

        tracing::info!(
            batch_id = %batch.id,
            product_id = %batch.product_id,
            batch_number = %batch.batch_number,
            total_kg = %batch.total_kg,
            "Stock batch registered"
        );

        Ok(batch)
    }

    /// Batches in FIFO order, grouped by product when no product is given
    pub fn list_batches(&self, query: &BatchQuery) -> Vec<StockBatch> {
        let snapshot = self.ledger.snapshot();
        let include_depleted = query.include_depleted.unwrap_or(false);
        let product = query
            .product_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        let mut batches: Vec<StockBatch> = snapshot
            .batches()
            .filter(|b| product.map_or(true, |p| b.product_id == p))
            .filter(|b| include_depleted || b.is_available)
            .cloned()
            .collect();
        batches.sort_by(|a, b| {
            a.product_id
                .cmp(&b.product_id)
                .then(a.production_date.cmp(&b.production_date))
                .then(a.id.cmp(&b.id))
        });
        batches
    }

    pub fn get_batch(&self, batch_id: Uuid) -> AppResult<StockBatch> {
        self.ledger
            .snapshot()
            .batch(&batch_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Stock batch".to_string()))
    }

    pub fn availability(&self, product_id: &str) -> ProductAvailability {
        let snapshot = self.ledger.snapshot();
        let product_id = product_id.trim();
        let batches: Vec<StockBatch> = snapshot
            .available_batches_for(product_id)
            .into_iter()
            .cloned()
            .collect();

        ProductAvailability {
            product_id: product_id.to_string(),
            available_kg: snapshot.available_kg_for(product_id),
            batch_count: batches.len(),
            batches,
            ledger_version: snapshot.version(),
        }
    }
}

/// Build the initial ledger from a JSON array of production events
pub fn load_seed_file(path: impl AsRef<Path>) -> anyhow::Result<StockLedger> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let inputs: Vec<NewStockBatch> = serde_json::from_str(&contents)?;

    let now = Utc::now();
    let mut ledger = StockLedger::new();
    for input in inputs {
        ledger.insert_batch(StockBatch::produce(Uuid::new_v4(), input, now)?)?;
    }

    tracing::info!(
        path = %path.display(),
        batches = ledger.len(),
        "Seeded stock ledger"
    );
    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input(product: &str, batch_number: &str, day: u32, kg: i64) -> RegisterBatchInput {
        RegisterBatchInput {
            product_id: product.to_string(),
            batch_number: batch_number.to_string(),
            production_date: Some(Utc.with_ymd_and_hms(2024, 6, day, 6, 0, 0).unwrap()),
            total_kg: Decimal::from(kg),
            cost_per_kg: Decimal::from(4),
            packaging_type: PackagingType::Frozen,
        }
    }

    fn service() -> StockService {
        StockService::new(LedgerHandle::new(StockLedger::new()), None)
    }

    #[tokio::test]
    async fn test_register_publishes_snapshot() {
        let service = service();
        let batch = service
            .register_batch(input("SQUID-RING", "SR-01", 2, 40))
            .await
            .unwrap();

        assert_eq!(batch.remaining_kg, Decimal::from(40));
        assert_eq!(service.get_batch(batch.id).unwrap().id, batch.id);
        assert_eq!(
            service.availability("SQUID-RING").available_kg,
            Decimal::from(40)
        );
    }

    #[tokio::test]
    async fn test_register_rejects_blank_product() {
        let err = service()
            .register_batch(input("", "SR-01", 2, 40))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_register_rejects_negative_weight() {
        let err = service()
            .register_batch(input("SQUID-RING", "SR-01", 2, -1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Sale(_)));
    }

    #[tokio::test]
    async fn test_list_orders_by_production_date() {
        let service = service();
        service.register_batch(input("SQUID-RING", "SR-02", 9, 10)).await.unwrap();
        service.register_batch(input("SQUID-RING", "SR-01", 2, 10)).await.unwrap();
        service.register_batch(input("CRAB-MEAT", "CM-01", 5, 10)).await.unwrap();

        let query = BatchQuery {
            product_id: Some("SQUID-RING".to_string()),
            include_depleted: None,
        };
        let numbers: Vec<String> = service
            .list_batches(&query)
            .into_iter()
            .map(|b| b.batch_number)
            .collect();
        assert_eq!(numbers, vec!["SR-01", "SR-02"]);
        assert_eq!(service.list_batches(&BatchQuery::default()).len(), 3);
    }

    #[test]
    fn test_unknown_batch_is_not_found() {
        let err = service().get_batch(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
