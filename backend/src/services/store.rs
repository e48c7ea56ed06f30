//! PostgreSQL write-through for batches and committed sales
//!
//! The in-memory ledger stays the source of truth for allocation. This store
//! only persists what the ledger has already accepted and restores it on boot.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{SaleError, SaleItem, SaleTransaction, StockBatch};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppResult;

#[derive(Clone)]
pub struct PgStockStore {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct BatchRow {
    id: Uuid,
    product_id: String,
    batch_number: String,
    production_date: DateTime<Utc>,
    total_kg: Decimal,
    sold_kg: Decimal,
    remaining_kg: Decimal,
    cost_per_kg: Decimal,
    is_available: bool,
    packaging_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BatchRow> for StockBatch {
    type Error = SaleError;

    fn try_from(row: BatchRow) -> Result<Self, Self::Error> {
        Ok(StockBatch {
            id: row.id,
            product_id: row.product_id,
            batch_number: row.batch_number,
            production_date: row.production_date,
            total_kg: row.total_kg,
            sold_kg: row.sold_kg,
            remaining_kg: row.remaining_kg,
            cost_per_kg: row.cost_per_kg,
            is_available: row.is_available,
            packaging_type: row.packaging_type.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    sale_date: NaiveDate,
    customer_name: String,
    total_kg: Decimal,
    total_cost: Decimal,
    total_revenue: Decimal,
    total_profit: Decimal,
    profit_margin: Decimal,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ItemRow {
    transaction_id: Uuid,
    product_id: String,
    stock_id: Uuid,
    batch_number: String,
    allocated_kg: Decimal,
    price_per_kg: Decimal,
    cost_per_kg: Decimal,
    revenue: Decimal,
    cost: Decimal,
    profit: Decimal,
}

impl From<ItemRow> for SaleItem {
    fn from(row: ItemRow) -> Self {
        SaleItem {
            product_id: row.product_id,
            stock_id: row.stock_id,
            batch_number: row.batch_number,
            allocated_kg: row.allocated_kg,
            price_per_kg: row.price_per_kg,
            cost_per_kg: row.cost_per_kg,
            revenue: row.revenue,
            cost: row.cost,
            profit: row.profit,
        }
    }
}

impl PgStockStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }

    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.db).await.is_ok()
    }

    pub async fn load_batches(&self) -> AppResult<Vec<StockBatch>> {
        let rows = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT id, product_id, batch_number, production_date, total_kg, sold_kg,
                   remaining_kg, cost_per_kg, is_available, packaging_type,
                   created_at, updated_at
            FROM stock_batches
            ORDER BY production_date, id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let batches = rows
            .into_iter()
            .map(StockBatch::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    /// Committed transactions with their items, oldest first
    pub async fn load_transactions(&self) -> AppResult<Vec<SaleTransaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, sale_date, customer_name, total_kg, total_cost, total_revenue,
                   total_profit, profit_margin, created_at
            FROM sale_transactions
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let item_rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT transaction_id, product_id, stock_id, batch_number, allocated_kg,
                   price_per_kg, cost_per_kg, revenue, cost, profit
            FROM sale_items
            ORDER BY transaction_id, position
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut items: HashMap<Uuid, Vec<SaleItem>> = HashMap::new();
        for row in item_rows {
            items.entry(row.transaction_id).or_default().push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| SaleTransaction {
                items: items.remove(&row.id).unwrap_or_default(),
                id: row.id,
                sale_date: row.sale_date,
                customer_name: row.customer_name,
                total_kg: row.total_kg,
                total_cost: row.total_cost,
                total_revenue: row.total_revenue,
                total_profit: row.total_profit,
                profit_margin: row.profit_margin,
                created_at: row.created_at,
            })
            .collect())
    }

    pub async fn insert_batch(&self, batch: &StockBatch) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_batches (
                id, product_id, batch_number, production_date, total_kg, sold_kg,
                remaining_kg, cost_per_kg, is_available, packaging_type,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(batch.id)
        .bind(&batch.product_id)
        .bind(&batch.batch_number)
        .bind(batch.production_date)
        .bind(batch.total_kg)
        .bind(batch.sold_kg)
        .bind(batch.remaining_kg)
        .bind(batch.cost_per_kg)
        .bind(batch.is_available)
        .bind(batch.packaging_type.as_str())
        .bind(batch.created_at)
        .bind(batch.updated_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Persist a committed sale and decrement its batches in one database
    /// transaction. Any failure rolls the whole write back.
    pub async fn persist_sale(&self, transaction: &SaleTransaction) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO sale_transactions (
                id, sale_date, customer_name, total_kg, total_cost, total_revenue,
                total_profit, profit_margin, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(transaction.id)
        .bind(transaction.sale_date)
        .bind(&transaction.customer_name)
        .bind(transaction.total_kg)
        .bind(transaction.total_cost)
        .bind(transaction.total_revenue)
        .bind(transaction.total_profit)
        .bind(transaction.profit_margin)
        .bind(transaction.created_at)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(SaleError::DuplicateTransaction {
                transaction_id: transaction.id,
            }
            .into());
        }

        for (position, item) in transaction.items.iter().enumerate() {
            let updated = sqlx::query(
                r#"
                UPDATE stock_batches
                SET remaining_kg = remaining_kg - $1,
                    sold_kg = sold_kg + $1,
                    is_available = remaining_kg - $1 > 0,
                    updated_at = $2
                WHERE id = $3 AND remaining_kg >= $1
                "#,
            )
            .bind(item.allocated_kg)
            .bind(transaction.created_at)
            .bind(item.stock_id)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(SaleError::LedgerMutation {
                    message: format!(
                        "Batch {} could not be decremented by {} kg",
                        item.batch_number, item.allocated_kg
                    ),
                }
                .into());
            }

            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    transaction_id, position, product_id, stock_id, batch_number,
                    allocated_kg, price_per_kg, cost_per_kg, revenue, cost, profit
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(transaction.id)
            .bind(position as i32)
            .bind(&item.product_id)
            .bind(item.stock_id)
            .bind(&item.batch_number)
            .bind(item.allocated_kg)
            .bind(item.price_per_kg)
            .bind(item.cost_per_kg)
            .bind(item.revenue)
            .bind(item.cost)
            .bind(item.profit)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
