//! Sales service: preview and commit against the shared ledger

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use shared::{
    commit_sale, preview_sale, DateRange, PaginatedResponse, Pagination, SalePreview,
    SaleRequest, SaleTransaction,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::{HistoryFilter, LedgerHandle, PgStockStore, TransactionHistory};

#[derive(Clone)]
pub struct SalesService {
    ledger: LedgerHandle,
    history: TransactionHistory,
    store: Option<PgStockStore>,
}

/// Commit body: the request plus the preview the user confirmed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSaleInput {
    pub request: SaleRequest,
    pub confirmed_preview: SalePreview,
}

/// Query parameters for the transaction history
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSalesQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub customer: Option<String>,
}

impl ListSalesQuery {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }

    fn filter(&self) -> AppResult<HistoryFilter> {
        let date_range = match (self.from, self.to) {
            (None, None) => None,
            (from, to) => {
                let range = DateRange {
                    start: from.unwrap_or(NaiveDate::MIN),
                    end: to.unwrap_or(NaiveDate::MAX),
                };
                if range.start > range.end {
                    return Err(AppError::Validation {
                        field: "from".to_string(),
                        message: "Start date must not be after end date".to_string(),
                    });
                }
                Some(range)
            }
        };

        Ok(HistoryFilter {
            date_range,
            customer: self
                .customer
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        })
    }
}

impl SalesService {
    pub fn new(
        ledger: LedgerHandle,
        history: TransactionHistory,
        store: Option<PgStockStore>,
    ) -> Self {
        Self {
            ledger,
            history,
            store,
        }
    }

    /// Compute a preview against the latest snapshot. Never mutates stock.
    pub fn preview(&self, request: &SaleRequest) -> SalePreview {
        let snapshot = self.ledger.snapshot();
        let preview = preview_sale(&snapshot, request);

        tracing::debug!(
            transaction_id = %request.transaction_id,
            ledger_version = snapshot.version(),
            is_valid = preview.is_valid,
            allocations = preview.allocations.len(),
            errors = preview.errors.len(),
            "Sale previewed"
        );

        preview
    }

    /// Commit a confirmed sale.
    ///
    /// Runs on a copy of the ledger under the writer lock. The copy replaces
    /// the live ledger only after the database write (when configured) has
    /// committed, so a failure at any step leaves stock untouched.
    pub async fn commit(&self, input: CommitSaleInput) -> AppResult<SaleTransaction> {
        let CommitSaleInput {
            request,
            confirmed_preview,
        } = input;

        let mut ledger = self.ledger.lock().await;
        let mut draft = ledger.clone();

        let transaction = match commit_sale(&mut draft, &request, &confirmed_preview, Utc::now())
        {
            Ok(transaction) => transaction,
            Err(errors) => {
                tracing::warn!(
                    transaction_id = %request.transaction_id,
                    ledger_version = ledger.version(),
                    errors = %errors,
                    "Sale commit rejected"
                );
                return Err(errors.into());
            }
        };

        if let Some(store) = &self.store {
            store.persist_sale(&transaction).await?;
        }

        *ledger = draft;
        self.ledger.publish(&ledger);
        self.history.record(transaction.clone()).await;

        tracing::info!(
            transaction_id = %transaction.id,
            customer = %transaction.customer_name,
            items = transaction.items.len(),
            total_kg = %transaction.total_kg,
            total_revenue = %transaction.total_revenue,
            ledger_version = ledger.version(),
            "Sale committed"
        );

        Ok(transaction)
    }

    pub async fn list_transactions(
        &self,
        query: &ListSalesQuery,
    ) -> AppResult<PaginatedResponse<SaleTransaction>> {
        let filter = query.filter()?;
        Ok(self.history.list(&filter, &query.pagination()).await)
    }

    pub async fn get_transaction(&self, transaction_id: Uuid) -> AppResult<SaleTransaction> {
        self.history
            .get(transaction_id)
            .await
            .ok_or_else(|| AppError::NotFound("Sale transaction".to_string()))
    }
}
