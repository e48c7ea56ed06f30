//! In-process read model of committed sale transactions

use std::sync::Arc;

use shared::{DateRange, PaginatedResponse, Pagination, SaleTransaction};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Filter for listing transactions
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub date_range: Option<DateRange>,
    /// Case-insensitive substring of the customer name
    pub customer: Option<String>,
}

impl HistoryFilter {
    fn matches(&self, transaction: &SaleTransaction) -> bool {
        let in_range = self
            .date_range
            .as_ref()
            .map_or(true, |range| range.contains(transaction.sale_date));
        let customer_matches = self.customer.as_ref().map_or(true, |needle| {
            transaction
                .customer_name
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        in_range && customer_matches
    }
}

/// Append-only list of committed transactions
#[derive(Clone, Default)]
pub struct TransactionHistory {
    transactions: Arc<RwLock<Vec<SaleTransaction>>>,
}

impl TransactionHistory {
    pub fn new(transactions: Vec<SaleTransaction>) -> Self {
        Self {
            transactions: Arc::new(RwLock::new(transactions)),
        }
    }

    pub async fn record(&self, transaction: SaleTransaction) {
        self.transactions.write().await.push(transaction);
    }

    pub async fn get(&self, id: Uuid) -> Option<SaleTransaction> {
        self.transactions
            .read()
            .await
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    /// Matching transactions, newest first
    pub async fn list(
        &self,
        filter: &HistoryFilter,
        pagination: &Pagination,
    ) -> PaginatedResponse<SaleTransaction> {
        let transactions = self.transactions.read().await;
        let mut matching: Vec<SaleTransaction> = transactions
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        pagination.paginate(&matching)
    }

    pub async fn len(&self) -> usize {
        self.transactions.read().await.len()
    }
}
