//! Sale request, preview and transaction models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StockAllocation;
use crate::error::SaleError;

/// One line of a prospective sale as entered by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequestLine {
    /// Empty form rows have no product and are ignored
    #[serde(default)]
    pub product_id: Option<String>,
    pub requested_kg: Decimal,
    pub price_per_kg: Decimal,
}

impl SaleRequestLine {
    pub fn new(product_id: impl Into<String>, requested_kg: Decimal, price_per_kg: Decimal) -> Self {
        Self {
            product_id: Some(product_id.into()),
            requested_kg,
            price_per_kg,
        }
    }

    /// The product key, if one was chosen
    pub fn product(&self) -> Option<&str> {
        self.product_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// A complete sale request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    /// Client-generated idempotency key; becomes the transaction id
    pub transaction_id: Uuid,
    pub customer_name: String,
    pub sale_date: NaiveDate,
    pub lines: Vec<SaleRequestLine>,
}

/// Non-mutating outcome of a prospective sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePreview {
    pub total_kg: Decimal,
    pub total_cost: Decimal,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    /// `total_profit / total_revenue`, zero without revenue
    pub profit_margin: Decimal,
    pub allocations: Vec<StockAllocation>,
    pub is_valid: bool,
    pub errors: Vec<SaleError>,
}

impl SalePreview {
    /// Profit margin as a percentage rounded to two decimal places
    pub fn profit_margin_percent(&self) -> Decimal {
        (self.profit_margin * Decimal::ONE_HUNDRED).round_dp(2)
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// One consumed batch within a committed sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_id: String,
    pub stock_id: Uuid,
    pub batch_number: String,
    pub allocated_kg: Decimal,
    pub price_per_kg: Decimal,
    pub cost_per_kg: Decimal,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
}

/// A committed sale. Never edited after creation; corrections are new transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTransaction {
    pub id: Uuid,
    pub sale_date: NaiveDate,
    pub customer_name: String,
    pub items: Vec<SaleItem>,
    pub total_kg: Decimal,
    pub total_cost: Decimal,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub profit_margin: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Aggregate totals shared by previews and transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaleTotals {
    pub total_kg: Decimal,
    pub total_cost: Decimal,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub profit_margin: Decimal,
}

impl SaleTotals {
    pub fn from_allocations<'a>(allocations: impl IntoIterator<Item = &'a StockAllocation>) -> Self {
        let mut totals = Self::default();
        for allocation in allocations {
            totals.total_kg += allocation.allocated_kg;
            totals.total_cost += allocation.cost();
            totals.total_revenue += allocation.revenue();
        }
        totals.total_profit = totals.total_revenue - totals.total_cost;
        totals.profit_margin = profit_margin(totals.total_revenue, totals.total_profit);
        totals
    }
}

/// `profit / revenue`, or zero when there is no revenue
pub fn profit_margin(total_revenue: Decimal, total_profit: Decimal) -> Decimal {
    if total_revenue > Decimal::ZERO {
        total_profit / total_revenue
    } else {
        Decimal::ZERO
    }
}
