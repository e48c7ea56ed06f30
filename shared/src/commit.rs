//! Sale commit: re-validate against current stock and mutate the ledger once

use chrono::{DateTime, Utc};

use crate::error::{SaleError, SaleErrors};
use crate::ledger::StockLedger;
use crate::models::{SaleItem, SalePreview, SaleRequest, SaleTransaction, StockAllocation};
use crate::preview::preview_sale;

/// Turn a confirmed preview into a committed [`SaleTransaction`].
///
/// The preview is recomputed against the ledger as it is now. If validity or
/// the batch split differs from what the user confirmed, the commit fails with
/// [`SaleError::StalePreview`]. Other sales that drained the same batches
/// without changing this split do not make the preview stale. A transaction
/// id can be committed only once.
/// On any error the ledger is left exactly as it was.
pub fn commit_sale(
    ledger: &mut StockLedger,
    request: &SaleRequest,
    confirmed: &SalePreview,
    now: DateTime<Utc>,
) -> Result<SaleTransaction, SaleErrors> {
    if ledger.has_committed(request.transaction_id) {
        return Err(SaleError::DuplicateTransaction {
            transaction_id: request.transaction_id,
        }
        .into());
    }

    let fresh = preview_sale(ledger, request);
    if fresh.is_valid != confirmed.is_valid
        || !same_split(&fresh.allocations, &confirmed.allocations)
    {
        return Err(SaleError::StalePreview.into());
    }
    if let Some(errors) = SaleErrors::new(fresh.errors.clone()) {
        return Err(errors);
    }

    ledger.apply_consumption(&fresh.allocations, now)?;
    ledger.record_commit(request.transaction_id);

    Ok(SaleTransaction {
        id: request.transaction_id,
        sale_date: request.sale_date,
        customer_name: request.customer_name.trim().to_string(),
        items: sale_items(&fresh.allocations),
        total_kg: fresh.total_kg,
        total_cost: fresh.total_cost,
        total_revenue: fresh.total_revenue,
        total_profit: fresh.total_profit,
        profit_margin: fresh.profit_margin,
        created_at: now,
    })
}

/// Whether two allocation lists draw the same kg from the same batches
pub fn same_split(fresh: &[StockAllocation], confirmed: &[StockAllocation]) -> bool {
    fresh.len() == confirmed.len()
        && fresh
            .iter()
            .zip(confirmed)
            .all(|(a, b)| a.draws_same_as(b))
}

/// One item per consumed batch and price, in allocation order
fn sale_items(allocations: &[StockAllocation]) -> Vec<SaleItem> {
    let mut items: Vec<SaleItem> = Vec::with_capacity(allocations.len());

    for allocation in allocations {
        let existing = items.iter_mut().find(|item| {
            item.stock_id == allocation.stock_id && item.price_per_kg == allocation.price_per_kg
        });
        match existing {
            Some(item) => {
                item.allocated_kg += allocation.allocated_kg;
                item.revenue += allocation.revenue();
                item.cost += allocation.cost();
                item.profit = item.revenue - item.cost;
            }
            None => items.push(SaleItem {
                product_id: allocation.product_id.clone(),
                stock_id: allocation.stock_id,
                batch_number: allocation.batch_number.clone(),
                allocated_kg: allocation.allocated_kg,
                price_per_kg: allocation.price_per_kg,
                cost_per_kg: allocation.cost_per_kg,
                revenue: allocation.revenue(),
                cost: allocation.cost(),
                profit: allocation.revenue() - allocation.cost(),
            }),
        }
    }
    items
}
