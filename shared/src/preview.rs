//! Sale preview: cost out and validate a whole request without touching stock

use crate::allocation::FifoAllocator;
use crate::error::SaleError;
use crate::ledger::StockLedger;
use crate::models::{SalePreview, SaleRequest, SaleTotals};
use crate::validation::{validate_customer_name, validate_sale_line};

/// Compute the outcome of a prospective sale against the current ledger.
///
/// Pure: the same ledger state and request always yield the same preview.
/// Totals are computed from what could actually be allocated, even when the
/// request as a whole is invalid.
pub fn preview_sale(ledger: &StockLedger, request: &SaleRequest) -> SalePreview {
    let mut allocator = FifoAllocator::new(ledger);
    let mut allocations = Vec::new();
    let mut errors = Vec::new();
    let mut valid_lines = 0usize;

    for (index, line) in request.lines.iter().enumerate() {
        let Some(product_id) = line.product() else {
            continue;
        };

        let line_errors = validate_sale_line(index, line);
        if !line_errors.is_empty() {
            errors.extend(line_errors);
            continue;
        }
        valid_lines += 1;

        match allocator.allocate(product_id, line.requested_kg, index, line.price_per_kg) {
            Ok(outcome) => {
                if !outcome.is_fulfilled() {
                    errors.push(SaleError::InsufficientStock {
                        product_id: product_id.to_string(),
                        requested_kg: line.requested_kg,
                        available_kg: outcome.allocated_kg(),
                    });
                }
                allocations.extend(outcome.allocations);
            }
            Err(error) => errors.push(error),
        }
    }

    if let Err(error) = validate_customer_name(&request.customer_name) {
        errors.push(error);
    }
    if valid_lines == 0 {
        errors.push(SaleError::EmptySale);
    }

    let totals = SaleTotals::from_allocations(&allocations);

    SalePreview {
        total_kg: totals.total_kg,
        total_cost: totals.total_cost,
        total_revenue: totals.total_revenue,
        total_profit: totals.total_profit,
        profit_margin: totals.profit_margin,
        allocations,
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewStockBatch, PackagingType, SaleRequestLine, StockBatch};
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn ledger() -> StockLedger {
        let produced = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let batch = |id: u128, product: &str, kg: i64, cost: i64| {
            StockBatch::produce(
                Uuid::from_u128(id),
                NewStockBatch {
                    product_id: product.to_string(),
                    batch_number: format!("LOT-{}", id),
                    production_date: produced,
                    total_kg: Decimal::from(kg),
                    cost_per_kg: Decimal::from(cost),
                    packaging_type: PackagingType::Chilled,
                },
                produced,
            )
            .unwrap()
        };
        StockLedger::restore(
            vec![batch(1, "MACKEREL", 40, 3), batch(2, "SARDINE", 25, 2)],
            vec![],
        )
        .unwrap()
    }

    fn request(lines: Vec<SaleRequestLine>) -> SaleRequest {
        SaleRequest {
            transaction_id: Uuid::from_u128(500),
            customer_name: "Harbour Foods".to_string(),
            sale_date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            lines,
        }
    }

    #[test]
    fn test_multi_product_totals() {
        let preview = preview_sale(
            &ledger(),
            &request(vec![
                SaleRequestLine::new("MACKEREL", Decimal::from(10), Decimal::from(5)),
                SaleRequestLine::new("SARDINE", Decimal::from(20), Decimal::from(3)),
            ]),
        );

        assert!(preview.is_valid, "{:?}", preview.errors);
        assert_eq!(preview.total_kg, Decimal::from(30));
        assert_eq!(preview.total_cost, Decimal::from(70));
        assert_eq!(preview.total_revenue, Decimal::from(110));
        assert_eq!(preview.total_profit, Decimal::from(40));
        assert_eq!(preview.allocations.len(), 2);
        assert_eq!(preview.allocations[1].line_index, 1);
    }

    #[test]
    fn test_blank_rows_are_ignored() {
        let preview = preview_sale(
            &ledger(),
            &request(vec![
                SaleRequestLine {
                    product_id: None,
                    requested_kg: Decimal::ZERO,
                    price_per_kg: Decimal::ZERO,
                },
                SaleRequestLine::new("SARDINE", Decimal::from(5), Decimal::from(3)),
            ]),
        );
        assert!(preview.is_valid);
        assert_eq!(preview.allocations[0].line_index, 1);
    }

    #[test]
    fn test_invalid_lines_are_flagged_and_skipped() {
        let preview = preview_sale(
            &ledger(),
            &request(vec![
                SaleRequestLine::new("MACKEREL", Decimal::ZERO, Decimal::from(5)),
                SaleRequestLine::new("SARDINE", Decimal::from(5), Decimal::ZERO),
            ]),
        );

        assert!(!preview.is_valid);
        assert!(preview.allocations.is_empty());
        let codes: Vec<&str> = preview.errors.iter().map(SaleError::code).collect();
        assert_eq!(codes, vec!["invalid_line", "invalid_line", "empty_sale"]);
        assert_eq!(preview.total_revenue, Decimal::ZERO);
        assert_eq!(preview.profit_margin, Decimal::ZERO);
    }

    #[test]
    fn test_out_of_range_lines_are_flagged_not_costed() {
        let preview = preview_sale(
            &ledger(),
            &request(vec![
                SaleRequestLine::new("MACKEREL", Decimal::from(5), Decimal::MAX),
                SaleRequestLine::new("SARDINE", Decimal::MAX, Decimal::from(3)),
                SaleRequestLine::new("SARDINE", Decimal::new(1, 6), Decimal::from(3)),
            ]),
        );

        assert!(!preview.is_valid);
        assert!(preview.allocations.is_empty());
        let fields: Vec<&str> = preview
            .errors
            .iter()
            .filter_map(|e| match e {
                SaleError::InvalidLine { field, .. } => Some(field.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fields, vec!["pricePerKg", "requestedKg", "requestedKg"]);
        assert_eq!(preview.errors.last(), Some(&SaleError::EmptySale));
        assert_eq!(preview.total_cost, Decimal::ZERO);
    }

    #[test]
    fn test_overlong_customer_name_is_reported() {
        let mut req = request(vec![SaleRequestLine::new(
            "SARDINE",
            Decimal::from(5),
            Decimal::from(3),
        )]);
        req.customer_name = "Harbour Foods ".repeat(20);
        let preview = preview_sale(&ledger(), &req);

        assert!(!preview.is_valid);
        assert_eq!(preview.errors, vec![SaleError::InvalidCustomer { max_chars: 200 }]);
        // Costing still runs
        assert_eq!(preview.total_revenue, Decimal::from(15));
    }

    #[test]
    fn test_no_lines_is_empty_sale() {
        let preview = preview_sale(&ledger(), &request(vec![]));
        assert_eq!(preview.errors, vec![SaleError::EmptySale]);
    }

    #[test]
    fn test_two_lines_share_one_product_without_over_allocating() {
        let preview = preview_sale(
            &ledger(),
            &request(vec![
                SaleRequestLine::new("MACKEREL", Decimal::from(30), Decimal::from(5)),
                SaleRequestLine::new("MACKEREL", Decimal::from(15), Decimal::from(6)),
            ]),
        );

        assert!(!preview.is_valid);
        assert_eq!(
            preview.errors,
            vec![SaleError::InsufficientStock {
                product_id: "MACKEREL".to_string(),
                requested_kg: Decimal::from(15),
                available_kg: Decimal::from(10),
            }]
        );
        assert_eq!(preview.total_kg, Decimal::from(40));
    }

    #[test]
    fn test_error_order_lines_then_customer_then_empty() {
        let mut req = request(vec![SaleRequestLine::new(
            "MACKEREL",
            Decimal::from(-1),
            Decimal::from(5),
        )]);
        req.customer_name = String::new();
        let preview = preview_sale(&ledger(), &req);
        let codes: Vec<&str> = preview.errors.iter().map(SaleError::code).collect();
        assert_eq!(codes, vec!["invalid_line", "missing_customer", "empty_sale"]);
    }
}
