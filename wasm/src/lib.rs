//! WebAssembly bindings for the seafood stock engine
//!
//! Lets the sales form compute FIFO allocations and sale previews in the
//! browser from a batch list it already holds. Results are advisory; the
//! server re-validates every commit.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use shared::{SaleRequest, StockBatch, StockLedger};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;

fn ledger_from_json(batches_json: &str) -> Result<StockLedger, String> {
    let batches: Vec<StockBatch> =
        serde_json::from_str(batches_json).map_err(|e| format!("Invalid batches JSON: {}", e))?;
    StockLedger::restore(batches, []).map_err(|e| e.to_string())
}

/// Preview a sale against the given batches; returns the preview as JSON
pub fn preview_sale_json(batches_json: &str, request_json: &str) -> Result<String, String> {
    let ledger = ledger_from_json(batches_json)?;
    let request: SaleRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid request JSON: {}", e))?;

    let preview = shared::preview_sale(&ledger, &request);
    serde_json::to_string(&preview).map_err(|e| e.to_string())
}

/// FIFO allocation for one product; returns the outcome as JSON
pub fn allocate_fifo_json(
    batches_json: &str,
    product_id: &str,
    requested_kg: Decimal,
) -> Result<String, String> {
    let ledger = ledger_from_json(batches_json)?;
    let outcome =
        shared::allocate_fifo(&ledger, product_id, requested_kg).map_err(|e| e.to_string())?;
    serde_json::to_string(&outcome).map_err(|e| e.to_string())
}

fn to_js_object(json: Result<String, String>) -> Result<JsValue, JsValue> {
    let json = json.map_err(|e| JsValue::from_str(&e))?;
    js_sys::JSON::parse(&json)
}

/// Preview a sale. `batches_json` is an array of stock batches,
/// `request_json` a sale request.
#[wasm_bindgen]
pub fn preview_sale(batches_json: &str, request_json: &str) -> Result<JsValue, JsValue> {
    to_js_object(preview_sale_json(batches_json, request_json))
}

/// Allocate `requested_kg` of one product oldest batch first
#[wasm_bindgen]
pub fn allocate_fifo(
    batches_json: &str,
    product_id: &str,
    requested_kg: f64,
) -> Result<JsValue, JsValue> {
    let requested_kg = Decimal::try_from(requested_kg)
        .map_err(|_| JsValue::from_str("Requested quantity is not a finite number"))?;
    to_js_object(allocate_fifo_json(batches_json, product_id, requested_kg))
}

/// Profit margin as a percentage rounded to two decimal places
#[wasm_bindgen]
pub fn profit_margin_percent(total_revenue: f64, total_profit: f64) -> f64 {
    let (Ok(revenue), Ok(profit)) = (Decimal::try_from(total_revenue), Decimal::try_from(total_profit))
    else {
        return 0.0;
    };
    (shared::profit_margin(revenue, profit) * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .to_f64()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn batches() -> String {
        json!([
            {
                "id": "00000000-0000-0000-0000-000000000002",
                "productId": "MACKEREL-WHOLE",
                "batchNumber": "MW-02",
                "productionDate": "2024-04-03T05:00:00Z",
                "totalKg": "30", "soldKg": "0", "remainingKg": "30",
                "costPerKg": "4.50", "isAvailable": true, "packagingType": "frozen",
                "createdAt": "2024-04-03T05:00:00Z", "updatedAt": "2024-04-03T05:00:00Z"
            },
            {
                "id": "00000000-0000-0000-0000-000000000001",
                "productId": "MACKEREL-WHOLE",
                "batchNumber": "MW-01",
                "productionDate": "2024-04-01T05:00:00Z",
                "totalKg": "50", "soldKg": "0", "remainingKg": "50",
                "costPerKg": "4.00", "isAvailable": true, "packagingType": "frozen",
                "createdAt": "2024-04-01T05:00:00Z", "updatedAt": "2024-04-01T05:00:00Z"
            }
        ])
        .to_string()
    }

    fn request(kg: &str) -> String {
        json!({
            "transactionId": "7d3c1b0e-6a2f-4f55-9c57-0d4c3b6a9e11",
            "customerName": "Danang Harbour Foods",
            "saleDate": "2024-04-05",
            "lines": [{ "productId": "MACKEREL-WHOLE", "requestedKg": kg, "pricePerKg": "8.00" }]
        })
        .to_string()
    }

    #[test]
    fn test_preview_json_uses_oldest_batch_first() {
        let preview: Value =
            serde_json::from_str(&preview_sale_json(&batches(), &request("60")).unwrap()).unwrap();

        assert_eq!(preview["isValid"], true);
        assert_eq!(preview["allocations"][0]["batchNumber"], "MW-01");
        assert_eq!(preview["allocations"][1]["batchNumber"], "MW-02");
    }

    #[test]
    fn test_preview_json_reports_shortfall() {
        let preview: Value =
            serde_json::from_str(&preview_sale_json(&batches(), &request("90")).unwrap()).unwrap();

        assert_eq!(preview["isValid"], false);
        assert_eq!(preview["errors"][0]["code"], "insufficient_stock");
    }

    #[test]
    fn test_allocate_json_reports_unmet_quantity() {
        let outcome: Value = serde_json::from_str(
            &allocate_fifo_json(&batches(), "MACKEREL-WHOLE", Decimal::from(85)).unwrap(),
        )
        .unwrap();

        assert_eq!(outcome["allocations"].as_array().unwrap().len(), 2);
        assert_eq!(outcome["unmetKg"].as_str().unwrap().parse::<Decimal>().unwrap(), Decimal::from(5));
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(preview_sale_json("not json", &request("1")).is_err());
        assert!(allocate_fifo_json("[]", "MACKEREL-WHOLE", Decimal::ZERO).is_err());
    }

    #[test]
    fn test_profit_margin_percent() {
        assert!((profit_margin_percent(480.0, 235.0) - 48.96).abs() < 1e-9);
        assert_eq!(profit_margin_percent(0.0, 0.0), 0.0);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_allocate_returns_object() {
        let value = allocate_fifo("[]", "MACKEREL-WHOLE", 1.0).unwrap();
        assert!(value.is_object());
    }
}
