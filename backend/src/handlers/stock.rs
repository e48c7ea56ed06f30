//! HTTP handlers for stock batch endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::StockBatch;
use crate::services::stock::{BatchQuery, ProductAvailability, RegisterBatchInput};
use crate::AppState;

/// List batches in consumption order
pub async fn list_batches(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
) -> Json<Vec<StockBatch>> {
    Json(state.stock_service().list_batches(&query))
}

/// Register a production batch
pub async fn register_batch(
    State(state): State<AppState>,
    Json(input): Json<RegisterBatchInput>,
) -> AppResult<(StatusCode, Json<StockBatch>)> {
    let batch = state.stock_service().register_batch(input).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

/// Get a batch by ID
pub async fn get_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<StockBatch>> {
    let batch = state.stock_service().get_batch(batch_id)?;
    Ok(Json(batch))
}

/// Available stock for one product
pub async fn get_product_availability(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Json<ProductAvailability> {
    Json(state.stock_service().availability(&product_id))
}
