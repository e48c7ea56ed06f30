//! HTTP handlers for sale preview, commit and history

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{PaginatedResponse, SalePreview, SaleRequest, SaleTransaction};
use crate::services::sales::{CommitSaleInput, ListSalesQuery};
use crate::AppState;

/// Preview a sale. Always 200; validity and errors are in the body.
pub async fn preview_sale(
    State(state): State<AppState>,
    Json(request): Json<SaleRequest>,
) -> Json<SalePreview> {
    Json(state.sales_service().preview(&request))
}

/// Commit a confirmed sale
pub async fn commit_sale(
    State(state): State<AppState>,
    Json(input): Json<CommitSaleInput>,
) -> AppResult<(StatusCode, Json<SaleTransaction>)> {
    let transaction = state.sales_service().commit(input).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Transaction history, newest first
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<ListSalesQuery>,
) -> AppResult<Json<PaginatedResponse<SaleTransaction>>> {
    let page = state.sales_service().list_transactions(&query).await?;
    Ok(Json(page))
}

pub async fn get_sale(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<Json<SaleTransaction>> {
    let transaction = state.sales_service().get_transaction(transaction_id).await?;
    Ok(Json(transaction))
}
