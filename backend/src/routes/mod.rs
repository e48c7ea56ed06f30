//! Route definitions for the seafood stock API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/stock", stock_routes())
        .nest("/sales", sales_routes())
}

fn stock_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/batches",
            get(handlers::list_batches).post(handlers::register_batch),
        )
        .route("/batches/:batch_id", get(handlers::get_batch))
        .route(
            "/products/:product_id/availability",
            get(handlers::get_product_availability),
        )
}

fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::commit_sale))
        .route("/preview", post(handlers::preview_sale))
        .route("/:transaction_id", get(handlers::get_sale))
}
