//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub persistence: String,
    pub database: String,
    pub ledger_version: u64,
    pub batch_count: usize,
    pub committed_transactions: usize,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match &state.store {
        Some(store) if store.ping().await => "connected",
        Some(_) => "disconnected",
        None => "not_configured",
    };
    let snapshot = state.ledger.snapshot();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        persistence: state.config.persistence_mode().to_string(),
        database: database.to_string(),
        ledger_version: snapshot.version(),
        batch_count: snapshot.len(),
        committed_transactions: snapshot.committed_transactions().count(),
    })
}
