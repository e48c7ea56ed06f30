//! Seafood finished-goods stock service
//!
//! Holds the FIFO stock ledger in memory, serves sale previews from published
//! snapshots and serialises commits through a single writer. PostgreSQL is an
//! optional write-through store.

use std::{sync::Arc, time::Duration};

use axum::{routing::get, Router};
use shared::StockLedger;
use sqlx::postgres::PgPoolOptions;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use config::Config;

use services::{
    stock::load_seed_file, LedgerHandle, PgStockStore, SalesService, StockService,
    TransactionHistory,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ledger: LedgerHandle,
    pub history: TransactionHistory,
    pub store: Option<PgStockStore>,
}

impl AppState {
    /// State without a database
    pub fn in_memory(config: Config, ledger: StockLedger) -> Self {
        Self {
            config: Arc::new(config),
            ledger: LedgerHandle::new(ledger),
            history: TransactionHistory::default(),
            store: None,
        }
    }

    /// Build state from configuration: restore from PostgreSQL when a
    /// database URL is set, otherwise start from the seed file (if any).
    pub async fn bootstrap(config: Config) -> anyhow::Result<Self> {
        let Some(url) = config.database.url.clone() else {
            let ledger = match &config.stock.seed_file {
                Some(path) => load_seed_file(path)?,
                None => StockLedger::new(),
            };
            return Ok(Self::in_memory(config, ledger));
        };

        tracing::info!("Connecting to database...");
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&url)
            .await?;
        tracing::info!("Database connection established");

        let store = PgStockStore::new(db_pool);
        if config.database.run_migrations {
            tracing::info!("Running database migrations...");
            store.migrate().await?;
            tracing::info!("Migrations completed");
        }

        let batches = store.load_batches().await?;
        let transactions = store.load_transactions().await?;
        let ledger = StockLedger::restore(batches, transactions.iter().map(|t| t.id))?;
        tracing::info!(
            batches = ledger.len(),
            transactions = transactions.len(),
            "Stock ledger restored"
        );

        Ok(Self {
            config: Arc::new(config),
            ledger: LedgerHandle::new(ledger),
            history: TransactionHistory::new(transactions),
            store: Some(store),
        })
    }

    pub fn stock_service(&self) -> StockService {
        StockService::new(self.ledger.clone(), self.store.clone())
    }

    pub fn sales_service(&self) -> SalesService {
        SalesService::new(self.ledger.clone(), self.history.clone(), self.store.clone())
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Seafood Stock Service API v1"
}
