//! Services for the seafood stock backend

pub mod history;
pub mod ledger;
pub mod sales;
pub mod stock;
pub mod store;

pub use history::{HistoryFilter, TransactionHistory};
pub use ledger::LedgerHandle;
pub use sales::SalesService;
pub use stock::StockService;
pub use store::PgStockStore;
