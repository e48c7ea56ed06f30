//! Finished-goods stock allocation and sale-transaction engine
//!
//! This crate holds everything that decides which production batches satisfy
//! a sale: the stock ledger, FIFO allocation, sale previews and commits. It is
//! shared between the backend service and the browser (via WASM).

pub mod allocation;
pub mod commit;
pub mod error;
pub mod ledger;
pub mod models;
pub mod preview;
pub mod types;
pub mod validation;

pub use allocation::{allocate_fifo, AllocationOutcome, FifoAllocator};
pub use commit::{commit_sale, same_split};
pub use error::{SaleError, SaleErrors};
pub use ledger::StockLedger;
pub use models::*;
pub use preview::preview_sale;
pub use types::*;
pub use validation::*;
