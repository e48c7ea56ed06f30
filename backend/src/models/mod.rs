//! Domain models used by the backend
//!
//! Re-exports the engine models and shared API types

pub use shared::models::*;
pub use shared::{PaginatedResponse, Pagination, PaginationMeta};
