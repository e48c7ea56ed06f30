//! HTTP handlers for the seafood stock API

pub mod health;
pub mod sales;
pub mod stock;

pub use health::*;
pub use sales::*;
pub use stock::*;
