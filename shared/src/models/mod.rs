//! Domain models for the finished-goods stock engine

mod sale;
mod stock;

pub use sale::*;
pub use stock::*;
