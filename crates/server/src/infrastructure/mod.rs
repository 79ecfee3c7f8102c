//! Infrastructure layer: configuration, port traits, and the Postgres
//! adapters behind them.

pub mod config;
pub mod error;
pub mod ports;
pub mod postgres;
