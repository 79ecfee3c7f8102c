//! Carelog Server library.
//!
//! This crate contains all server-side code for the Carelog records service.
//!
//! ## Structure
//!
//! - `records` - Patient and prescription record types
//! - `mapping` - Conversions between records and wire types
//! - `service` - Operation orchestration over the store ports
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - Binary RPC and JSON facade entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod mapping;
pub mod records;
pub mod service;

pub use app::App;
