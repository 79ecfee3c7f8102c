//! API layer - binary RPC and JSON facade entry points.

pub mod http;
pub mod rpc;
