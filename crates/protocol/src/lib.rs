//! Carelog Protocol - wire messages shared by the server and its clients
//!
//! This crate contains everything that crosses the RPC socket:
//! - Wire-format entity messages ([`wire::Patient`], [`wire::Prescription`])
//! - The six operation request/response pairs and their enums
//! - The `Call`/`Reply` envelopes and the binary codec
//! - Error codes returned to callers
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - only serde, bincode, and thiserror
//! 2. **No business logic** - pure data types and serialization
//! 3. **Dual encoding** - every type round-trips through bincode (RPC
//!    frames) and serde_json (HTTP facade bodies), so internally tagged
//!    enums and skipped fields are off limits here

pub mod messages;
pub mod wire;

pub use messages::{
    decode_call, decode_reply, encode_call, encode_reply, ApiRequest, ApiResponse, Call,
    CreatePatientRequest, CreatePatientResponse, CreatePrescriptionRequest,
    CreatePrescriptionResponse, ErrorCode, GetPatientRequest, GetPatientResponse,
    GetPrescriptionRequest, GetPrescriptionResponse, ListPatientsRequest, ListPatientsResponse,
    ListPrescriptionsForPatientRequest, ListPrescriptionsForPatientResponse, Reply, RpcError,
};
