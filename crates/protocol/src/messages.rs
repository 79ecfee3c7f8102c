//! RPC operation messages and the binary envelope
//!
//! The socket carries one bincode-encoded [`Call`] per binary frame and one
//! [`Reply`] per response frame. Correlation is explicit: the client picks a
//! nonzero `id` and the server echoes it, so calls may be pipelined on one
//! connection. All enums stay externally tagged - bincode cannot encode
//! `serde(tag = ...)` representations.

use serde::{Deserialize, Serialize};

use crate::wire;

// =============================================================================
// Operation Requests
// =============================================================================

/// Create a patient, optionally with nested prescriptions in the same call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    /// The patient to create; `None` is rejected as a bad request.
    #[serde(default)]
    pub patient: Option<wire::Patient>,
}

/// Fetch one patient with all of its prescriptions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetPatientRequest {
    #[serde(default)]
    pub id: u64,
}

/// Page through patients, most recently created first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPatientsRequest {
    /// `0` means unbounded; negative values are rejected.
    #[serde(default)]
    pub limit: i32,
    /// Rows to skip before the window; applies even when `limit` is `0`.
    #[serde(default)]
    pub offset: i32,
}

/// Create a prescription owned by an existing patient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePrescriptionRequest {
    #[serde(default)]
    pub patient_id: u64,
    /// The prescription to create; `None` is rejected as a bad request.
    #[serde(default)]
    pub prescription: Option<wire::Prescription>,
}

/// Fetch one prescription by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetPrescriptionRequest {
    #[serde(default)]
    pub id: u64,
}

/// List every prescription owned by one patient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPrescriptionsForPatientRequest {
    #[serde(default)]
    pub patient_id: u64,
}

// =============================================================================
// Operation Responses
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePatientResponse {
    /// The created patient with its store-assigned id, nested prescriptions
    /// echoed back as created.
    #[serde(default)]
    pub patient: Option<wire::Patient>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetPatientResponse {
    #[serde(default)]
    pub patient: Option<wire::Patient>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPatientsResponse {
    /// Patients in descending id order.
    #[serde(default)]
    pub patients: Vec<wire::Patient>,
    /// Number of records in this response (the page length), not the total
    /// row count across all pages.
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePrescriptionResponse {
    /// The created prescription with its store-assigned id.
    #[serde(default)]
    pub prescription: Option<wire::Prescription>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetPrescriptionResponse {
    #[serde(default)]
    pub prescription: Option<wire::Prescription>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPrescriptionsForPatientResponse {
    /// Prescriptions in descending id order.
    #[serde(default)]
    pub prescriptions: Vec<wire::Prescription>,
}

// =============================================================================
// Operation Enums
// =============================================================================

/// Every operation the service exposes, one variant per RPC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ApiRequest {
    CreatePatient(CreatePatientRequest),
    GetPatient(GetPatientRequest),
    ListPatients(ListPatientsRequest),
    CreatePrescription(CreatePrescriptionRequest),
    GetPrescription(GetPrescriptionRequest),
    ListPrescriptionsForPatient(ListPrescriptionsForPatientRequest),
}

impl ApiRequest {
    /// Operation name for logs and spans.
    pub fn operation(&self) -> &'static str {
        match self {
            ApiRequest::CreatePatient(_) => "CreatePatient",
            ApiRequest::GetPatient(_) => "GetPatient",
            ApiRequest::ListPatients(_) => "ListPatients",
            ApiRequest::CreatePrescription(_) => "CreatePrescription",
            ApiRequest::GetPrescription(_) => "GetPrescription",
            ApiRequest::ListPrescriptionsForPatient(_) => "ListPrescriptionsForPatient",
        }
    }
}

/// Success payloads, one variant per RPC, mirroring [`ApiRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ApiResponse {
    CreatePatient(CreatePatientResponse),
    GetPatient(GetPatientResponse),
    ListPatients(ListPatientsResponse),
    CreatePrescription(CreatePrescriptionResponse),
    GetPrescription(GetPrescriptionResponse),
    ListPrescriptionsForPatient(ListPrescriptionsForPatientResponse),
}

// =============================================================================
// Error Codes
// =============================================================================

/// Error classification codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // === Client Errors (4xx) ===
    /// Request was malformed or invalid
    BadRequest,
    /// Referenced record not found
    NotFound,
    /// Write violated a uniqueness or referential constraint
    Conflict,

    // === Server Errors (5xx) ===
    /// Internal server error
    InternalError,
    /// Storage connection could not be obtained
    ServiceUnavailable,
    /// Operation missed its deadline
    Timeout,

    /// Unknown variant for forward compatibility
    ///
    /// When deserializing an unknown variant, this variant is used instead
    /// of failing. Allows older clients to gracefully handle new codes.
    #[serde(other)]
    Unknown,
}

/// Typed failure returned in a [`Reply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct RpcError {
    pub code: ErrorCode,
    /// Human-readable cause; never empty.
    pub message: String,
}

impl RpcError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

// =============================================================================
// Envelopes
// =============================================================================

/// One request frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// Client-chosen correlation id, echoed in the matching [`Reply`].
    /// Zero is reserved for server-generated protocol errors.
    pub id: u64,
    /// Milliseconds the caller is willing to wait; the server abandons the
    /// operation and replies `Timeout` once this expires. `None` waits
    /// indefinitely.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
    pub request: ApiRequest,
}

/// One response frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// Correlation id of the [`Call`] this answers, or zero when the frame
    /// itself could not be decoded.
    pub id: u64,
    pub result: Result<ApiResponse, RpcError>,
}

// =============================================================================
// Binary Codec
// =============================================================================

pub fn encode_call(call: &Call) -> Result<Vec<u8>, bincode::Error> {
    bincode::serialize(call)
}

pub fn decode_call(bytes: &[u8]) -> Result<Call, bincode::Error> {
    bincode::deserialize(bytes)
}

pub fn encode_reply(reply: &Reply) -> Result<Vec<u8>, bincode::Error> {
    bincode::serialize(reply)
}

pub fn decode_reply(bytes: &[u8]) -> Result<Reply, bincode::Error> {
    bincode::deserialize(bytes)
}
