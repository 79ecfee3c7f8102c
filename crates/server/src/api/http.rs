//! JSON facade over the RPC surface.
//!
//! Every route transcodes its input into an [`ApiRequest`], funnels through
//! [`super::rpc::dispatch`], and renders the typed response as JSON. There is
//! deliberately no business logic here: the facade and the binary transport
//! cannot disagree on semantics because they share the dispatcher.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use carelog_protocol::{
    ApiRequest, ApiResponse, CreatePatientRequest, CreatePatientResponse,
    CreatePrescriptionRequest, CreatePrescriptionResponse, ErrorCode, GetPatientRequest,
    GetPatientResponse, GetPrescriptionRequest, GetPrescriptionResponse, ListPatientsRequest,
    ListPatientsResponse, ListPrescriptionsForPatientRequest, ListPrescriptionsForPatientResponse,
    RpcError,
};

use super::rpc::dispatch;
use crate::app::App;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/v1/patients", post(create_patient).get(list_patients))
        .route("/v1/patients/{id}", get(get_patient))
        .route(
            "/v1/patients/{id}/prescriptions",
            post(create_prescription).get(list_prescriptions),
        )
        .route("/v1/prescriptions/{id}", get(get_prescription))
}

async fn health() -> &'static str {
    "OK"
}

/// Window bounds for list endpoints. Absent parameters default to zero,
/// which means "no bound" for `limit` and "start at the top" for `offset`.
#[derive(Debug, Default, Deserialize)]
struct PageParams {
    #[serde(default)]
    limit: i32,
    #[serde(default)]
    offset: i32,
}

async fn create_patient(
    State(app): State<Arc<App>>,
    Json(body): Json<CreatePatientRequest>,
) -> Result<Json<CreatePatientResponse>, ApiError> {
    match dispatch(&app, &ApiRequest::CreatePatient(body)).await? {
        ApiResponse::CreatePatient(resp) => Ok(Json(resp)),
        other => Err(ApiError::unexpected(&other)),
    }
}

async fn get_patient(
    State(app): State<Arc<App>>,
    Path(id): Path<u64>,
) -> Result<Json<GetPatientResponse>, ApiError> {
    match dispatch(&app, &ApiRequest::GetPatient(GetPatientRequest { id })).await? {
        ApiResponse::GetPatient(resp) => Ok(Json(resp)),
        other => Err(ApiError::unexpected(&other)),
    }
}

async fn list_patients(
    State(app): State<Arc<App>>,
    Query(params): Query<PageParams>,
) -> Result<Json<ListPatientsResponse>, ApiError> {
    let request = ApiRequest::ListPatients(ListPatientsRequest {
        limit: params.limit,
        offset: params.offset,
    });
    match dispatch(&app, &request).await? {
        ApiResponse::ListPatients(resp) => Ok(Json(resp)),
        other => Err(ApiError::unexpected(&other)),
    }
}

async fn create_prescription(
    State(app): State<Arc<App>>,
    Path(id): Path<u64>,
    Json(mut body): Json<CreatePrescriptionRequest>,
) -> Result<Json<CreatePrescriptionResponse>, ApiError> {
    // The path owns the association; a conflicting body value is a client bug.
    if body.patient_id != 0 && body.patient_id != id {
        return Err(ApiError(RpcError::new(
            ErrorCode::BadRequest,
            format!("patient_id {} does not match path id {}", body.patient_id, id),
        )));
    }
    body.patient_id = id;

    match dispatch(&app, &ApiRequest::CreatePrescription(body)).await? {
        ApiResponse::CreatePrescription(resp) => Ok(Json(resp)),
        other => Err(ApiError::unexpected(&other)),
    }
}

async fn list_prescriptions(
    State(app): State<Arc<App>>,
    Path(id): Path<u64>,
) -> Result<Json<ListPrescriptionsForPatientResponse>, ApiError> {
    let request = ApiRequest::ListPrescriptionsForPatient(ListPrescriptionsForPatientRequest {
        patient_id: id,
    });
    match dispatch(&app, &request).await? {
        ApiResponse::ListPrescriptionsForPatient(resp) => Ok(Json(resp)),
        other => Err(ApiError::unexpected(&other)),
    }
}

async fn get_prescription(
    State(app): State<Arc<App>>,
    Path(id): Path<u64>,
) -> Result<Json<GetPrescriptionResponse>, ApiError> {
    match dispatch(&app, &ApiRequest::GetPrescription(GetPrescriptionRequest { id })).await? {
        ApiResponse::GetPrescription(resp) => Ok(Json(resp)),
        other => Err(ApiError::unexpected(&other)),
    }
}

/// Error envelope for the JSON facade.
///
/// Wraps the wire error so both transports report identical codes and
/// messages; only the status line is facade-specific.
#[derive(Debug)]
pub struct ApiError(RpcError);

impl ApiError {
    fn unexpected(got: &ApiResponse) -> Self {
        Self(RpcError::new(
            ErrorCode::InternalError,
            format!("mismatched response variant: {got:?}"),
        ))
    }
}

impl From<RpcError> for ApiError {
    fn from(err: RpcError) -> Self {
        Self(err)
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.0.code {
            ErrorCode::BadRequest => axum::http::StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => axum::http::StatusCode::NOT_FOUND,
            ErrorCode::Conflict => axum::http::StatusCode::CONFLICT,
            ErrorCode::ServiceUnavailable => axum::http::StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Timeout => axum::http::StatusCode::GATEWAY_TIMEOUT,
            ErrorCode::InternalError | ErrorCode::Unknown => {
                axum::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({
            "code": self.0.code,
            "message": self.0.message,
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod facade_tests;
