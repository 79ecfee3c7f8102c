//! Binary RPC transport.
//!
//! Clients upgrade `GET /rpc` to a WebSocket and exchange bincode frames:
//! every inbound binary message is a [`Call`], every outbound one a [`Reply`]
//! carrying the caller's correlation id. Calls on one connection are answered
//! in arrival order, so clients may pipeline freely.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use carelog_protocol::{
    decode_call, encode_reply, ApiRequest, ApiResponse, Call, CreatePatientResponse,
    CreatePrescriptionResponse, ErrorCode, GetPatientResponse, GetPrescriptionResponse,
    ListPatientsResponse, ListPrescriptionsForPatientResponse, Reply, RpcError,
};

use crate::app::App;
use crate::infrastructure::error::RepoError;
use crate::service::ServiceError;

/// Build the RPC router.
pub fn routes() -> Router<Arc<App>> {
    Router::new().route("/rpc", get(rpc_handler))
}

/// WebSocket upgrade handler - entry point for new connections.
async fn rpc_handler(ws: WebSocketUpgrade, State(app): State<Arc<App>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app))
}

/// Handle an individual RPC connection.
///
/// Protocol errors (undecodable or non-binary frames) are answered with
/// correlation id zero and the connection stays open; transport errors tear
/// the connection down.
async fn handle_socket(socket: WebSocket, app: Arc<App>) {
    let (mut sender, mut receiver) = socket.split();
    let connection_id = Uuid::new_v4();

    tracing::info!(connection_id = %connection_id, "RPC connection established");

    while let Some(result) = receiver.next().await {
        let reply = match result {
            Ok(Message::Binary(bytes)) => match decode_call(&bytes) {
                Ok(call) => handle_call(&app, call, connection_id).await,
                Err(e) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "Failed to decode call frame");
                    Reply {
                        id: 0,
                        result: Err(RpcError::new(
                            ErrorCode::BadRequest,
                            format!("malformed call frame: {e}"),
                        )),
                    }
                }
            },
            Ok(Message::Text(_)) => {
                tracing::warn!(connection_id = %connection_id, "Text frame on a binary channel");
                Reply {
                    id: 0,
                    result: Err(RpcError::new(ErrorCode::BadRequest, "binary frames only")),
                }
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "RPC connection closed by client");
                break;
            }
            // Ping/Pong are answered by axum itself.
            Ok(_) => continue,
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "RPC socket error");
                break;
            }
        };

        let frame = match encode_reply(&reply) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "Failed to encode reply");
                break;
            }
        };
        if sender.send(Message::Binary(frame.into())).await.is_err() {
            break;
        }
    }

    tracing::info!(connection_id = %connection_id, "RPC connection terminated");
}

/// Execute one call, enforcing its deadline when present.
async fn handle_call(app: &App, call: Call, connection_id: Uuid) -> Reply {
    let operation = call.request.operation();
    tracing::debug!(
        connection_id = %connection_id,
        call_id = call.id,
        operation,
        "Dispatching call"
    );

    let result = match call.deadline_ms {
        Some(ms) => {
            let deadline = Duration::from_millis(ms);
            match tokio::time::timeout(deadline, dispatch(app, &call.request)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        connection_id = %connection_id,
                        call_id = call.id,
                        operation,
                        deadline_ms = ms,
                        "Call deadline expired"
                    );
                    Err(RpcError::new(
                        ErrorCode::Timeout,
                        format!("deadline of {ms}ms expired"),
                    ))
                }
            }
        }
        None => dispatch(app, &call.request).await,
    };

    if let Err(e) = &result {
        tracing::debug!(
            connection_id = %connection_id,
            call_id = call.id,
            operation,
            code = ?e.code,
            "Call failed"
        );
    }

    Reply {
        id: call.id,
        result,
    }
}

/// Route a request to its service.
///
/// Both transports funnel through here, so operation semantics and error
/// mapping can never drift between them.
pub async fn dispatch(app: &App, request: &ApiRequest) -> Result<ApiResponse, RpcError> {
    match request {
        ApiRequest::CreatePatient(req) => {
            let patient = app
                .services
                .patients
                .create(req.patient.as_ref())
                .await
                .map_err(into_rpc_error)?;
            Ok(ApiResponse::CreatePatient(CreatePatientResponse {
                patient: Some(patient),
            }))
        }
        ApiRequest::GetPatient(req) => {
            let patient = app
                .services
                .patients
                .get(req.id)
                .await
                .map_err(into_rpc_error)?;
            Ok(ApiResponse::GetPatient(GetPatientResponse {
                patient: Some(patient),
            }))
        }
        ApiRequest::ListPatients(req) => {
            let patients = app
                .services
                .patients
                .list(req.limit, req.offset)
                .await
                .map_err(into_rpc_error)?;
            let count = patients.len() as u64;
            Ok(ApiResponse::ListPatients(ListPatientsResponse {
                patients,
                count,
            }))
        }
        ApiRequest::CreatePrescription(req) => {
            let prescription = app
                .services
                .prescriptions
                .create_for_patient(req.patient_id, req.prescription.as_ref())
                .await
                .map_err(into_rpc_error)?;
            Ok(ApiResponse::CreatePrescription(CreatePrescriptionResponse {
                prescription: Some(prescription),
            }))
        }
        ApiRequest::GetPrescription(req) => {
            let prescription = app
                .services
                .prescriptions
                .get(req.id)
                .await
                .map_err(into_rpc_error)?;
            Ok(ApiResponse::GetPrescription(GetPrescriptionResponse {
                prescription: Some(prescription),
            }))
        }
        ApiRequest::ListPrescriptionsForPatient(req) => {
            let prescriptions = app
                .services
                .prescriptions
                .list_for_patient(req.patient_id)
                .await
                .map_err(into_rpc_error)?;
            Ok(ApiResponse::ListPrescriptionsForPatient(
                ListPrescriptionsForPatientResponse { prescriptions },
            ))
        }
    }
}

/// Collapse service errors onto the wire taxonomy.
fn into_rpc_error(err: ServiceError) -> RpcError {
    let code = match &err {
        ServiceError::InvalidInput(_) => ErrorCode::BadRequest,
        ServiceError::Repo(repo) => match repo {
            RepoError::NotFound { .. } => ErrorCode::NotFound,
            RepoError::ConstraintViolation(_) => ErrorCode::Conflict,
            RepoError::Unavailable(_) => ErrorCode::ServiceUnavailable,
            RepoError::Database { .. } => ErrorCode::InternalError,
        },
    };
    RpcError::new(code, err.to_string())
}

#[cfg(test)]
pub(crate) mod test_support;
