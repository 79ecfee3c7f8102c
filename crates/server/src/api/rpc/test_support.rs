use super::*;

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

use carelog_protocol::encode_call;

use crate::infrastructure::ports::{
    MockPatientRepo, MockPrescriptionRepo, PatientRepo, PrescriptionRepo,
};
use crate::records::{NewPatient, Patient, PatientId, Prescription, PrescriptionId};

/// Assemble an App around mock repositories.
pub(crate) fn build_test_app(
    patients: MockPatientRepo,
    prescriptions: MockPrescriptionRepo,
) -> Arc<App> {
    Arc::new(App::with_repos(Arc::new(patients), Arc::new(prescriptions)))
}

/// Patient repository whose calls never complete. Lets deadline tests hold a
/// call open indefinitely without sleeping.
pub(crate) struct StalledPatientRepo;

#[async_trait::async_trait]
impl PatientRepo for StalledPatientRepo {
    async fn get(&self, _id: PatientId) -> Result<Patient, RepoError> {
        std::future::pending::<()>().await;
        unreachable!()
    }

    async fn list(&self, _limit: u32, _offset: u32) -> Result<Vec<Patient>, RepoError> {
        std::future::pending::<()>().await;
        unreachable!()
    }

    async fn create(&self, _draft: NewPatient) -> Result<Patient, RepoError> {
        std::future::pending::<()>().await;
        unreachable!()
    }

    async fn update(&self, _patient: &Patient) -> Result<(), RepoError> {
        std::future::pending::<()>().await;
        unreachable!()
    }

    async fn delete(&self, _id: PatientId) -> Result<(), RepoError> {
        std::future::pending::<()>().await;
        unreachable!()
    }
}

/// Build an App whose patient repository stalls forever.
pub(crate) fn build_stalled_app() -> Arc<App> {
    let patients: Arc<dyn PatientRepo> = Arc::new(StalledPatientRepo);
    let prescriptions: Arc<dyn PrescriptionRepo> = Arc::new(MockPrescriptionRepo::new());
    Arc::new(App::with_repos(patients, prescriptions))
}

/// Bind the RPC router on an ephemeral port and serve it in the background.
pub(crate) async fn spawn_rpc_server(app: Arc<App>) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let router = routes().with_state(app);

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, handle)
}

/// Bind the JSON facade on an ephemeral port and serve it in the background.
pub(crate) async fn spawn_http_server(app: Arc<App>) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let router = crate::api::http::routes().with_state(app);

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, handle)
}

pub(crate) async fn rpc_connect(
    addr: SocketAddr,
) -> tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>> {
    let url = format!("ws://{}/rpc", addr);
    let (ws, _resp) = connect_async(url).await.unwrap();
    ws
}

/// Encode and send one call frame.
pub(crate) async fn rpc_send(
    ws: &mut tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    call: &Call,
) {
    let frame = encode_call(call).unwrap();
    ws.send(WsMessage::Binary(frame)).await.unwrap();
}

/// Receive the next binary frame and decode it as a reply.
pub(crate) async fn rpc_recv(
    ws: &mut tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
) -> Reply {
    loop {
        let msg = ws.next().await.unwrap().unwrap();
        if let WsMessage::Binary(bytes) = msg {
            return carelog_protocol::decode_reply(&bytes).unwrap();
        }
    }
}

/// A stored patient with predictable fields for assertions.
pub(crate) fn stored_patient(id: u64) -> Patient {
    Patient {
        id: PatientId::new(id),
        first_name: "Ann".to_string(),
        last_name: "Lee".to_string(),
        gender: "F".to_string(),
        email: "ann@example.com".to_string(),
        phone: "555-0100".to_string(),
        address: "12 Elm St".to_string(),
        prescriptions: Vec::new(),
    }
}

/// A stored prescription owned by the given patient.
pub(crate) fn stored_prescription(id: u64, patient_id: u64) -> Prescription {
    Prescription {
        id: PrescriptionId::new(id),
        patient_id: Some(PatientId::new(patient_id)),
        medication: "Lisinopril".to_string(),
        dosage: "10mg".to_string(),
        frequency: "daily".to_string(),
        quantity: 30,
        notes: "with food".to_string(),
    }
}
