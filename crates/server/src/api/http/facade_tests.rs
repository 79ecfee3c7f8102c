use mockall::predicate::*;
use serde_json::{json, Value};

use crate::api::rpc::test_support::{
    build_test_app, spawn_http_server, stored_patient, stored_prescription,
};
use crate::infrastructure::error::RepoError;
use crate::infrastructure::ports::{MockPatientRepo, MockPrescriptionRepo};
use crate::records::PatientId;

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = build_test_app(MockPatientRepo::new(), MockPrescriptionRepo::new());
    let (addr, _server) = spawn_http_server(app).await;

    let resp = reqwest::get(format!("http://{addr}/api/health")).await.unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn get_patient_renders_the_stored_record() {
    let mut patients = MockPatientRepo::new();
    patients
        .expect_get()
        .with(eq(PatientId::new(7)))
        .returning(|_| Ok(stored_patient(7)));
    let app = build_test_app(patients, MockPrescriptionRepo::new());
    let (addr, _server) = spawn_http_server(app).await;

    let resp = reqwest::get(format!("http://{addr}/v1/patients/7")).await.unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["patient"]["id"], 7);
    assert_eq!(body["patient"]["email"], "ann@example.com");
}

#[tokio::test]
async fn missing_patient_is_a_404_with_the_wire_code() {
    let mut patients = MockPatientRepo::new();
    patients
        .expect_get()
        .returning(|id| Err(RepoError::not_found("patient", id)));
    let app = build_test_app(patients, MockPrescriptionRepo::new());
    let (addr, _server) = spawn_http_server(app).await;

    let resp = reqwest::get(format!("http://{addr}/v1/patients/404")).await.unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["message"], "patient not found: 404");
}

#[tokio::test]
async fn create_patient_round_trips_through_the_dispatcher() {
    let mut patients = MockPatientRepo::new();
    patients
        .expect_create()
        .withf(|draft| draft.email == "ann@example.com")
        .returning(|_| Ok(stored_patient(17)));
    let app = build_test_app(patients, MockPrescriptionRepo::new());
    let (addr, _server) = spawn_http_server(app).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/v1/patients"))
        .json(&json!({
            "patient": {
                "first_name": "Ann",
                "last_name": "Lee",
                "email": "ann@example.com",
            }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["patient"]["id"], 17);
}

#[tokio::test]
async fn absent_create_payload_is_a_400() {
    let app = build_test_app(MockPatientRepo::new(), MockPrescriptionRepo::new());
    let (addr, _server) = spawn_http_server(app).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/v1/patients"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn negative_limit_is_a_400() {
    // No expectations: the bounds are rejected before the store is touched.
    let app = build_test_app(MockPatientRepo::new(), MockPrescriptionRepo::new());
    let (addr, _server) = spawn_http_server(app).await;

    let resp = reqwest::get(format!("http://{addr}/v1/patients?limit=-1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn duplicate_email_is_a_409() {
    let mut patients = MockPatientRepo::new();
    patients
        .expect_create()
        .returning(|_| Err(RepoError::constraint("patients_email_key")));
    let app = build_test_app(patients, MockPrescriptionRepo::new());
    let (addr, _server) = spawn_http_server(app).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/v1/patients"))
        .json(&json!({"patient": {"email": "ann@example.com"}}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::CONFLICT);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn list_reports_the_page_length() {
    let mut patients = MockPatientRepo::new();
    patients
        .expect_list()
        .with(eq(10u32), eq(0u32))
        .returning(|_, _| Ok(vec![stored_patient(1), stored_patient(2)]));
    let app = build_test_app(patients, MockPrescriptionRepo::new());
    let (addr, _server) = spawn_http_server(app).await;

    let resp = reqwest::get(format!("http://{addr}/v1/patients?limit=10"))
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["patients"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn prescription_create_takes_its_owner_from_the_path() {
    let mut prescriptions = MockPrescriptionRepo::new();
    prescriptions
        .expect_create_for_patient()
        .withf(|patient_id, draft| {
            *patient_id == PatientId::new(7) && draft.medication == "Lisinopril"
        })
        .returning(|_, _| Ok(stored_prescription(31, 7)));
    let app = build_test_app(MockPatientRepo::new(), prescriptions);
    let (addr, _server) = spawn_http_server(app).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/v1/patients/7/prescriptions"))
        .json(&json!({"prescription": {"medication": "Lisinopril"}}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["prescription"]["id"], 31);
    assert_eq!(body["prescription"]["patient_id"], 7);
}

#[tokio::test]
async fn mismatched_prescription_owner_is_rejected_before_dispatch() {
    // No expectations: a body that contradicts the path never reaches the store.
    let app = build_test_app(MockPatientRepo::new(), MockPrescriptionRepo::new());
    let (addr, _server) = spawn_http_server(app).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/v1/patients/7/prescriptions"))
        .json(&json!({
            "patient_id": 9,
            "prescription": {"medication": "Lisinopril"},
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "patient_id 9 does not match path id 7");
}

#[tokio::test]
async fn prescription_list_is_scoped_to_the_path_patient() {
    let mut prescriptions = MockPrescriptionRepo::new();
    prescriptions
        .expect_list_for_patient()
        .with(eq(PatientId::new(7)))
        .returning(|_| Ok(vec![stored_prescription(31, 7), stored_prescription(30, 7)]));
    let app = build_test_app(MockPatientRepo::new(), prescriptions);
    let (addr, _server) = spawn_http_server(app).await;

    let resp = reqwest::get(format!("http://{addr}/v1/patients/7/prescriptions"))
        .await
        .unwrap();

    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let listed = body["prescriptions"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], 31);
}
