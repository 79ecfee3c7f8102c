// App struct holds shared state - handlers receive it via Axum state
#![allow(dead_code)]

//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::{PatientRepo, PrescriptionRepo};
use crate::infrastructure::postgres::{Db, PostgresPatientRepo, PostgresPrescriptionRepo};
use crate::service::{PatientService, PrescriptionService};

/// Main application state.
///
/// Holds the services both transports dispatch into. Passed to HTTP and RPC
/// handlers via Axum state.
pub struct App {
    pub services: Services,
}

/// Container for the application services.
pub struct Services {
    pub patients: PatientService,
    pub prescriptions: PrescriptionService,
}

impl App {
    /// Create a new App backed by the Postgres pool.
    pub fn new(db: &Db) -> Self {
        let patient_repo: Arc<dyn PatientRepo> = Arc::new(PostgresPatientRepo::new(db));
        let prescription_repo: Arc<dyn PrescriptionRepo> =
            Arc::new(PostgresPrescriptionRepo::new(db));
        Self::with_repos(patient_repo, prescription_repo)
    }

    /// Wire the services onto arbitrary repository implementations. Tests use
    /// this to swap in mocks without a database.
    pub fn with_repos(
        patients: Arc<dyn PatientRepo>,
        prescriptions: Arc<dyn PrescriptionRepo>,
    ) -> Self {
        Self {
            services: Services {
                patients: PatientService::new(patients),
                prescriptions: PrescriptionService::new(prescriptions),
            },
        }
    }
}
