//! Application services: input validation and wire mapping on top of the
//! repository ports.

pub mod patients;
pub mod prescriptions;

pub use patients::PatientService;
pub use prescriptions::PrescriptionService;

use crate::infrastructure::error::RepoError;

/// Errors surfaced by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Request payload failed validation before touching the store.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Repository failure, already classified by the adapter.
    #[error(transparent)]
    Repo(#[from] RepoError),
}
