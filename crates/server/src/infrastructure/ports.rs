// Port traits define the full contract - update and delete are adapter-only capabilities
#![allow(dead_code)]

//! Repository port traits for database access.

use async_trait::async_trait;

use super::error::RepoError;
use crate::records::{NewPatient, NewPrescription, Patient, PatientId, Prescription, PrescriptionId};

// =============================================================================
// Database Ports (one per entity type)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientRepo: Send + Sync {
    /// Fetch one patient with prescriptions eagerly loaded, newest first.
    async fn get(&self, id: PatientId) -> Result<Patient, RepoError>;

    /// Page over patients in descending id order, prescriptions left empty.
    ///
    /// A `limit` of zero means unbounded; `offset` applies either way.
    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<Patient>, RepoError>;

    /// Insert a patient and any nested prescriptions in one transaction.
    async fn create(&self, draft: NewPatient) -> Result<Patient, RepoError>;

    async fn update(&self, patient: &Patient) -> Result<(), RepoError>;
    async fn delete(&self, id: PatientId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrescriptionRepo: Send + Sync {
    async fn get(&self, id: PrescriptionId) -> Result<Prescription, RepoError>;

    /// All prescriptions owned by the patient, newest first. Fails with
    /// NotFound when the patient itself does not exist.
    async fn list_for_patient(&self, patient_id: PatientId)
        -> Result<Vec<Prescription>, RepoError>;

    /// Insert a prescription owned by an existing patient.
    async fn create_for_patient(
        &self,
        patient_id: PatientId,
        draft: NewPrescription,
    ) -> Result<Prescription, RepoError>;

    async fn update(&self, prescription: &Prescription) -> Result<(), RepoError>;
    async fn delete(&self, id: PrescriptionId) -> Result<(), RepoError>;
}
