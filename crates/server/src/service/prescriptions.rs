//! Prescription service - create, fetch and list prescriptions per patient.

use std::sync::Arc;

use carelog_protocol::wire;

use super::ServiceError;
use crate::infrastructure::ports::PrescriptionRepo;
use crate::mapping::{prescription_draft_from_wire, prescription_to_wire, prescriptions_to_wire};
use crate::records::{PatientId, PrescriptionId};

/// Validates inbound payloads, delegates to the repository, and maps records
/// back to wire format.
pub struct PrescriptionService {
    prescriptions: Arc<dyn PrescriptionRepo>,
}

impl PrescriptionService {
    pub fn new(prescriptions: Arc<dyn PrescriptionRepo>) -> Self {
        Self { prescriptions }
    }

    /// Create a prescription owned by an existing patient and echo the stored
    /// record with its assigned id.
    pub async fn create_for_patient(
        &self,
        patient_id: u64,
        prescription: Option<&wire::Prescription>,
    ) -> Result<wire::Prescription, ServiceError> {
        let draft = prescription.map(prescription_draft_from_wire).ok_or_else(|| {
            ServiceError::InvalidInput("prescription payload is required".to_string())
        })?;

        let created = self
            .prescriptions
            .create_for_patient(PatientId::new(patient_id), draft)
            .await?;
        Ok(prescription_to_wire(&created))
    }

    /// Fetch one prescription by id.
    pub async fn get(&self, id: u64) -> Result<wire::Prescription, ServiceError> {
        let prescription = self.prescriptions.get(PrescriptionId::new(id)).await?;
        Ok(prescription_to_wire(&prescription))
    }

    /// All prescriptions owned by the patient, newest first.
    pub async fn list_for_patient(
        &self,
        patient_id: u64,
    ) -> Result<Vec<wire::Prescription>, ServiceError> {
        let page = self
            .prescriptions
            .list_for_patient(PatientId::new(patient_id))
            .await?;
        Ok(prescriptions_to_wire(&page))
    }
}
