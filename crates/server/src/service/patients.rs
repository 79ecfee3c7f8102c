//! Patient service - create, fetch and list patient records.

use std::sync::Arc;

use carelog_protocol::wire;

use super::ServiceError;
use crate::infrastructure::ports::PatientRepo;
use crate::mapping::{patient_draft_from_wire, patient_to_wire, patients_to_wire};
use crate::records::PatientId;

/// Validates inbound payloads, delegates to the repository, and maps records
/// back to wire format.
pub struct PatientService {
    patients: Arc<dyn PatientRepo>,
}

impl PatientService {
    pub fn new(patients: Arc<dyn PatientRepo>) -> Self {
        Self { patients }
    }

    /// Create a patient (plus any nested prescriptions) and echo the stored
    /// record with its assigned ids.
    pub async fn create(
        &self,
        patient: Option<&wire::Patient>,
    ) -> Result<wire::Patient, ServiceError> {
        let draft = patient
            .map(patient_draft_from_wire)
            .ok_or_else(|| ServiceError::InvalidInput("patient payload is required".to_string()))?;

        let created = self.patients.create(draft).await?;
        Ok(patient_to_wire(&created))
    }

    /// Fetch one patient with prescriptions included.
    pub async fn get(&self, id: u64) -> Result<wire::Patient, ServiceError> {
        let patient = self.patients.get(PatientId::new(id)).await?;
        Ok(patient_to_wire(&patient))
    }

    /// List a window of patients, newest first.
    ///
    /// Wire bounds are signed; anything negative is rejected here rather than
    /// silently clamped.
    pub async fn list(&self, limit: i32, offset: i32) -> Result<Vec<wire::Patient>, ServiceError> {
        let limit = u32::try_from(limit).map_err(|_| {
            ServiceError::InvalidInput(format!("limit must not be negative, got {limit}"))
        })?;
        let offset = u32::try_from(offset).map_err(|_| {
            ServiceError::InvalidInput(format!("offset must not be negative, got {offset}"))
        })?;

        let page = self.patients.list(limit, offset).await?;
        Ok(patients_to_wire(&page))
    }
}
