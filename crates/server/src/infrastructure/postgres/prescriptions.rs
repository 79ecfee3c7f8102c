//! Postgres-backed prescription repository.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use super::{map_sqlx_err, signed_key, unsigned_key, Db};
use crate::infrastructure::error::RepoError;
use crate::infrastructure::ports::PrescriptionRepo;
use crate::records::{NewPrescription, PatientId, Prescription, PrescriptionId};

pub struct PostgresPrescriptionRepo {
    pool: PgPool,
}

impl PostgresPrescriptionRepo {
    pub fn new(db: &Db) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Resolve the signed store key for a patient, failing with NotFound when
    /// the row is absent. Prescription operations scoped to a patient must
    /// distinguish "no such patient" from "patient with no prescriptions".
    async fn ensure_patient_exists(&self, patient_id: PatientId) -> Result<i64, RepoError> {
        let Some(key) = signed_key(patient_id.value()) else {
            return Err(RepoError::not_found("patient", patient_id));
        };

        sqlx::query("SELECT id FROM patients WHERE id = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_err("check patient exists", e))?
            .ok_or_else(|| RepoError::not_found("patient", patient_id))?;

        Ok(key)
    }
}

#[async_trait]
impl PrescriptionRepo for PostgresPrescriptionRepo {
    async fn get(&self, id: PrescriptionId) -> Result<Prescription, RepoError> {
        let Some(key) = signed_key(id.value()) else {
            return Err(RepoError::not_found("prescription", id));
        };

        let row = sqlx::query(
            r#"
            SELECT id, patient_id, medication, dosage, frequency, quantity, notes
              FROM prescriptions
             WHERE id = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_err("get prescription", e))?
        .ok_or_else(|| RepoError::not_found("prescription", id))?;

        prescription_row_to_record(&row)
    }

    async fn list_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Prescription>, RepoError> {
        let key = self.ensure_patient_exists(patient_id).await?;

        let rows = sqlx::query(
            r#"
            SELECT id, patient_id, medication, dosage, frequency, quantity, notes
              FROM prescriptions
             WHERE patient_id = $1
             ORDER BY id DESC
            "#,
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_err("list prescriptions", e))?;

        rows.iter().map(prescription_row_to_record).collect()
    }

    async fn create_for_patient(
        &self,
        patient_id: PatientId,
        draft: NewPrescription,
    ) -> Result<Prescription, RepoError> {
        let key = self.ensure_patient_exists(patient_id).await?;

        let row = sqlx::query(
            r#"
            INSERT INTO prescriptions (patient_id, medication, dosage, frequency, quantity, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(key)
        .bind(&draft.medication)
        .bind(&draft.dosage)
        .bind(&draft.frequency)
        .bind(draft.quantity)
        .bind(&draft.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_err("create prescription", e))?;

        let prescription_key: i64 = row
            .try_get("id")
            .map_err(|e| map_sqlx_err("create prescription", e))?;

        Ok(Prescription {
            id: PrescriptionId::new(unsigned_key(prescription_key, "create prescription")?),
            patient_id: Some(patient_id),
            medication: draft.medication,
            dosage: draft.dosage,
            frequency: draft.frequency,
            quantity: draft.quantity,
            notes: draft.notes,
        })
    }

    async fn update(&self, prescription: &Prescription) -> Result<(), RepoError> {
        let Some(key) = signed_key(prescription.id.value()) else {
            return Err(RepoError::not_found("prescription", prescription.id));
        };
        let patient_key = match prescription.patient_id {
            Some(patient_id) => Some(
                signed_key(patient_id.value())
                    .ok_or_else(|| RepoError::not_found("patient", patient_id))?,
            ),
            None => None,
        };

        let result = sqlx::query(
            r#"
            UPDATE prescriptions
               SET patient_id = $1, medication = $2, dosage = $3,
                   frequency = $4, quantity = $5, notes = $6
             WHERE id = $7
            "#,
        )
        .bind(patient_key)
        .bind(&prescription.medication)
        .bind(&prescription.dosage)
        .bind(&prescription.frequency)
        .bind(prescription.quantity)
        .bind(&prescription.notes)
        .bind(key)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_err("update prescription", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("prescription", prescription.id));
        }
        Ok(())
    }

    async fn delete(&self, id: PrescriptionId) -> Result<(), RepoError> {
        let Some(key) = signed_key(id.value()) else {
            return Err(RepoError::not_found("prescription", id));
        };

        let result = sqlx::query("DELETE FROM prescriptions WHERE id = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_err("delete prescription", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("prescription", id));
        }
        Ok(())
    }
}

/// Decode one prescriptions row. `patient_id` is nullable in the store; a
/// null means the owning patient was removed and the row was detached.
pub(super) fn prescription_row_to_record(row: &PgRow) -> Result<Prescription, RepoError> {
    let key: i64 = row
        .try_get("id")
        .map_err(|e| map_sqlx_err("decode prescription row", e))?;
    let patient_key: Option<i64> = row
        .try_get("patient_id")
        .map_err(|e| map_sqlx_err("decode prescription row", e))?;
    let patient_id = patient_key
        .map(|k| unsigned_key(k, "decode prescription row").map(PatientId::new))
        .transpose()?;

    Ok(Prescription {
        id: PrescriptionId::new(unsigned_key(key, "decode prescription row")?),
        patient_id,
        medication: row
            .try_get("medication")
            .map_err(|e| map_sqlx_err("decode prescription row", e))?,
        dosage: row
            .try_get("dosage")
            .map_err(|e| map_sqlx_err("decode prescription row", e))?,
        frequency: row
            .try_get("frequency")
            .map_err(|e| map_sqlx_err("decode prescription row", e))?,
        quantity: row
            .try_get("quantity")
            .map_err(|e| map_sqlx_err("decode prescription row", e))?,
        notes: row
            .try_get("notes")
            .map_err(|e| map_sqlx_err("decode prescription row", e))?,
    })
}
