//! Postgres-backed patient repository.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use super::prescriptions::prescription_row_to_record;
use super::{map_sqlx_err, signed_key, unsigned_key, Db};
use crate::infrastructure::error::RepoError;
use crate::infrastructure::ports::PatientRepo;
use crate::records::{NewPatient, Patient, PatientId, Prescription, PrescriptionId};

pub struct PostgresPatientRepo {
    pool: PgPool,
}

impl PostgresPatientRepo {
    pub fn new(db: &Db) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl PatientRepo for PostgresPatientRepo {
    async fn get(&self, id: PatientId) -> Result<Patient, RepoError> {
        let Some(key) = signed_key(id.value()) else {
            return Err(RepoError::not_found("patient", id));
        };

        let row = sqlx::query(
            r#"
            SELECT id, first_name, last_name, gender, email, phone, address
              FROM patients
             WHERE id = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_err("get patient", e))?
        .ok_or_else(|| RepoError::not_found("patient", id))?;

        let mut patient = patient_row_to_record(&row)?;

        let prescription_rows = sqlx::query(
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
        .map_err(|e| map_sqlx_err("get patient prescriptions", e))?;

        patient.prescriptions = prescription_rows
            .iter()
            .map(prescription_row_to_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(patient)
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<Patient>, RepoError> {
        let rows = if limit == 0 {
            sqlx::query(
                r#"
                SELECT id, first_name, last_name, gender, email, phone, address
                  FROM patients
                 ORDER BY id DESC
                 OFFSET $1
                "#,
            )
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_err("list patients", e))?
        } else {
            sqlx::query(
                r#"
                SELECT id, first_name, last_name, gender, email, phone, address
                  FROM patients
                 ORDER BY id DESC
                 LIMIT $1 OFFSET $2
                "#,
            )
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_err("list patients", e))?
        };

        rows.iter().map(patient_row_to_record).collect()
    }

    async fn create(&self, draft: NewPatient) -> Result<Patient, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_err("create patient", e))?;

        let row = sqlx::query(
            r#"
            INSERT INTO patients (first_name, last_name, gender, email, phone, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.gender)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(&draft.address)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_err("create patient", e))?;

        let key: i64 = row
            .try_get("id")
            .map_err(|e| map_sqlx_err("create patient", e))?;
        let id = PatientId::new(unsigned_key(key, "create patient")?);

        let mut prescriptions = Vec::with_capacity(draft.prescriptions.len());
        for item in &draft.prescriptions {
            let row = sqlx::query(
                r#"
                INSERT INTO prescriptions (patient_id, medication, dosage, frequency, quantity, notes)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id
                "#,
            )
            .bind(key)
            .bind(&item.medication)
            .bind(&item.dosage)
            .bind(&item.frequency)
            .bind(item.quantity)
            .bind(&item.notes)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_err("create nested prescription", e))?;

            let prescription_key: i64 = row
                .try_get("id")
                .map_err(|e| map_sqlx_err("create nested prescription", e))?;

            prescriptions.push(Prescription {
                id: PrescriptionId::new(unsigned_key(prescription_key, "create nested prescription")?),
                patient_id: Some(id),
                medication: item.medication.clone(),
                dosage: item.dosage.clone(),
                frequency: item.frequency.clone(),
                quantity: item.quantity,
                notes: item.notes.clone(),
            });
        }
        // Read paths return prescriptions newest first; match them in the echo.
        prescriptions.reverse();

        tx.commit()
            .await
            .map_err(|e| map_sqlx_err("create patient", e))?;

        Ok(Patient {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            gender: draft.gender,
            email: draft.email,
            phone: draft.phone,
            address: draft.address,
            prescriptions,
        })
    }

    async fn update(&self, patient: &Patient) -> Result<(), RepoError> {
        let Some(key) = signed_key(patient.id.value()) else {
            return Err(RepoError::not_found("patient", patient.id));
        };

        let result = sqlx::query(
            r#"
            UPDATE patients
               SET first_name = $1, last_name = $2, gender = $3,
                   email = $4, phone = $5, address = $6
             WHERE id = $7
            "#,
        )
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(&patient.gender)
        .bind(&patient.email)
        .bind(&patient.phone)
        .bind(&patient.address)
        .bind(key)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_err("update patient", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("patient", patient.id));
        }
        Ok(())
    }

    async fn delete(&self, id: PatientId) -> Result<(), RepoError> {
        let Some(key) = signed_key(id.value()) else {
            return Err(RepoError::not_found("patient", id));
        };

        let result = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_err("delete patient", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("patient", id));
        }
        Ok(())
    }
}

/// Decode one patients row. Prescriptions start empty; the caller decides
/// whether to load them.
fn patient_row_to_record(row: &PgRow) -> Result<Patient, RepoError> {
    let key: i64 = row
        .try_get("id")
        .map_err(|e| map_sqlx_err("decode patient row", e))?;
    Ok(Patient {
        id: PatientId::new(unsigned_key(key, "decode patient row")?),
        first_name: row
            .try_get("first_name")
            .map_err(|e| map_sqlx_err("decode patient row", e))?,
        last_name: row
            .try_get("last_name")
            .map_err(|e| map_sqlx_err("decode patient row", e))?,
        gender: row
            .try_get("gender")
            .map_err(|e| map_sqlx_err("decode patient row", e))?,
        email: row
            .try_get("email")
            .map_err(|e| map_sqlx_err("decode patient row", e))?,
        phone: row
            .try_get("phone")
            .map_err(|e| map_sqlx_err("decode patient row", e))?,
        address: row
            .try_get("address")
            .map_err(|e| map_sqlx_err("decode patient row", e))?,
        prescriptions: Vec::new(),
    })
}
