//! Postgres-backed storage.
//!
//! [`Db`] owns the connection pool and schema bootstrap; the per-entity
//! repositories borrow pool handles from it. All signed/unsigned key
//! narrowing between wire ids (u64) and `BIGSERIAL` keys (i64) happens in
//! this module and nowhere else.

mod patients;
mod prescriptions;


pub use patients::PostgresPatientRepo;
pub use prescriptions::PostgresPrescriptionRepo;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use super::config::DatabaseConfig;
use super::error::RepoError;

const MAX_CONNECTIONS: u32 = 25;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_LIFETIME: Duration = Duration::from_secs(300);

/// Shared handle to the Postgres connection pool.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Open the pool. Fails fast when the server is unreachable rather than
    /// connecting lazily on first use.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, RepoError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .max_lifetime(MAX_LIFETIME)
            .connect(&config.url())
            .await
            .map_err(|e| {
                RepoError::unavailable(format!(
                    "failed to connect to postgres at {}:{}/{}: {e}",
                    config.host, config.port, config.dbname
                ))
            })?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), RepoError> {
        let ddl = [
            r#"
            CREATE TABLE IF NOT EXISTS patients (
                id BIGSERIAL PRIMARY KEY,
                first_name VARCHAR(100) NOT NULL DEFAULT '',
                last_name VARCHAR(100) NOT NULL DEFAULT '',
                gender VARCHAR(20) NOT NULL DEFAULT '',
                email VARCHAR(200) NOT NULL DEFAULT '' UNIQUE,
                phone VARCHAR(50) NOT NULL DEFAULT '',
                address VARCHAR(500) NOT NULL DEFAULT ''
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS prescriptions (
                id BIGSERIAL PRIMARY KEY,
                patient_id BIGINT REFERENCES patients(id)
                    ON UPDATE CASCADE ON DELETE SET NULL,
                medication VARCHAR(255) NOT NULL DEFAULT '',
                dosage VARCHAR(100) NOT NULL DEFAULT '',
                frequency VARCHAR(100) NOT NULL DEFAULT '',
                quantity INTEGER NOT NULL DEFAULT 0,
                notes TEXT NOT NULL DEFAULT ''
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_prescriptions_patient_id
                ON prescriptions (patient_id)
            "#,
        ];
        for stmt in ddl {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_err("schema init", e))?;
        }
        Ok(())
    }

    /// Round-trip a trivial query to verify the pool actually works.
    pub async fn ping(&self) -> Result<(), RepoError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_err("ping", e))?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Translate sqlx failures into the repository taxonomy.
///
/// Pool exhaustion and shutdown are retryable (`Unavailable`); unique and
/// foreign key violations are data conflicts; everything else is an opaque
/// database error tagged with the operation.
fn map_sqlx_err(operation: &'static str, err: sqlx::Error) -> RepoError {
    match &err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            RepoError::unavailable(format!("{operation}: {err}"))
        }
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
        {
            RepoError::constraint(db_err.message())
        }
        _ => RepoError::database(operation, err),
    }
}

/// Narrow a wire id to the store's signed key space. Ids past `i64::MAX`
/// cannot exist in the store, so callers treat `None` as absent.
fn signed_key(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

/// Widen a store key back to a wire id. `BIGSERIAL` never goes negative, so
/// a failure here means the table was tampered with out of band.
fn unsigned_key(key: i64, operation: &'static str) -> Result<u64, RepoError> {
    u64::try_from(key)
        .map_err(|_| RepoError::database(operation, format!("negative key {key} in store")))
}
