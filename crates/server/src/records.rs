//! Persisted record types.
//!
//! These are the storage-side shapes the repositories read and write; their
//! wire counterparts live in `carelog-protocol`. Identity is canonically the
//! wire-width unsigned integer - narrowing to the store's signed key space
//! happens only inside the Postgres adapter.

use std::fmt;

macro_rules! define_record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(u64);

        impl $name {
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            pub fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_record_id!(
    /// Store-assigned patient identity.
    PatientId
);

define_record_id!(
    /// Store-assigned prescription identity.
    PrescriptionId
);

/// A patient row plus its owned prescriptions.
///
/// `prescriptions` is populated only by the eager-loading fetch path; list
/// scans leave it empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    /// Unique across all patients, enforced by the store.
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Most recently created first.
    pub prescriptions: Vec<Prescription>,
}

/// A prescription row.
#[derive(Debug, Clone, PartialEq)]
pub struct Prescription {
    pub id: PrescriptionId,
    /// `None` once the owning patient has been removed - the store detaches
    /// rather than deletes.
    pub patient_id: Option<PatientId>,
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub quantity: i32,
    pub notes: String,
}

/// Insert draft for a patient; the store assigns the id on creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Inserted in the same transaction as the patient.
    pub prescriptions: Vec<NewPrescription>,
}

/// Insert draft for a prescription; ownership comes from the create call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPrescription {
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub quantity: i32,
    pub notes: String,
}
