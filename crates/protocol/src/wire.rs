//! Wire-format entity messages
//!
//! Field semantics follow proto3 conventions: every field defaults when
//! absent, string fields are never null (empty string instead), and ids are
//! unsigned 64-bit integers assigned by the store.

use serde::{Deserialize, Serialize};

/// A patient record as it travels on the wire.
///
/// On create requests the `id` is ignored; the store assigns one and the
/// response echoes it back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: String,
    /// Unique across all patients; a duplicate fails the create with a
    /// conflict.
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    /// Owned prescriptions, most recently created first. Empty on list
    /// responses; fully populated on get.
    #[serde(default)]
    pub prescriptions: Vec<Prescription>,
}

/// A prescription record as it travels on the wire.
///
/// On create requests the owning patient comes from the request, not from
/// this field; `patient_id` is meaningful only on responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    #[serde(default)]
    pub id: u64,
    /// Zero when the owning patient has been removed.
    #[serde(default)]
    pub patient_id: u64,
    #[serde(default)]
    pub medication: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub notes: String,
}
