//! Conversions between persisted records and their wire counterparts.
//!
//! Every function here is total: absent associations become zero ids on the
//! wire and store-assigned fields in drafts are simply dropped. Anything that
//! can fail (missing payloads, bad bounds) is rejected in the service layer
//! before these run.

use carelog_protocol::wire;

use crate::records::{NewPatient, NewPrescription, Patient, Prescription};

/// Convert a persisted patient to wire format.
pub fn patient_to_wire(patient: &Patient) -> wire::Patient {
    wire::Patient {
        id: patient.id.value(),
        first_name: patient.first_name.clone(),
        last_name: patient.last_name.clone(),
        gender: patient.gender.clone(),
        email: patient.email.clone(),
        phone: patient.phone.clone(),
        address: patient.address.clone(),
        prescriptions: prescriptions_to_wire(&patient.prescriptions),
    }
}

/// Convert a page of persisted patients to wire format.
pub fn patients_to_wire(patients: &[Patient]) -> Vec<wire::Patient> {
    patients.iter().map(patient_to_wire).collect()
}

/// Build an insert draft from an inbound wire patient.
///
/// The wire `id` (and the ids of any nested prescriptions) are ignored; the
/// store assigns them.
pub fn patient_draft_from_wire(patient: &wire::Patient) -> NewPatient {
    NewPatient {
        first_name: patient.first_name.clone(),
        last_name: patient.last_name.clone(),
        gender: patient.gender.clone(),
        email: patient.email.clone(),
        phone: patient.phone.clone(),
        address: patient.address.clone(),
        prescriptions: patient
            .prescriptions
            .iter()
            .map(prescription_draft_from_wire)
            .collect(),
    }
}

/// Convert a persisted prescription to wire format.
pub fn prescription_to_wire(prescription: &Prescription) -> wire::Prescription {
    wire::Prescription {
        id: prescription.id.value(),
        patient_id: prescription
            .patient_id
            .map(|id| id.value())
            .unwrap_or_default(),
        medication: prescription.medication.clone(),
        dosage: prescription.dosage.clone(),
        frequency: prescription.frequency.clone(),
        quantity: prescription.quantity,
        notes: prescription.notes.clone(),
    }
}

/// Convert a page of persisted prescriptions to wire format.
pub fn prescriptions_to_wire(prescriptions: &[Prescription]) -> Vec<wire::Prescription> {
    prescriptions.iter().map(prescription_to_wire).collect()
}

/// Build an insert draft from an inbound wire prescription.
///
/// `id` and `patient_id` are ignored; identity comes from the store and
/// ownership from the enclosing request.
pub fn prescription_draft_from_wire(prescription: &wire::Prescription) -> NewPrescription {
    NewPrescription {
        medication: prescription.medication.clone(),
        dosage: prescription.dosage.clone(),
        frequency: prescription.frequency.clone(),
        quantity: prescription.quantity,
        notes: prescription.notes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{PatientId, PrescriptionId};

    fn stored_patient() -> Patient {
        Patient {
            id: PatientId::new(11),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            gender: "F".to_string(),
            email: "ann.lee@example.com".to_string(),
            phone: "555-0100".to_string(),
            address: "12 Elm St".to_string(),
            prescriptions: vec![
                Prescription {
                    id: PrescriptionId::new(31),
                    patient_id: Some(PatientId::new(11)),
                    medication: "Lisinopril".to_string(),
                    dosage: "10mg".to_string(),
                    frequency: "daily".to_string(),
                    quantity: 30,
                    notes: "with food".to_string(),
                },
                Prescription {
                    id: PrescriptionId::new(30),
                    patient_id: Some(PatientId::new(11)),
                    medication: "Metformin".to_string(),
                    dosage: "500mg".to_string(),
                    frequency: "twice daily".to_string(),
                    quantity: 60,
                    notes: String::new(),
                },
            ],
        }
    }

    #[test]
    fn patient_maps_every_field_to_wire() {
        let record = stored_patient();
        let wire = patient_to_wire(&record);

        assert_eq!(wire.id, 11);
        assert_eq!(wire.first_name, "Ann");
        assert_eq!(wire.last_name, "Lee");
        assert_eq!(wire.gender, "F");
        assert_eq!(wire.email, "ann.lee@example.com");
        assert_eq!(wire.phone, "555-0100");
        assert_eq!(wire.address, "12 Elm St");
        assert_eq!(wire.prescriptions.len(), 2);
        assert_eq!(wire.prescriptions[0].id, 31);
        assert_eq!(wire.prescriptions[0].patient_id, 11);
        assert_eq!(wire.prescriptions[1].medication, "Metformin");
    }

    #[test]
    fn nested_order_survives_the_round_trip() {
        let record = stored_patient();
        let wire = patient_to_wire(&record);
        let ids: Vec<u64> = wire.prescriptions.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![31, 30]);
    }

    #[test]
    fn draft_carries_every_field_the_store_does_not_assign() {
        let record = stored_patient();
        let wire = patient_to_wire(&record);
        let draft = patient_draft_from_wire(&wire);

        assert_eq!(draft.first_name, record.first_name);
        assert_eq!(draft.last_name, record.last_name);
        assert_eq!(draft.gender, record.gender);
        assert_eq!(draft.email, record.email);
        assert_eq!(draft.phone, record.phone);
        assert_eq!(draft.address, record.address);

        assert_eq!(draft.prescriptions.len(), record.prescriptions.len());
        for (nested, original) in draft.prescriptions.iter().zip(&record.prescriptions) {
            assert_eq!(nested.medication, original.medication);
            assert_eq!(nested.dosage, original.dosage);
            assert_eq!(nested.frequency, original.frequency);
            assert_eq!(nested.quantity, original.quantity);
            assert_eq!(nested.notes, original.notes);
        }
    }

    #[test]
    fn detached_prescription_maps_to_zero_owner() {
        let record = Prescription {
            id: PrescriptionId::new(5),
            patient_id: None,
            medication: "Aspirin".to_string(),
            dosage: "81mg".to_string(),
            frequency: "daily".to_string(),
            quantity: 90,
            notes: String::new(),
        };
        let wire = prescription_to_wire(&record);
        assert_eq!(wire.patient_id, 0);
    }

    #[test]
    fn empty_collections_stay_empty() {
        assert!(patients_to_wire(&[]).is_empty());
        assert!(prescriptions_to_wire(&[]).is_empty());

        let wire = wire::Patient::default();
        let draft = patient_draft_from_wire(&wire);
        assert!(draft.prescriptions.is_empty());
    }
}
