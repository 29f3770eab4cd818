//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Prescription lifecycle status.
///
/// Moves strictly forward: `Pending` -> `Process` -> `Selesai`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "hospital.prescription_status"))]
pub enum PrescriptionStatus {
    /// Written by the doctor, stock not yet touched.
    #[default]
    Pending,
    /// Dispensed by the pharmacy, waiting for pickup.
    Process,
    /// Picked up by the patient.
    Selesai,
}

impl PrescriptionStatus {
    /// The status that directly follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Process),
            Self::Process => Some(Self::Selesai),
            Self::Selesai => None,
        }
    }

    /// Whether moving from `self` to `target` is a single forward step.
    #[must_use]
    pub fn can_advance_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl std::fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Process => write!(f, "Process"),
            Self::Selesai => write!(f, "Selesai"),
        }
    }
}

/// Patient queue status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "hospital.patient_status"))]
pub enum PatientStatus {
    /// In the waiting room.
    #[default]
    Waiting,
    /// With the doctor.
    Examining,
}

impl std::fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Examining => write!(f, "Examining"),
        }
    }
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "hospital.movement_type", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    /// Stock received (restock).
    In,
    /// Stock dispensed.
    Out,
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::In => write!(f, "IN"),
            Self::Out => write!(f, "OUT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prescription_status_forward_only() {
        assert!(PrescriptionStatus::Pending.can_advance_to(PrescriptionStatus::Process));
        assert!(PrescriptionStatus::Process.can_advance_to(PrescriptionStatus::Selesai));

        assert!(!PrescriptionStatus::Pending.can_advance_to(PrescriptionStatus::Selesai));
        assert!(!PrescriptionStatus::Process.can_advance_to(PrescriptionStatus::Pending));
        assert!(!PrescriptionStatus::Selesai.can_advance_to(PrescriptionStatus::Process));
    }

    #[test]
    fn test_selesai_is_last() {
        assert_eq!(PrescriptionStatus::Selesai.next(), None);
    }

    #[test]
    fn test_prescription_status_display() {
        assert_eq!(PrescriptionStatus::Pending.to_string(), "Pending");
        assert_eq!(PrescriptionStatus::Selesai.to_string(), "Selesai");
    }

    #[test]
    fn test_movement_type_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&MovementType::In).unwrap_or_default(),
            "\"IN\""
        );
        assert_eq!(
            serde_json::to_string(&MovementType::Out).unwrap_or_default(),
            "\"OUT\""
        );
    }

    #[test]
    fn test_patient_status_default_is_waiting() {
        assert_eq!(PatientStatus::default(), PatientStatus::Waiting);
    }
}
