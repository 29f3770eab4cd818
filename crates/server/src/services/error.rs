//! Error taxonomy for the hospital services.

use thiserror::Error;

use dokterbubung_core::{PrescriptionStatus, PriceError};

use crate::db::RepositoryError;

/// Errors returned by the inventory, prescription and patient services.
#[derive(Debug, Error)]
pub enum HospitalError {
    /// A referenced record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Not enough stock to dispense an item.
    #[error("insufficient stock for {item}: requested {requested}, available {available}")]
    InsufficientStock {
        item: String,
        requested: i32,
        available: i32,
    },

    /// Request failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unknown workflow action.
    #[error("invalid action '{0}'. Use ?action=process or ?action=finish")]
    InvalidAction(String),

    /// Status change not allowed from the current state.
    #[error("cannot move prescription from {from} to {to}")]
    InvalidTransition {
        from: PrescriptionStatus,
        to: PrescriptionStatus,
    },

    /// Record with the same code already exists.
    #[error("{0}")]
    Conflict(String),

    /// Storage layer failure.
    #[error("storage error: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for HospitalError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Storage(other),
        }
    }
}

impl From<PriceError> for HospitalError {
    fn from(err: PriceError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result alias for service operations.
pub type HospitalResult<T> = Result<T, HospitalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_is_lifted_out_of_storage() {
        let err: HospitalError = RepositoryError::Conflict("medicine OBT001 already exists".into()).into();
        assert!(matches!(err, HospitalError::Conflict(_)));

        let err: HospitalError = RepositoryError::NotFound.into();
        assert!(matches!(err, HospitalError::Storage(RepositoryError::NotFound)));
    }

    #[test]
    fn test_price_errors_are_invalid_input() {
        let err: HospitalError = PriceError::Overflow.into();
        assert!(matches!(err, HospitalError::InvalidInput(ref msg) if msg.contains("overflow")));
    }

    #[test]
    fn test_insufficient_stock_message_names_item() {
        let err = HospitalError::InsufficientStock {
            item: "Simvastatin 10mg".to_string(),
            requested: 10,
            available: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for Simvastatin 10mg: requested 10, available 5"
        );
    }
}
