//! Code generation for medicines, prescriptions and patients.
//!
//! Codes come from a per-kind sequence in the store. A drawn code can still be
//! taken by a seeded or hand-entered row, so callers insert inside a loop and
//! ask for another code on conflict:
//!
//! ```ignore
//! let mut attempts = CodeAttempts::new(store, CodeKind::Patient);
//! while let Some(code) = attempts.next_code().await? {
//!     match store.insert_patient(&patient_with(code)).await {
//!         Ok(()) => return Ok(..),
//!         Err(RepositoryError::Conflict(_)) => continue,
//!         Err(e) => return Err(e.into()),
//!     }
//! }
//! ```

use chrono::Utc;
use tracing::warn;

use dokterbubung_core::CodeKind;

use crate::db::{HospitalStore, RepositoryError};

/// Sequence draws before falling back to a timestamp code.
pub const MAX_SEQUENCE_DRAWS: u32 = 16;

/// Iterator-like source of candidate codes for one insert.
pub struct CodeAttempts<'a> {
    store: &'a dyn HospitalStore,
    kind: CodeKind,
    drawn: u32,
    fallback_used: bool,
}

impl<'a> CodeAttempts<'a> {
    #[must_use]
    pub fn new(store: &'a dyn HospitalStore, kind: CodeKind) -> Self {
        Self {
            store,
            kind,
            drawn: 0,
            fallback_used: false,
        }
    }

    /// Next candidate code, or `None` once every option is spent.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the sequence cannot be read.
    pub async fn next_code(&mut self) -> Result<Option<String>, RepositoryError> {
        if self.drawn < MAX_SEQUENCE_DRAWS {
            self.drawn += 1;
            let value = self.store.next_code_value(self.kind).await?;
            return Ok(Some(self.kind.format(value)));
        }

        if self.fallback_used {
            return Ok(None);
        }
        self.fallback_used = true;
        warn!(
            kind = %self.kind,
            draws = self.drawn,
            "Every sequence code was taken, using timestamp code"
        );
        Ok(Some(self.kind.fallback(Utc::now().timestamp_millis())))
    }

    /// Number of codes handed out so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.drawn + u32::from(self.fallback_used)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn test_codes_follow_sequence() {
        let store = MemoryStore::new();
        let mut attempts = CodeAttempts::new(&store, CodeKind::Prescription);

        assert_eq!(attempts.next_code().await.unwrap().unwrap(), "RSP-0001");
        assert_eq!(attempts.next_code().await.unwrap().unwrap(), "RSP-0002");
        assert_eq!(attempts.attempts(), 2);
    }

    #[tokio::test]
    async fn test_falls_back_to_timestamp_then_stops() {
        let store = MemoryStore::new();
        let mut attempts = CodeAttempts::new(&store, CodeKind::Patient);

        for _ in 0..MAX_SEQUENCE_DRAWS {
            attempts.next_code().await.unwrap().unwrap();
        }

        let fallback = attempts.next_code().await.unwrap().unwrap();
        assert!(fallback.starts_with("P-"));
        assert!(fallback.len() > "P-0017".len());

        assert!(attempts.next_code().await.unwrap().is_none());
        assert_eq!(attempts.attempts(), MAX_SEQUENCE_DRAWS + 1);
    }
}
