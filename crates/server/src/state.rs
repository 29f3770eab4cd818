//! Application state shared across handlers.

use std::sync::Arc;

use thiserror::Error;

use crate::config::{HospitalConfig, StorageConfig};
use crate::db::{self, HospitalStore, MemoryStore, PgStore};
use crate::seed::{self, SeedData, SeedError};
use crate::services::Hospital;

/// Errors while building the application state.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("seeding demo data failed: {0}")]
    Seed(#[from] SeedError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the store, the services and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: HospitalConfig,
    store: Arc<dyn HospitalStore>,
    hospital: Hospital,
}

impl AppState {
    /// Create application state on top of an existing store.
    #[must_use]
    pub fn new(config: HospitalConfig, store: Arc<dyn HospitalStore>) -> Self {
        let hospital = Hospital::new(Arc::clone(&store), config.medicine_cache_ttl);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                hospital,
            }),
        }
    }

    /// Open the configured storage backend and build the state.
    ///
    /// The memory backend starts with the bundled demo data.
    ///
    /// # Errors
    ///
    /// Returns `StartupError` if the database is unreachable or the demo data
    /// can't be loaded.
    pub async fn connect(config: HospitalConfig) -> Result<Self, StartupError> {
        let store: Arc<dyn HospitalStore> = match &config.storage {
            StorageConfig::Postgres { database_url } => {
                let pool = db::create_pool(database_url).await?;
                tracing::info!("Database pool created");
                Arc::new(PgStore::new(pool))
            }
            StorageConfig::Memory => {
                let store = MemoryStore::new();
                seed::apply(&store, &SeedData::bundled()?).await?;
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Arc::new(store)
            }
        };
        Ok(Self::new(config, store))
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &HospitalConfig {
        &self.inner.config
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn store(&self) -> &dyn HospitalStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the hospital services.
    #[must_use]
    pub fn hospital(&self) -> &Hospital {
        &self.inner.hospital
    }
}
