//! Integration test harness for the hospital API.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory server, no setup needed
//! cargo test -p dokterbubung-integration-tests
//!
//! # Against PostgreSQL (migrated, empty database)
//! HOSPITAL_TEST_DATABASE_URL=postgres://localhost/dokterbubung_test \
//!     cargo test -p dokterbubung-integration-tests -- --ignored
//! ```
//!
//! Each [`TestServer`] binds its own port, so tests run in parallel.

use std::sync::Arc;

use secrecy::SecretString;

use dokterbubung_server::db::{self, HospitalStore, MemoryStore, PgStore};
use dokterbubung_server::seed::{self, SeedData};
use dokterbubung_server::{AppState, HospitalConfig, app};

/// Errors while starting a test server.
pub type HarnessError = Box<dyn std::error::Error + Send + Sync>;

/// A running API server on an ephemeral port.
pub struct TestServer {
    base_url: String,
    client: reqwest::Client,
    _server: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a server backed by a freshly seeded in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled seed data fails to load or the
    /// listener can't bind.
    pub async fn in_memory() -> Result<Self, HarnessError> {
        let store = MemoryStore::new();
        seed::apply(&store, &SeedData::bundled()?).await?;
        Self::start(Arc::new(store)).await
    }

    /// Start a server against `HOSPITAL_TEST_DATABASE_URL`.
    ///
    /// The database must already be migrated. It is seeded if empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is missing or the database is
    /// unreachable.
    pub async fn postgres() -> Result<Self, HarnessError> {
        let url = std::env::var("HOSPITAL_TEST_DATABASE_URL")
            .map_err(|_| "HOSPITAL_TEST_DATABASE_URL not set")?;
        let pool = db::create_pool(&SecretString::from(url)).await?;
        let store = PgStore::new(pool);
        seed::apply(&store, &SeedData::bundled()?).await?;
        Self::start(Arc::new(store)).await
    }

    async fn start(store: Arc<dyn HospitalStore>) -> Result<Self, HarnessError> {
        let config = HospitalConfig::in_memory();
        let router = app(AppState::new(config, store));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!(error = %e, "Test server stopped");
            }
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            _server: server,
        })
    }

    /// Absolute URL for `path` under `/api/hospital`.
    #[must_use]
    pub fn api(&self, path: &str) -> String {
        format!("{}/api/hospital{path}", self.base_url)
    }

    /// Absolute URL for a path at the server root.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Shared HTTP client.
    #[must_use]
    pub const fn client(&self) -> &reqwest::Client {
        &self.client
    }
}
