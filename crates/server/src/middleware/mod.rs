//! HTTP middleware for the hospital API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (recorded on the span, echoed in the response)
//! 4. CORS
//! 5. Request timeout

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
