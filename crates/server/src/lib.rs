//! DokterBubung hospital backend.
//!
//! Inventory ledger, prescription workflow and patient roster served as a
//! JSON API. The library exposes the router so the binary and the
//! integration tests build the exact same application.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;

pub use config::HospitalConfig;
pub use routes::app;
pub use state::AppState;
