//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → probes.rs (health / version handlers)
//!     → identity provider (fresh payload per request)
//!     → JSON response + x-request-id + cache-control
//! ```

pub mod probes;
pub mod server;

pub use probes::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
