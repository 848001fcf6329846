//! EdgeOps deployment-identity probe.
//!
//! Server side: `GET /api/health` and `GET /api/version` stamp every
//! response with the identity of the release that answered.
//! Client side: a polling console that turns repeated probes into one
//! consistent view of what is serving traffic right now.

pub mod config;
pub mod console;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod observability;

pub use config::EdgeOpsConfig;
pub use http::HttpServer;
pub use identity::{HealthPayload, IdentityPayload, IdentityProvider};
pub use lifecycle::Shutdown;
