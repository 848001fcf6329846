//! Deployment identity subsystem.
//!
//! # Data Flow
//! ```text
//! IdentityConfig (immutable, read once at startup)
//!     → provider.rs (clock read + fresh request id)
//!     → payload.rs (IdentityPayload / HealthPayload)
//!     → serialized by the HTTP probe handlers
//! ```
//!
//! # Design Decisions
//! - Everything except `timestamp` and `request_id` is fixed per instance
//! - Request ids are UUID v4 so sampled responses never collide
//! - Generation cannot fail

pub mod payload;
pub mod provider;

pub use payload::{HealthPayload, IdentityPayload, HEALTH_STATUS_OK};
pub use provider::IdentityProvider;
