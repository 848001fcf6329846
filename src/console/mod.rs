//! Polling console subsystem.
//!
//! # Data Flow
//! ```text
//! initial load / manual refresh / timer tick
//!     → runtime.rs (event loop, single owner of state)
//!     → aggregator.rs (issue cycle ticket)
//!     → cycle.rs (health + version, concurrently, via transport.rs)
//!     → aggregator.rs (commit if still the latest ticket)
//!     → state.rs (ClientStatusState + derived facts)
//!     → view.rs (text rendering)
//!
//! marker.rs runs once at start, independently, and only ever writes
//! the frontend color.
//! ```
//!
//! # Design Decisions
//! - Latest-started cycle wins; completion order does not matter
//! - A failed cycle keeps the last good payloads and shows an error
//! - Marker failures are silent

pub mod aggregator;
pub mod cycle;
pub mod marker;
pub mod runtime;
pub mod sampling;
pub mod state;
pub mod transport;
pub mod view;

pub use aggregator::{CommitOutcome, CycleTicket, StatusAggregator, Trigger};
pub use cycle::{run_cycle, CycleReport};
pub use marker::{fetch_marker, parse_marker, FrontendColor, MarkerError};
pub use runtime::{spawn_console, ConsoleCommand, ConsoleHandle, ConsoleSettings};
pub use sampling::{sample_deployments, DeploymentTally};
pub use state::{ClientStatusState, DeploymentChannel, Phase};
pub use transport::{HttpTransport, MarkerSource, Probe, ProbeError, ProbeTransport};
pub use view::StatusView;
