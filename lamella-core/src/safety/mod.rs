//! Safety monitoring
//!
//! - [`RunTimers`]: open-duration and max-run deadlines armed at start
//! - [`SafetyMonitor`]: per-iteration checks that force a stop
//! - [`LinkSupervisor`]: heartbeat tracking and deferred restarts

mod link;
mod monitor;
mod timer;

pub use link::{LinkAction, LinkSupervisor, RestartReason, HEARTBEAT_TIMEOUT_MS, MAX_MISSED_HEARTBEATS};
pub use monitor::{SafetyMonitor, SafetyStatus, CURRENT_SAMPLE_INTERVAL_MS};
pub use timer::{Deadline, RunTimers};
