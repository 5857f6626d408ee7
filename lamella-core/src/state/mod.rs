//! Motor state machine types
//!
//! [`Phase`] is the run phase driven by [`PhaseEvent`]s. [`MotorIntent`]
//! carries what the motor is doing and on whose behalf, so that owner and
//! target only exist where they make sense.

mod events;
mod machine;
mod status;

pub use events::PhaseEvent;
pub use machine::{Direction, MotorIntent, Owner, Phase, StopReason};
pub use status::{LimitState, MotorStatus};
