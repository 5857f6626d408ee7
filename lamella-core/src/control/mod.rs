//! Control task logic
//!
//! [`MotorController`] is driven by the control task: one call to
//! [`MotorController::iterate`] per loop pass.

mod controller;
mod ramp;

pub use controller::{Alarm, Iteration, MotorController, BUTTON_HOLDOFF_MS};
pub use ramp::{RampStep, SoftStart, RAMP_STEP_MS};
