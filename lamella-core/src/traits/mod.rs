//! Hardware abstraction traits
//!
//! These traits define the interface between the control logic and the
//! board-specific drivers. Implementations live in `lamella-drivers` and the
//! HAL crates.

pub mod motor;
pub mod sensors;

pub use crate::state::Direction;
pub use motor::{MotorError, MotorOutputs, PWM_MAX_DUTY, PWM_MIN_DUTY};
pub use sensors::{CurrentSensor, SwitchInputs};
