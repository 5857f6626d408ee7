//! Motor output traits
//!
//! The blinds motor is a brushed DC motor behind a dual half-bridge with
//! separate enable and PWM lines per direction.

use super::Direction;

/// Duty at which the soft-start ramp begins
pub const PWM_MIN_DUTY: u8 = 50;

/// Full drive
pub const PWM_MAX_DUTY: u8 = 255;

/// Errors that can occur driving the motor outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// An output pin or PWM channel rejected the write
    Output,
}

/// Motor output stage
///
/// Owned exclusively by the control task.
pub trait MotorOutputs {
    /// Assert the driver enable lines
    fn enable(&mut self) -> Result<(), MotorError>;

    /// Drive `direction` at `duty`, the opposite side held at zero
    fn set_duty(&mut self, direction: Direction, duty: u8) -> Result<(), MotorError>;

    /// Zero both PWM channels and deassert both enable lines
    ///
    /// Must attempt every output even if an earlier write fails.
    fn release(&mut self) -> Result<(), MotorError>;
}
