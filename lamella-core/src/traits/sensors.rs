//! Input traits for switches and current sensing

use super::Direction;

/// Polled switch levels
///
/// Levels are logical: `true` means pressed / limit reached, whatever the
/// wiring polarity.
pub trait SwitchInputs {
    /// Limit switch at the end reached by travelling in `direction`
    fn limit_active(&mut self, direction: Direction) -> bool;

    /// Push button for `direction`
    fn button_pressed(&mut self, direction: Direction) -> bool;
}

/// Motor current measurement
pub trait CurrentSensor {
    /// Latest reading in raw converter units, `None` if unavailable
    fn read_current(&mut self) -> Option<u32>;
}
