//! Phase transition events

/// Events driving [`super::Phase`] transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseEvent {
    /// Accepted open/close request, enable lines asserted
    Start,
    /// Soft-start ramp reached full duty
    RampDone,
    /// Stop requested from any source
    Stop,
    /// Outputs released, timers cancelled, position persisted
    Released,
}
