//! Shift-register confirmation for polled switches

/// Number of consecutive active polls that confirm a switch
pub const CONFIRM_SAMPLES: u32 = 4;

/// Bits forced high on every shift, leaving `CONFIRM_SAMPLES` low bits free
const FORCED_HIGH: u16 = !((1 << CONFIRM_SAMPLES) - 1);

/// Confirms a switch after [`CONFIRM_SAMPLES`] consecutive active polls
///
/// Each poll shifts the raw level into the register with the upper bits
/// forced high. The register reads all ones only after enough active
/// samples in a row; it is then cleared, so a held switch confirms again
/// every `CONFIRM_SAMPLES` polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShiftDebounce {
    register: u16,
}

impl ShiftDebounce {
    pub const fn new() -> Self {
        Self { register: 0 }
    }

    /// Shift in one raw sample, returns true when the switch is confirmed
    pub fn poll(&mut self, active: bool) -> bool {
        self.register = (self.register << 1) | u16::from(active) | FORCED_HIGH;
        if self.register == u16::MAX {
            self.register = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.register = 0;
    }
}
