//! Soft-start ramp
//!
//! The ramp is a finite sequence of (duty, wait) steps. The caller checks
//! for cancellation between steps, so a stop request never waits for the
//! whole ramp.

use crate::traits::{PWM_MAX_DUTY, PWM_MIN_DUTY};

/// Time between duty increments
pub const RAMP_STEP_MS: u32 = 5;

/// One ramp step: apply `duty`, then wait `wait_ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampStep {
    pub duty: u8,
    pub wait_ms: u32,
}

/// Linear duty ramp from [`PWM_MIN_DUTY`] to [`PWM_MAX_DUTY`]
#[derive(Debug, Clone)]
pub struct SoftStart {
    next: Option<u8>,
}

impl SoftStart {
    pub const fn new() -> Self {
        Self {
            next: Some(PWM_MIN_DUTY),
        }
    }
}

impl Default for SoftStart {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for SoftStart {
    type Item = RampStep;

    fn next(&mut self) -> Option<RampStep> {
        let duty = self.next?;
        self.next = if duty < PWM_MAX_DUTY {
            Some(duty + 1)
        } else {
            None
        };
        Some(RampStep {
            duty,
            wait_ms: RAMP_STEP_MS,
        })
    }
}
