//! Safety monitor implementation
//!
//! Evaluated once per control iteration. Returns the first violated
//! condition; the caller turns it into a stop request.

use crate::config::MotionConfig;
use crate::state::StopReason;
use crate::traits::CurrentSensor;

use super::timer::RunTimers;

/// Minimum spacing of current samples while running
pub const CURRENT_SAMPLE_INTERVAL_MS: u64 = 200;

/// Safety condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyStatus {
    /// All conditions normal
    Ok,
    /// Safety condition violated
    Fault(StopReason),
}

/// Safety monitor for fault detection
#[derive(Debug, Clone, Default)]
pub struct SafetyMonitor {
    timers: RunTimers,
    last_current_sample_ms: Option<u64>,
}

impl SafetyMonitor {
    pub const fn new() -> Self {
        Self {
            timers: RunTimers::new(),
            last_current_sample_ms: None,
        }
    }

    /// Run timers, armed and cancelled by the controller
    pub fn timers_mut(&mut self) -> &mut RunTimers {
        &mut self.timers
    }

    /// Check all safety conditions for a running motor
    ///
    /// `limit_closed`/`limit_open` are raw (undebounced) levels. Nothing is
    /// checked while the motor is idle.
    pub fn check<C: CurrentSensor>(
        &mut self,
        now_ms: u64,
        running: bool,
        limit_closed: bool,
        limit_open: bool,
        sensor: &mut C,
        motion: &MotionConfig,
    ) -> SafetyStatus {
        if !running {
            self.last_current_sample_ms = None;
            return SafetyStatus::Ok;
        }

        if limit_closed && limit_open {
            return SafetyStatus::Fault(StopReason::LimitFault);
        }

        if self.current_due(now_ms) {
            self.last_current_sample_ms = Some(now_ms);
            if let Some(reading) = sensor.read_current() {
                if motion.max_current > 0 && reading > motion.max_current {
                    return SafetyStatus::Fault(StopReason::OverCurrent);
                }
            }
        }

        match self.timers.poll(now_ms) {
            Some(reason) => SafetyStatus::Fault(reason),
            None => SafetyStatus::Ok,
        }
    }

    fn current_due(&self, now_ms: u64) -> bool {
        match self.last_current_sample_ms {
            Some(last) => now_ms.saturating_sub(last) >= CURRENT_SAMPLE_INTERVAL_MS,
            None => true,
        }
    }
}
