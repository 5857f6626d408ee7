//! One-shot run timers
//!
//! Deadlines are owned by the control task and polled every iteration.
//! An expired deadline turns into the same stop request as any other
//! source.

use crate::config::MotionConfig;
use crate::state::{Direction, Owner, StopReason};

/// A cancellable one-shot deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deadline {
    at_ms: Option<u64>,
}

impl Deadline {
    pub const fn new() -> Self {
        Self { at_ms: None }
    }

    pub fn arm(&mut self, now_ms: u64, duration_ms: u64) {
        self.at_ms = Some(now_ms.saturating_add(duration_ms));
    }

    pub fn cancel(&mut self) {
        self.at_ms = None;
    }

    /// Returns true once, when the deadline has passed
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.at_ms {
            Some(at) if now_ms >= at => {
                self.at_ms = None;
                true
            }
            _ => false,
        }
    }
}

/// The two run-duration caps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunTimers {
    open_duration: Deadline,
    max_run: Deadline,
}

impl RunTimers {
    pub const fn new() -> Self {
        Self {
            open_duration: Deadline::new(),
            max_run: Deadline::new(),
        }
    }

    /// Arm the caps that apply to a run starting now
    ///
    /// The open-duration cap only bounds remote opens; the max-run cap
    /// bounds every run.
    pub fn arm(&mut self, now_ms: u64, direction: Direction, owner: Owner, motion: &MotionConfig) {
        self.cancel();
        if owner == Owner::Remote && direction == Direction::Open && motion.open_duration_s > 0 {
            self.open_duration
                .arm(now_ms, u64::from(motion.open_duration_s) * 1000);
        }
        if motion.max_run_duration_s > 0 {
            self.max_run
                .arm(now_ms, u64::from(motion.max_run_duration_s) * 1000);
        }
    }

    pub fn cancel(&mut self) {
        self.open_duration.cancel();
        self.max_run.cancel();
    }

    /// Expired cap, if any
    pub fn poll(&mut self, now_ms: u64) -> Option<StopReason> {
        if self.max_run.poll(now_ms) {
            return Some(StopReason::MaxRunDuration);
        }
        if self.open_duration.poll(now_ms) {
            return Some(StopReason::OpenDuration);
        }
        None
    }
}
