//! Published motor status

use lamella_protocol::StatusReport;

use super::machine::{Direction, MotorIntent, Phase};
use crate::config::MotionConfig;
use crate::position::percentage;

/// Confirmed limit switch state
///
/// At most one side is set at a time: confirming one side clears the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LimitState {
    pub closed: bool,
    pub open: bool,
}

impl LimitState {
    pub fn is_set(&self, direction: Direction) -> bool {
        match direction {
            Direction::Open => self.open,
            Direction::Close => self.closed,
        }
    }

    /// Mark one side set, clearing the other
    pub fn confirm(&mut self, direction: Direction) {
        match direction {
            Direction::Open => {
                self.open = true;
                self.closed = false;
            }
            Direction::Close => {
                self.closed = true;
                self.open = false;
            }
        }
    }
}

/// Snapshot of the motor published by the control task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorStatus {
    pub phase: Phase,
    pub intent: MotorIntent,
    pub allow_to_run: bool,
    /// Rotations from closed, `None` when unknown
    pub position: Option<u32>,
    pub limits: LimitState,
}

impl MotorStatus {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            intent: MotorIntent::Idle,
            allow_to_run: false,
            position: None,
            limits: LimitState {
                closed: false,
                open: false,
            },
        }
    }

    /// Motor is being driven
    pub fn is_running(&self) -> bool {
        self.phase.is_active()
    }

    /// Payload for the `state` topic
    pub fn report(&self, motion: &MotionConfig) -> StatusReport {
        if self.limits.closed {
            return StatusReport {
                closed: true,
                percentage: Some(0),
            };
        }

        let percentage = match self.position {
            Some(pos) if motion.rotation_limits && motion.max_open_rotations > 0 => {
                Some(percentage(pos, motion.max_open_rotations))
            }
            _ => None,
        };
        StatusReport {
            closed: false,
            percentage,
        }
    }
}

impl Default for MotorStatus {
    fn default() -> Self {
        Self::new()
    }
}
