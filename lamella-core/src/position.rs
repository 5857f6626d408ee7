//! Rotation-count position tracking
//!
//! Position is the number of confirmed motor-axis rotations from the closed
//! end. It is unknown until the closed limit is seen or a persisted value is
//! restored.

use crate::config::{ClosedOffset, MotionConfig};
use crate::state::{Direction, Owner, StopReason};

/// Persisted marker for an unknown position
pub const UNKNOWN_POSITION: i32 = -1;

/// `round(pos * 100 / max)`, `max` must be nonzero
///
/// Saturates at `u32::MAX` for positions far past the bound.
pub fn percentage(position: u32, max_rotations: u32) -> u32 {
    let pos = u64::from(position);
    let max = u64::from(max_rotations.max(1));
    u32::try_from((pos * 200 + max) / (2 * max)).unwrap_or(u32::MAX)
}

/// `round(percent / 100 * max)`
pub fn percent_to_target(percent: u16, max_rotations: u32) -> u32 {
    let num = u64::from(percent) * u64::from(max_rotations);
    u32::try_from((num * 2 + 100) / 200).unwrap_or(u32::MAX)
}

/// Decode a persisted position
pub fn from_stored(raw: i32) -> Option<u32> {
    u32::try_from(raw).ok()
}

/// Encode a position for persistence
pub fn to_stored(position: Option<u32>) -> i32 {
    position
        .and_then(|p| i32::try_from(p).ok())
        .unwrap_or(UNKNOWN_POSITION)
}

/// Tracks position and the closed-offset overrun of the current run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PositionTracker {
    position: Option<u32>,
    /// Extra rotations counted after reaching zero while closing
    closed_overrun: Option<u32>,
}

impl PositionTracker {
    pub const fn new(position: Option<u32>) -> Self {
        Self {
            position,
            closed_overrun: None,
        }
    }

    pub fn position(&self) -> Option<u32> {
        self.position
    }

    /// Closed limit confirmed
    pub fn set_closed(&mut self) {
        self.position = Some(0);
    }

    /// Position can no longer be trusted
    pub fn invalidate(&mut self) {
        self.position = None;
    }

    /// Reset per-run counters
    pub fn begin_run(&mut self) {
        self.closed_overrun = None;
    }

    /// Apply one confirmed rotation, returns a stop request if a bound or
    /// target was reached
    pub fn on_rotation(
        &mut self,
        direction: Direction,
        owner: Owner,
        target: Option<u32>,
        motion: &MotionConfig,
    ) -> Option<StopReason> {
        let pos = self.position?;
        let remote = owner == Owner::Remote;

        let bound = match direction {
            Direction::Close => {
                let pos = pos.saturating_sub(1);
                self.position = Some(pos);
                if pos == 0 && motion.rotation_limits && remote {
                    self.closed_offset_step(motion.closed_offset())
                } else {
                    None
                }
            }
            Direction::Open => {
                let pos = pos.saturating_add(1);
                self.position = Some(pos);
                if motion.rotation_limits && remote && pos >= motion.max_open_rotations {
                    Some(StopReason::RotationBound)
                } else {
                    None
                }
            }
        };
        if bound.is_some() {
            return bound;
        }

        let pos = self.position?;
        match target {
            Some(t) if remote && t > 0 => {
                let reached = match direction {
                    Direction::Open => pos >= t,
                    Direction::Close => pos <= t,
                };
                reached.then_some(StopReason::TargetReached)
            }
            _ => None,
        }
    }

    fn closed_offset_step(&mut self, offset: ClosedOffset) -> Option<StopReason> {
        match offset {
            ClosedOffset::Ignore => None,
            ClosedOffset::Immediate => Some(StopReason::ClosedOffsetReached),
            ClosedOffset::Extra(extra) => match self.closed_overrun {
                None => {
                    self.closed_overrun = Some(1);
                    None
                }
                Some(count) if count < extra => {
                    self.closed_overrun = Some(count + 1);
                    None
                }
                Some(_) => Some(StopReason::ClosedOffsetReached),
            },
        }
    }
}
