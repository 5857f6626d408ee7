//! State machine definition
//!
//! The run phase is a function of the current phase and an event. Who owns
//! the motor and where it is heading lives in [`MotorIntent`].

use super::events::PhaseEvent;

/// Direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Open,
    Close,
}

impl Direction {
    /// Array index for per-direction state
    pub const fn index(self) -> usize {
        match self {
            Direction::Open => 0,
            Direction::Close => 1,
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::Open => Direction::Close,
            Direction::Close => Direction::Open,
        }
    }

    /// Both directions, in index order
    pub const ALL: [Direction; 2] = [Direction::Open, Direction::Close];
}

/// Actor holding the motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Owner {
    /// Network command
    Remote,
    /// Manual push button
    Button,
    /// Forced by a limit, bound or safety condition
    Limit,
}

/// Why the motor was stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopReason {
    /// `action:stop`
    Remote,
    /// Button edge while running
    Button,
    /// Open limit switch confirmed
    OpenLimit,
    /// Closed limit switch confirmed
    ClosedLimit,
    /// Rotation count reached the open bound
    RotationBound,
    /// Remote target position reached
    TargetReached,
    /// Closed-rotation offset used up
    ClosedOffsetReached,
    /// Remote open run cap expired
    OpenDuration,
    /// Overall run cap expired
    MaxRunDuration,
    /// Current draw above threshold
    OverCurrent,
    /// Both limit switches asserted
    LimitFault,
    /// Motor output driver reported an error
    OutputFault,
}

impl StopReason {
    /// Actor on whose behalf the stop happened
    pub fn initiator(self) -> Owner {
        match self {
            StopReason::Remote => Owner::Remote,
            StopReason::Button => Owner::Button,
            _ => Owner::Limit,
        }
    }

    /// Whether this stop is a safety violation
    pub fn is_safety(self) -> bool {
        matches!(
            self,
            StopReason::OpenDuration
                | StopReason::MaxRunDuration
                | StopReason::OverCurrent
                | StopReason::LimitFault
                | StopReason::RotationBound
                | StopReason::OutputFault
        )
    }
}

/// What the motor is doing and for whom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorIntent {
    Idle,
    Opening { owner: Owner, target: Option<u32> },
    Closing { owner: Owner, target: Option<u32> },
    Stopping { reason: StopReason },
}

impl MotorIntent {
    /// Build a moving intent
    pub fn moving(direction: Direction, owner: Owner, target: Option<u32>) -> Self {
        match direction {
            Direction::Open => MotorIntent::Opening { owner, target },
            Direction::Close => MotorIntent::Closing { owner, target },
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            MotorIntent::Opening { .. } => Some(Direction::Open),
            MotorIntent::Closing { .. } => Some(Direction::Close),
            _ => None,
        }
    }

    pub fn owner(&self) -> Option<Owner> {
        match self {
            MotorIntent::Opening { owner, .. } | MotorIntent::Closing { owner, .. } => Some(*owner),
            MotorIntent::Stopping { reason } => Some(reason.initiator()),
            MotorIntent::Idle => None,
        }
    }

    pub fn target(&self) -> Option<u32> {
        match self {
            MotorIntent::Opening { target, .. } | MotorIntent::Closing { target, .. } => *target,
            _ => None,
        }
    }
}

/// Motor run phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Outputs released, ready for a new owner
    Idle,
    /// Enable lines asserted, ramping duty
    Starting,
    /// Full duty, monitoring limits and rotations
    Running,
    /// Releasing outputs
    Stopping,
}

impl Phase {
    /// Check if the motor is being driven
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Starting | Phase::Running)
    }

    /// Process an event and return the next phase
    pub fn transition(self, event: PhaseEvent) -> Self {
        use Phase::*;
        use PhaseEvent::*;

        match (self, event) {
            (Idle, Start) => Starting,
            (Starting, RampDone) => Running,

            // Stop is accepted everywhere; from Idle it is the idempotent
            // release path
            (Idle | Starting | Running, Stop) => Stopping,
            (Stopping, Released) => Idle,

            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_cycle() {
        let phase = Phase::Idle
            .transition(PhaseEvent::Start)
            .transition(PhaseEvent::RampDone);
        assert_eq!(phase, Phase::Running);
        assert!(phase.is_active());

        let phase = phase.transition(PhaseEvent::Stop);
        assert_eq!(phase, Phase::Stopping);
        assert_eq!(phase.transition(PhaseEvent::Released), Phase::Idle);
    }

    #[test]
    fn test_stop_during_ramp() {
        let phase = Phase::Starting.transition(PhaseEvent::Stop);
        assert_eq!(phase, Phase::Stopping);
    }

    #[test]
    fn test_start_ignored_unless_idle() {
        for phase in [Phase::Starting, Phase::Running, Phase::Stopping] {
            assert_eq!(phase.transition(PhaseEvent::Start), phase);
        }
    }

    #[test]
    fn test_intent_accessors() {
        let intent = MotorIntent::moving(Direction::Open, Owner::Remote, Some(10));
        assert_eq!(intent.direction(), Some(Direction::Open));
        assert_eq!(intent.owner(), Some(Owner::Remote));
        assert_eq!(intent.target(), Some(10));

        let stopping = MotorIntent::Stopping {
            reason: StopReason::ClosedLimit,
        };
        assert_eq!(stopping.direction(), None);
        assert_eq!(stopping.owner(), Some(Owner::Limit));
        assert_eq!(stopping.target(), None);
        assert_eq!(MotorIntent::Idle.owner(), None);
    }

    #[test]
    fn test_direction_helpers() {
        assert_eq!(Direction::Open.opposite(), Direction::Close);
        assert_eq!(Direction::Close.index(), 1);
    }
}
