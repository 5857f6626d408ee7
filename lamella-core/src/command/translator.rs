//! Command translator
//!
//! Validation happens here, against the last published motor status, so
//! that only requests the control task can act on ever reach the pending
//! slot. The status may be one iteration stale; the control task repeats
//! the limit check before starting.

use embassy_sync::blocking_mutex::raw::RawMutex;
use lamella_protocol::{
    ActionCommand, AppCommand, BleepPattern, CommandError, ConfigKey, Message, Topic,
};

use crate::config::{ConfigError, Configuration, MotionConfig};
use crate::position::percent_to_target;
use crate::shared::{ControlContext, RemoteAction};
use crate::state::{Direction, MotorStatus, StopReason};

/// Pattern played for refused commands (`"1x1.1.1"`)
pub const REJECTED_PATTERN: [u16; 3] = [1, 1, 1];

/// Why a command was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rejection {
    /// `action` received while remote control is disabled
    RemoteControlDisabled,
    /// `notify` received while remote bleeps are disabled
    RemoteBleepDisabled,
    /// Payload did not parse
    Malformed(CommandError),
    /// Position unknown while a bounded open was requested
    PositionUnknown,
    /// Target beyond the open bound
    OutOfBounds,
    /// Target equals the current position
    AlreadyAtTarget,
    /// Open limit asserted
    AlreadyOpen,
    /// Closed limit asserted, or position zero in rotation mode
    AlreadyClosed,
    /// No rotation bound and no open timer while not closed
    NoBound,
    /// Configuration value refused
    InvalidSetting(ConfigError),
}

impl Rejection {
    /// Audible feedback, `None` for silently ignored commands
    pub fn pattern(self) -> Option<BleepPattern> {
        match self {
            Rejection::RemoteControlDisabled | Rejection::RemoteBleepDisabled => None,
            _ => Some(BleepPattern::from_segments(1, &REJECTED_PATTERN)),
        }
    }
}

/// A validated remote action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RemoteRequest {
    Move(RemoteAction),
    Stop,
}

/// Validate an `action` command against the motor status
pub fn translate_action(
    cmd: ActionCommand,
    status: &MotorStatus,
    motion: &MotionConfig,
) -> Result<RemoteRequest, Rejection> {
    let closed = status.limits.closed;
    let open_limit = status.limits.open;
    let position = if closed { Some(0) } else { status.position };

    match cmd {
        ActionCommand::Stop => Ok(RemoteRequest::Stop),

        ActionCommand::Close => {
            if closed || (motion.rotation_limits && position == Some(0)) {
                return Err(Rejection::AlreadyClosed);
            }
            Ok(RemoteRequest::Move(RemoteAction {
                direction: Direction::Close,
                target: Some(0),
            }))
        }

        ActionCommand::Open { .. } if motion.max_open_rotations == 0 => {
            if open_limit {
                Err(Rejection::AlreadyOpen)
            } else if !closed && motion.open_duration_s == 0 {
                Err(Rejection::NoBound)
            } else {
                Ok(RemoteRequest::Move(RemoteAction {
                    direction: Direction::Open,
                    target: None,
                }))
            }
        }

        ActionCommand::Open { percent } => {
            let max = motion.max_open_rotations;
            let target = match percent {
                Some(p) => percent_to_target(p, max),
                None => max,
            };

            let Some(pos) = position else {
                return Err(Rejection::PositionUnknown);
            };
            if target > max {
                return Err(Rejection::OutOfBounds);
            }
            if target == pos {
                return Err(Rejection::AlreadyAtTarget);
            }
            if target > pos && open_limit {
                return Err(Rejection::AlreadyOpen);
            }

            let direction = if target > pos {
                Direction::Open
            } else {
                Direction::Close
            };
            Ok(RemoteRequest::Move(RemoteAction {
                direction,
                target: Some(target),
            }))
        }
    }
}

/// Outcome of handling one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// Not for us (outbound topic echoed back)
    Ignored,
    /// Request handed to the control task
    Accepted,
    Rejected(Rejection),
    /// Publish status and telemetry
    ReportState,
    /// Publish the configuration
    ReportConfig,
    /// A setting changed: persist it and publish the configuration
    ConfigChanged(ConfigKey),
    /// Restart the controller once the motor is idle
    Restart,
    /// Play this pattern
    Bleep(BleepPattern),
    /// Link heartbeat
    Heartbeat,
}

/// Owns the configuration and applies inbound commands
pub struct CommandTranslator {
    config: Configuration,
}

impl CommandTranslator {
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Handle one inbound message
    pub fn handle<M: RawMutex>(&mut self, msg: &Message<'_>, ctx: &ControlContext<M>) -> Response {
        match msg.topic {
            Topic::Action => self.handle_action(msg.payload, ctx),
            Topic::AppCmd => self.handle_appcmd(msg.payload, ctx),
            Topic::Notify => {
                if !self.config.remote.allow_remote_bleep {
                    return Response::Rejected(Rejection::RemoteBleepDisabled);
                }
                match BleepPattern::parse(msg.payload) {
                    Ok(pattern) => Response::Bleep(pattern),
                    Err(e) => Response::Rejected(Rejection::Malformed(e)),
                }
            }
            Topic::Ping => Response::Heartbeat,
            Topic::State | Topic::Config | Topic::AppState => Response::Ignored,
        }
    }

    fn handle_action<M: RawMutex>(&self, payload: &str, ctx: &ControlContext<M>) -> Response {
        if !self.config.remote.allow_remote_control {
            return Response::Rejected(Rejection::RemoteControlDisabled);
        }
        let cmd = match ActionCommand::parse(payload) {
            Ok(cmd) => cmd,
            Err(e) => return Response::Rejected(Rejection::Malformed(e)),
        };

        match translate_action(cmd, &ctx.status(), &self.config.motion) {
            Ok(RemoteRequest::Stop) => {
                ctx.request_stop(StopReason::Remote);
                Response::Accepted
            }
            Ok(RemoteRequest::Move(action)) => {
                ctx.submit(action);
                Response::Accepted
            }
            Err(rejection) => Response::Rejected(rejection),
        }
    }

    fn handle_appcmd<M: RawMutex>(&mut self, payload: &str, ctx: &ControlContext<M>) -> Response {
        let cmd = match AppCommand::parse(payload) {
            Ok(cmd) => cmd,
            Err(e) => return Response::Rejected(Rejection::Malformed(e)),
        };

        match cmd {
            AppCommand::Restart => Response::Restart,
            AppCommand::GetState => Response::ReportState,
            AppCommand::GetConfig => Response::ReportConfig,
            AppCommand::Set { key, value } => match self.config.apply(key, &value) {
                Ok(()) => {
                    ctx.set_motion_config(self.config.motion);
                    Response::ConfigChanged(key)
                }
                Err(e) => Response::Rejected(Rejection::InvalidSetting(e)),
            },
        }
    }
}
