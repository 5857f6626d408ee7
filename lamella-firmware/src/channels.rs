//! Inter-task communication
//!
//! The control context is the only state shared with the high-priority
//! executor. Everything else crosses tasks through these queues.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::String;

use lamella_core::config::Configuration;
use lamella_core::control::Iteration;
use lamella_core::shared::ControlContext;
use lamella_hal_rp2040::inputs::ButtonLevels;
use lamella_protocol::{BleepPattern, ConfigKey, MAX_LINE_SIZE};

/// Outbound lines can carry the full configuration report
pub const OUTBOUND_LINE_SIZE: usize = 512;

/// Request flags, motion settings and the published motor status
pub static CONTROL: ControlContext<CriticalSectionRawMutex> = ControlContext::new();

/// Button levels mirrored by the button edge tasks
pub static BUTTON_LEVELS: ButtonLevels = ButtonLevels::new();

/// Complete lines received from the link
pub static INBOUND: Channel<CriticalSectionRawMutex, String<MAX_LINE_SIZE>, 4> = Channel::new();

/// Encoded lines waiting for the link
pub static OUTBOUND: Channel<CriticalSectionRawMutex, String<OUTBOUND_LINE_SIZE>, 8> =
    Channel::new();

/// Iterations with side effects, from the control task
pub static CONTROL_EVENTS: Channel<CriticalSectionRawMutex, Iteration, 8> = Channel::new();

/// Patterns queued for the buzzer
pub static BLEEP: Channel<CriticalSectionRawMutex, BleepPattern, 4> = Channel::new();

/// Flash writes queued for the persistence task
pub static PERSIST: Channel<CriticalSectionRawMutex, PersistRequest, 4> = Channel::new();

/// A `ping` line arrived
pub static HEARTBEAT_RECEIVED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// `appcmd:restart` was accepted
pub static RESTART_REQUESTED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Something to write to flash
pub enum PersistRequest {
    /// Rotation count in stored form
    Position(i32),
    /// One configuration field, taken from this snapshot
    Setting(ConfigKey, Configuration),
}
