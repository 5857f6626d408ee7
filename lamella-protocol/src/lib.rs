//! Lamella Command Protocol
//!
//! This crate defines the text vocabulary spoken between the blinds
//! controller and the outside world. The transport (MQTT bridge, UART link)
//! is not part of this crate; only the topics and payload grammar are.
//!
//! # Protocol Overview
//!
//! Every message is a topic plus a UTF-8 payload. On the serial link a
//! message is a single line:
//! ```text
//! ┌────────┬───────┬──────────────────────┬────┐
//! │ TOPIC  │ SPACE │ PAYLOAD              │ LF │
//! │ ascii  │ 1B    │ 0–200B utf-8         │ 1B │
//! └────────┴───────┴──────────────────────┴────┘
//! ```
//!
//! Inbound topics:
//! - `action`: `open`, `open:<0-100>`, `close`, `stop`
//! - `appcmd`: `restart`, `getstate`, `getconfig`, `<ConfigKey>:<value>`
//! - `notify`: bleep pattern `"<repeats>x<d>.<d>..."`
//! - `ping`: link heartbeat, empty payload
//!
//! Outbound topics carry JSON objects: `state`, `config`, `app_state`.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod action;
pub mod appcmd;
pub mod bleep;
pub mod error;
pub mod report;
pub mod topic;

pub use action::ActionCommand;
pub use appcmd::{AppCommand, ConfigKey, SettingValue, ValueKind};
pub use bleep::{BleepPattern, Tone, BLEEP_OFF_MS, BLEEP_ON_MS, BLEEP_REPEAT_GAP_MS, BLEEP_SILENCE_MS};
pub use error::CommandError;
pub use report::{AppStateReport, ConfigReport, StatusReport};
pub use topic::{LineAssembler, Message, Topic, MAX_LINE_SIZE};
