//! Board-agnostic core logic for the blinds controller
//!
//! This crate contains all control logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (motor outputs, switches, current sense)
//! - Debounce layer for buttons, limit switches and the rotation sensor
//! - Shared control context crossing interrupt, control and background contexts
//! - Motor state machine and the control-task iteration
//! - Safety monitoring (run timers, over-current, limit faults, link health)
//! - Rotation-based position tracking
//! - Command translation and configuration

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod config;
pub mod control;
pub mod debounce;
pub mod position;
pub mod safety;
pub mod shared;
pub mod state;
pub mod traits;
