//! Lamella Hardware Abstraction Layer
//!
//! Persistence traits shared by the settings store and the chip-specific
//! flash backends. Motor and sensor traits live in `lamella-core`, since
//! the control loop is written against them directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  lamella-drivers (SettingsStore)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lamella-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lamella-hal-rp2040 (flash backend)     │
//! └─────────────────────────────────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod flash;

pub use flash::{FlashError, FlashStorage, StorageKey};
