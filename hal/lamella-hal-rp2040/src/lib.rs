//! RP2040-specific HAL for the blinds controller
//!
//! This crate provides RP2040 implementations of the `lamella-hal` storage
//! trait and the `lamella-core` hardware traits:
//!
//! - Flash storage driver (implements `lamella_hal::FlashStorage`)
//! - PWM slice setup for the two H-bridge PWM lines
//! - ADC current sense (implements `lamella_core::traits::CurrentSensor`)
//! - Limit switch and button inputs (implements `lamella_core::traits::SwitchInputs`)

#![no_std]

pub mod adc;
pub mod flash;
pub mod inputs;
pub mod pwm;

// Re-export shared traits from lamella-hal for convenience
pub use lamella_hal::{FlashStorage as FlashStorageTrait, StorageKey};
