//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in lamella-core and lamella-hal:
//!
//! - Motor output stage (IBT-2 style dual half-bridge)
//! - Buzzer pattern player
//! - Settings and position persistence over [`lamella_hal::FlashStorage`]

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod buzzer;
pub mod motor;
pub mod storage;
