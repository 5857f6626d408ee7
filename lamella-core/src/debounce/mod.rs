//! Debounce layer
//!
//! Two shapes are used:
//! - [`EdgeDebounce`]: time-window filter for interrupt-driven edges
//!   (buttons, rotation sensor)
//! - [`ShiftDebounce`]: consecutive-sample confirmation for polled limit
//!   switches

mod edge;
mod shift;

pub use edge::EdgeDebounce;
pub use shift::{ShiftDebounce, CONFIRM_SAMPLES};
