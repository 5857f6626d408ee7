//! Configuration types
//!
//! [`Configuration`] is owned by the command translator. The motion part is
//! copied into the shared control context whenever it changes; everything
//! else stays in the background context.

pub mod settings;
pub mod types;

pub use settings::{ConfigError, StoredSetting};
pub use types::*;
