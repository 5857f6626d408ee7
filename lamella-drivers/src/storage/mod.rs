//! Persistence of settings and the blinds position

pub mod settings;

pub use settings::{storage_key, LoadSummary, SettingsError, SettingsStore};
