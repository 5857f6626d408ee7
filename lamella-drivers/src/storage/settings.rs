//! Settings store
//!
//! Every configuration key and the last blinds position live under their own
//! [`StorageKey`] as postcard-encoded values. Loading never fails as a whole:
//! a missing or undecodable record leaves that field at its default.

use lamella_core::config::{Configuration, StoredSetting};
use lamella_core::position::UNKNOWN_POSITION;
use lamella_hal::{FlashError, FlashStorage, StorageKey};
use lamella_protocol::ConfigKey;

/// Largest encoded record (the credentials pair)
const MAX_RECORD_SIZE: usize = 128;

/// Settings persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Flash operation failed
    Flash(FlashError),
    /// Serialization failed
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Stored value does not fit the field
    Invalid,
}

impl From<FlashError> for SettingsError {
    fn from(e: FlashError) -> Self {
        SettingsError::Flash(e)
    }
}

/// Flash key holding a configuration field
pub fn storage_key(key: ConfigKey) -> StorageKey {
    match key {
        ConfigKey::StateInterval => StorageKey::StateInterval,
        ConfigKey::LuxInterval => StorageKey::LuxInterval,
        ConfigKey::TempInterval => StorageKey::TempInterval,
        ConfigKey::OpenDuration => StorageKey::OpenDuration,
        ConfigKey::MaxRunDuration => StorageKey::MaxRunDuration,
        ConfigKey::MaxOpenRotations => StorageKey::MaxOpenRotations,
        ConfigKey::RotationLimits => StorageKey::RotationLimits,
        ConfigKey::ClosedRotationOffset => StorageKey::ClosedRotationOffset,
        ConfigKey::DebounceDurSwitches => StorageKey::DebounceDurSwitches,
        ConfigKey::DebounceDurMotor => StorageKey::DebounceDurMotor,
        ConfigKey::MinLuxReportDelta => StorageKey::MinLuxReportDelta,
        ConfigKey::MaxCurrentLimit => StorageKey::MaxCurrentLimit,
        ConfigKey::AllowRemoteControl => StorageKey::AllowRemoteControl,
        ConfigKey::AllowRemoteBleep => StorageKey::AllowRemoteBleep,
        ConfigKey::WiFiSetup => StorageKey::WiFiSetup,
    }
}

/// Outcome of [`SettingsStore::load`], for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadSummary {
    /// Fields read from flash
    pub restored: u8,
    /// Fields never written
    pub missing: u8,
    /// Fields that could not be read or decoded
    pub invalid: u8,
}

/// Settings and position persistence over a [`FlashStorage`]
pub struct SettingsStore<S> {
    flash: S,
}

impl<S: FlashStorage> SettingsStore<S> {
    pub fn new(flash: S) -> Self {
        Self { flash }
    }

    /// Load the full configuration, falling back to defaults per key
    pub async fn load(&mut self) -> (Configuration, LoadSummary) {
        let mut config = Configuration::default();
        let mut summary = LoadSummary::default();

        for key in ConfigKey::ALL {
            match self.load_setting(key).await {
                Ok(stored) => match config.restore(key, &stored) {
                    Ok(()) => summary.restored += 1,
                    Err(_) => summary.invalid += 1,
                },
                Err(SettingsError::Flash(FlashError::NotFound)) => summary.missing += 1,
                Err(_) => summary.invalid += 1,
            }
        }

        (config, summary)
    }

    /// Read one stored field
    pub async fn load_setting(&mut self, key: ConfigKey) -> Result<StoredSetting, SettingsError> {
        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let len = self.flash.read(storage_key(key), &mut buffer).await?;
        postcard::from_bytes(&buffer[..len]).map_err(|_| SettingsError::Deserialize)
    }

    /// Persist the field behind `key` from `config`
    pub async fn save(
        &mut self,
        key: ConfigKey,
        config: &Configuration,
    ) -> Result<(), SettingsError> {
        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let bytes = postcard::to_slice(&config.stored(key), &mut buffer)
            .map_err(|_| SettingsError::Serialize)?;
        self.flash.write(storage_key(key), bytes).await?;
        Ok(())
    }

    /// Last persisted rotation count, [`UNKNOWN_POSITION`] if none
    pub async fn load_position(&mut self) -> i32 {
        self.try_load_position().await.unwrap_or(UNKNOWN_POSITION)
    }

    async fn try_load_position(&mut self) -> Result<i32, SettingsError> {
        let mut buffer = [0u8; 8];
        let len = self
            .flash
            .read(StorageKey::BlindsPosition, &mut buffer)
            .await?;
        let position: i32 =
            postcard::from_bytes(&buffer[..len]).map_err(|_| SettingsError::Deserialize)?;
        if position < UNKNOWN_POSITION {
            return Err(SettingsError::Invalid);
        }
        Ok(position)
    }

    /// Persist the rotation count (`-1` = unknown)
    pub async fn save_position(&mut self, position: i32) -> Result<(), SettingsError> {
        let mut buffer = [0u8; 8];
        let bytes =
            postcard::to_slice(&position, &mut buffer).map_err(|_| SettingsError::Serialize)?;
        self.flash.write(StorageKey::BlindsPosition, bytes).await?;
        Ok(())
    }
}
