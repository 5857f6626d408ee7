//! Per-key configuration access
//!
//! Every [`ConfigKey`] maps to one field of [`Configuration`]. Values arrive
//! from `appcmd` as [`SettingValue`]s and are persisted as [`StoredSetting`]s.

use heapless::String;
use lamella_protocol::{ConfigKey, ConfigReport, SettingValue};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::{Configuration, Credentials, MAX_PASSWORD_LEN, MAX_SSID_LEN};

/// Errors applying a value to a configuration key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Value shape does not match the key
    TypeMismatch,
    /// Value cannot be represented by the field
    OutOfRange,
    /// String value exceeds its buffer
    TooLong,
}

/// Persisted form of a single configuration field
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StoredSetting {
    Int(i32),
    Bool(bool),
    Credentials {
        ssid: String<MAX_SSID_LEN>,
        password: String<MAX_PASSWORD_LEN>,
    },
}

fn unsigned(value: i32) -> Result<u32, ConfigError> {
    u32::try_from(value).map_err(|_| ConfigError::OutOfRange)
}

fn signed(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl Configuration {
    /// Apply a parsed `appcmd` value to the field behind `key`
    pub fn apply(&mut self, key: ConfigKey, value: &SettingValue<'_>) -> Result<(), ConfigError> {
        match (key, *value) {
            (ConfigKey::WiFiSetup, SettingValue::DefaultCredentials) => {
                self.credentials = Credentials::default();
                Ok(())
            }
            (ConfigKey::WiFiSetup, SettingValue::Credentials { ssid, password }) => {
                self.credentials = Credentials::new(ssid, password).ok_or(ConfigError::TooLong)?;
                Ok(())
            }
            (key, SettingValue::Int(v)) => self.set_int(key, v),
            (key, SettingValue::Bool(v)) => self.set_bool(key, v),
            _ => Err(ConfigError::TypeMismatch),
        }
    }

    /// Restore a field from its persisted form
    pub fn restore(&mut self, key: ConfigKey, stored: &StoredSetting) -> Result<(), ConfigError> {
        match stored {
            StoredSetting::Int(v) => self.set_int(key, *v),
            StoredSetting::Bool(v) => self.set_bool(key, *v),
            StoredSetting::Credentials { ssid, password } if key == ConfigKey::WiFiSetup => {
                self.credentials = Credentials {
                    ssid: ssid.clone(),
                    password: password.clone(),
                };
                Ok(())
            }
            StoredSetting::Credentials { .. } => Err(ConfigError::TypeMismatch),
        }
    }

    /// Persisted form of the field behind `key`
    pub fn stored(&self, key: ConfigKey) -> StoredSetting {
        let m = &self.motion;
        let r = &self.remote;
        match key {
            ConfigKey::AllowRemoteControl => StoredSetting::Bool(r.allow_remote_control),
            ConfigKey::AllowRemoteBleep => StoredSetting::Bool(r.allow_remote_bleep),
            ConfigKey::RotationLimits => StoredSetting::Bool(m.rotation_limits),
            ConfigKey::MinLuxReportDelta => StoredSetting::Int(signed(r.min_lux_report_delta)),
            ConfigKey::LuxInterval => StoredSetting::Int(signed(r.lux_interval_min)),
            ConfigKey::TempInterval => StoredSetting::Int(signed(r.temp_interval_min)),
            ConfigKey::StateInterval => StoredSetting::Int(signed(r.state_interval_min)),
            ConfigKey::DebounceDurSwitches => StoredSetting::Int(signed(m.debounce_switches_ms)),
            ConfigKey::DebounceDurMotor => StoredSetting::Int(signed(m.debounce_rotation_ms)),
            ConfigKey::ClosedRotationOffset => StoredSetting::Int(m.closed_offset_raw),
            ConfigKey::OpenDuration => StoredSetting::Int(signed(m.open_duration_s)),
            ConfigKey::MaxOpenRotations => StoredSetting::Int(signed(m.max_open_rotations)),
            ConfigKey::MaxCurrentLimit => StoredSetting::Int(signed(m.max_current)),
            ConfigKey::MaxRunDuration => StoredSetting::Int(signed(m.max_run_duration_s)),
            ConfigKey::WiFiSetup => StoredSetting::Credentials {
                ssid: self.credentials.ssid.clone(),
                password: self.credentials.password.clone(),
            },
        }
    }

    /// Snapshot for the `config` topic
    pub fn report(&self) -> ConfigReport<'_> {
        let m = &self.motion;
        let r = &self.remote;
        ConfigReport {
            allow_remote_control: r.allow_remote_control,
            allow_remote_bleep: r.allow_remote_bleep,
            min_lux_report_delta: r.min_lux_report_delta,
            lux_interval_min: r.lux_interval_min,
            temp_interval_min: r.temp_interval_min,
            state_interval_min: r.state_interval_min,
            debounce_switches_ms: m.debounce_switches_ms,
            debounce_rotation_ms: m.debounce_rotation_ms,
            rotation_limits: m.rotation_limits,
            closed_rotation_offset: m.closed_offset_raw,
            open_duration_s: m.open_duration_s,
            max_open_rotations: m.max_open_rotations,
            max_current_limit: m.max_current,
            max_run_duration_s: m.max_run_duration_s,
            ssid: self.credentials.ssid.as_str(),
        }
    }

    fn set_int(&mut self, key: ConfigKey, value: i32) -> Result<(), ConfigError> {
        let m = &mut self.motion;
        let r = &mut self.remote;
        match key {
            ConfigKey::MinLuxReportDelta => r.min_lux_report_delta = unsigned(value)?,
            ConfigKey::LuxInterval => r.lux_interval_min = unsigned(value)?,
            ConfigKey::TempInterval => r.temp_interval_min = unsigned(value)?,
            ConfigKey::StateInterval => r.state_interval_min = unsigned(value)?,
            ConfigKey::DebounceDurSwitches => m.debounce_switches_ms = unsigned(value)?,
            ConfigKey::DebounceDurMotor => m.debounce_rotation_ms = unsigned(value)?,
            ConfigKey::ClosedRotationOffset => m.closed_offset_raw = value,
            ConfigKey::OpenDuration => m.open_duration_s = unsigned(value)?,
            ConfigKey::MaxOpenRotations => m.max_open_rotations = unsigned(value)?,
            ConfigKey::MaxCurrentLimit => m.max_current = unsigned(value)?,
            ConfigKey::MaxRunDuration => m.max_run_duration_s = unsigned(value)?,
            _ => return Err(ConfigError::TypeMismatch),
        }
        Ok(())
    }

    fn set_bool(&mut self, key: ConfigKey, value: bool) -> Result<(), ConfigError> {
        match key {
            ConfigKey::AllowRemoteControl => self.remote.allow_remote_control = value,
            ConfigKey::AllowRemoteBleep => self.remote.allow_remote_bleep = value,
            ConfigKey::RotationLimits => self.motion.rotation_limits = value,
            _ => return Err(ConfigError::TypeMismatch),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamella_protocol::AppCommand;

    fn apply_cmd(config: &mut Configuration, payload: &str) -> Result<ConfigKey, ConfigError> {
        match AppCommand::parse(payload) {
            Ok(AppCommand::Set { key, value }) => config.apply(key, &value).map(|_| key),
            _ => panic!("not a set command: {}", payload),
        }
    }

    #[test]
    fn test_apply_each_kind() {
        let mut config = Configuration::default();
        apply_cmd(&mut config, "MaxOpenRotations:25").unwrap();
        apply_cmd(&mut config, "ClosedRotationOffset:-1").unwrap();
        apply_cmd(&mut config, "AllowRemoteControl:false").unwrap();
        apply_cmd(&mut config, "WiFiSetup:attic/hunter2").unwrap();

        assert_eq!(config.motion.max_open_rotations, 25);
        assert_eq!(config.motion.closed_offset_raw, -1);
        assert!(!config.remote.allow_remote_control);
        assert_eq!(config.credentials.ssid.as_str(), "attic");
        assert_eq!(config.credentials.password.as_str(), "hunter2");

        apply_cmd(&mut config, "WiFiSetup:default").unwrap();
        assert!(config.credentials.is_default());
    }

    #[test]
    fn test_type_mismatch() {
        let mut config = Configuration::default();
        assert_eq!(
            config.apply(ConfigKey::RotationLimits, &SettingValue::Int(1)),
            Err(ConfigError::TypeMismatch)
        );
        assert_eq!(
            config.apply(ConfigKey::OpenDuration, &SettingValue::Bool(true)),
            Err(ConfigError::TypeMismatch)
        );
        assert_eq!(
            config.apply(ConfigKey::OpenDuration, &SettingValue::Int(-5)),
            Err(ConfigError::OutOfRange)
        );
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn test_stored_restores_every_key() {
        let mut source = Configuration::default();
        source.motion.max_current = 700;
        source.motion.closed_offset_raw = 3;
        source.remote.allow_remote_bleep = false;
        source.credentials = Credentials::new("loft", "pw").unwrap();

        let mut target = Configuration::default();
        for key in ConfigKey::ALL {
            target.restore(key, &source.stored(key)).unwrap();
        }
        assert_eq!(target, source);
    }

    #[test]
    fn test_report_hides_password() {
        let config = Configuration::default();
        let report = config.report();
        assert_eq!(report.ssid, config.credentials.ssid.as_str());
        assert_eq!(report.max_run_duration_s, 60);
        assert!(report.rotation_limits);
    }
}
