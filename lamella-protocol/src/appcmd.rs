//! Application commands (`appcmd` topic)
//!
//! Besides the three plain keywords, every configuration field can be set
//! with `<ConfigKey>:<value>`. The value is parsed according to the key's
//! [`ValueKind`]; a malformed value rejects the whole command.

use crate::error::CommandError;

/// Longest accepted SSID (bytes)
pub const MAX_SSID_LEN: usize = 32;

/// Longest accepted WiFi password (bytes)
pub const MAX_PASSWORD_LEN: usize = 64;

/// Configuration keys addressable over `appcmd`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigKey {
    /// Minutes between app state reports (0 = off)
    StateInterval,
    /// Minutes between light level reports (0 = off)
    LuxInterval,
    /// Minutes between temperature reports (0 = off)
    TempInterval,
    /// Seconds the motor may run when opening under remote control
    OpenDuration,
    /// Seconds the motor may run at all
    MaxRunDuration,
    /// Rotations from closed to fully open
    MaxOpenRotations,
    /// Derive the open position from counted rotations
    RotationLimits,
    /// Extra rotations after reaching zero when closing
    ClosedRotationOffset,
    /// Button/limit debounce window in ms
    DebounceDurSwitches,
    /// Rotation sensor debounce window in ms
    DebounceDurMotor,
    /// Minimum light change worth reporting
    MinLuxReportDelta,
    /// Current sense threshold (raw ADC units, 0 = off)
    MaxCurrentLimit,
    /// Accept `action` messages
    AllowRemoteControl,
    /// Accept `notify` bleeps
    AllowRemoteBleep,
    /// WiFi credentials (`SSID/password` or `default`)
    WiFiSetup,
}

/// Shape of the value a key expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValueKind {
    /// Non-negative integer
    Unsigned,
    /// Integer, negative allowed
    Signed,
    /// `true` / `false`
    Bool,
    /// `SSID/password` or `default`
    Credentials,
}

impl ConfigKey {
    /// All keys, in configuration report order
    pub const ALL: [ConfigKey; 15] = [
        ConfigKey::AllowRemoteControl,
        ConfigKey::AllowRemoteBleep,
        ConfigKey::MinLuxReportDelta,
        ConfigKey::LuxInterval,
        ConfigKey::TempInterval,
        ConfigKey::StateInterval,
        ConfigKey::DebounceDurSwitches,
        ConfigKey::DebounceDurMotor,
        ConfigKey::RotationLimits,
        ConfigKey::ClosedRotationOffset,
        ConfigKey::OpenDuration,
        ConfigKey::MaxOpenRotations,
        ConfigKey::MaxCurrentLimit,
        ConfigKey::MaxRunDuration,
        ConfigKey::WiFiSetup,
    ];

    /// Wire name of the key
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::StateInterval => "StateInterval",
            ConfigKey::LuxInterval => "LuxInterval",
            ConfigKey::TempInterval => "TempInterval",
            ConfigKey::OpenDuration => "OpenDuration",
            ConfigKey::MaxRunDuration => "MaxRunDuration",
            ConfigKey::MaxOpenRotations => "MaxOpenRotations",
            ConfigKey::RotationLimits => "RotationLimits",
            ConfigKey::ClosedRotationOffset => "ClosedRotationOffset",
            ConfigKey::DebounceDurSwitches => "DebounceDurSwitches",
            ConfigKey::DebounceDurMotor => "DebounceDurMotor",
            ConfigKey::MinLuxReportDelta => "MinLuxReportDelta",
            ConfigKey::MaxCurrentLimit => "MaxCurrentLimit",
            ConfigKey::AllowRemoteControl => "AllowRemoteControl",
            ConfigKey::AllowRemoteBleep => "AllowRemoteBleep",
            ConfigKey::WiFiSetup => "WiFiSetup",
        }
    }

    /// Look a key up by wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    /// Value shape expected by this key
    pub fn kind(self) -> ValueKind {
        match self {
            ConfigKey::RotationLimits
            | ConfigKey::AllowRemoteControl
            | ConfigKey::AllowRemoteBleep => ValueKind::Bool,
            ConfigKey::ClosedRotationOffset => ValueKind::Signed,
            ConfigKey::WiFiSetup => ValueKind::Credentials,
            _ => ValueKind::Unsigned,
        }
    }
}

/// A parsed configuration value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingValue<'a> {
    Int(i32),
    Bool(bool),
    Credentials { ssid: &'a str, password: &'a str },
    /// Reset credentials to the built-in defaults
    DefaultCredentials,
}

impl<'a> SettingValue<'a> {
    /// Parse `raw` as a value of the given kind
    pub fn parse(kind: ValueKind, raw: &'a str) -> Result<Self, CommandError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CommandError::MissingValue);
        }

        match kind {
            ValueKind::Unsigned => {
                let value = raw.parse::<i32>().map_err(|_| CommandError::InvalidNumber)?;
                if value < 0 {
                    return Err(CommandError::OutOfRange);
                }
                Ok(SettingValue::Int(value))
            }
            ValueKind::Signed => raw
                .parse::<i32>()
                .map(SettingValue::Int)
                .map_err(|_| CommandError::InvalidNumber),
            ValueKind::Bool => match raw {
                "true" => Ok(SettingValue::Bool(true)),
                "false" => Ok(SettingValue::Bool(false)),
                _ => Err(CommandError::InvalidBool),
            },
            ValueKind::Credentials => {
                if raw == "default" {
                    return Ok(SettingValue::DefaultCredentials);
                }
                let (ssid, password) = raw
                    .split_once('/')
                    .ok_or(CommandError::InvalidCredentials)?;
                if ssid.is_empty() || ssid.len() > MAX_SSID_LEN || password.len() > MAX_PASSWORD_LEN
                {
                    return Err(CommandError::InvalidCredentials);
                }
                Ok(SettingValue::Credentials { ssid, password })
            }
        }
    }
}

/// A parsed application command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppCommand<'a> {
    /// Restart the controller
    Restart,
    /// Report state and telemetry
    GetState,
    /// Report the configuration
    GetConfig,
    /// Change one configuration field
    Set {
        key: ConfigKey,
        value: SettingValue<'a>,
    },
}

impl<'a> AppCommand<'a> {
    /// Parse an `appcmd` payload
    pub fn parse(payload: &'a str) -> Result<Self, CommandError> {
        let payload = payload.trim();
        match payload {
            "" => return Err(CommandError::Empty),
            "restart" => return Ok(AppCommand::Restart),
            "getstate" => return Ok(AppCommand::GetState),
            "getconfig" => return Ok(AppCommand::GetConfig),
            _ => {}
        }

        let (name, raw) = payload.split_once(':').ok_or_else(|| {
            if ConfigKey::from_name(payload).is_some() {
                CommandError::MissingValue
            } else {
                CommandError::UnknownKeyword
            }
        })?;
        let key = ConfigKey::from_name(name.trim()).ok_or(CommandError::UnknownKey)?;
        let value = SettingValue::parse(key.kind(), raw)?;

        Ok(AppCommand::Set { key, value })
    }
}
