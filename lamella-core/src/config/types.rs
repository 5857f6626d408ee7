//! Configuration type definitions
//!
//! These types represent the controller configuration. Each field is
//! stored in flash under its own key as postcard-serialized data.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum SSID length
pub const MAX_SSID_LEN: usize = lamella_protocol::appcmd::MAX_SSID_LEN;

/// Maximum WiFi password length
pub const MAX_PASSWORD_LEN: usize = lamella_protocol::appcmd::MAX_PASSWORD_LEN;

/// Built-in SSID, overridable at build time
pub const DEFAULT_SSID: &str = match option_env!("LAMELLA_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "<Default SSID>",
};

/// Built-in WiFi password, overridable at build time
pub const DEFAULT_PASSWORD: &str = match option_env!("LAMELLA_WIFI_PASSWORD") {
    Some(password) => password,
    None => "<Default PWD>",
};

/// Offset value meaning "ignore the rotation count when closing"
pub const CLOSED_OFFSET_IGNORE: i32 = 999;

/// How the closed-rotation offset is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClosedOffset {
    /// Rely on the closed limit switch and the run timers
    Ignore,
    /// Stop as soon as the count reaches zero
    Immediate,
    /// Keep running for this many rotations past zero
    Extra(u32),
}

impl ClosedOffset {
    /// Decode the stored signed representation
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            r if r < 0 || r == CLOSED_OFFSET_IGNORE => ClosedOffset::Ignore,
            0 => ClosedOffset::Immediate,
            r => ClosedOffset::Extra(r.unsigned_abs()),
        }
    }
}

/// Motion settings, read by the control task and interrupt context
///
/// Kept `Copy` so it can live inside the shared control context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionConfig {
    /// Button debounce window (ms)
    pub debounce_switches_ms: u32,
    /// Rotation sensor debounce window (ms)
    pub debounce_rotation_ms: u32,
    /// Derive open/closed position from counted rotations
    pub rotation_limits: bool,
    /// Remote open run cap (s, 0 = off)
    pub open_duration_s: u32,
    /// Overall run cap (s, 0 = off)
    pub max_run_duration_s: u32,
    /// Rotations from closed to fully open (0 = not counting)
    pub max_open_rotations: u32,
    /// Closed-rotation offset, see [`ClosedOffset`]
    pub closed_offset_raw: i32,
    /// Current sense threshold in raw units (0 = off)
    pub max_current: u32,
}

impl MotionConfig {
    /// Factory defaults
    pub const fn new() -> Self {
        Self {
            debounce_switches_ms: 150,
            debounce_rotation_ms: 500,
            rotation_limits: true,
            open_duration_s: 20,
            max_run_duration_s: 60,
            max_open_rotations: 20,
            closed_offset_raw: 0,
            max_current: 0,
        }
    }

    /// Interpreted closed offset
    pub fn closed_offset(&self) -> ClosedOffset {
        ClosedOffset::from_raw(self.closed_offset_raw)
    }

    /// Whether rotation pulses are counted at all
    pub fn counts_rotations(&self) -> bool {
        self.max_open_rotations > 0
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Remote access and reporting settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RemoteConfig {
    /// Accept `action` messages
    pub allow_remote_control: bool,
    /// Accept `notify` bleeps
    pub allow_remote_bleep: bool,
    /// App state report interval (minutes, 0 = off)
    pub state_interval_min: u32,
    /// Light report interval (minutes, 0 = off)
    pub lux_interval_min: u32,
    /// Temperature report interval (minutes, 0 = off)
    pub temp_interval_min: u32,
    /// Minimum light change worth reporting
    pub min_lux_report_delta: u32,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            allow_remote_control: true,
            allow_remote_bleep: true,
            state_interval_min: 10,
            lux_interval_min: 0,
            temp_interval_min: 0,
            min_lux_report_delta: 10,
        }
    }
}

/// WiFi credentials
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Credentials {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_PASSWORD_LEN>,
}

impl Credentials {
    /// Build from string slices, `None` if either is too long
    pub fn new(ssid: &str, password: &str) -> Option<Self> {
        let mut creds = Self {
            ssid: String::new(),
            password: String::new(),
        };
        creds.ssid.push_str(ssid).ok()?;
        creds.password.push_str(password).ok()?;
        Some(creds)
    }

    /// Whether these are the built-in credentials
    pub fn is_default(&self) -> bool {
        self.ssid.as_str() == DEFAULT_SSID && self.password.as_str() == DEFAULT_PASSWORD
    }
}

impl Default for Credentials {
    fn default() -> Self {
        let mut creds = Self {
            ssid: String::new(),
            password: String::new(),
        };
        // Build-time values longer than the buffers are truncated to empty
        let _ = creds.ssid.push_str(DEFAULT_SSID);
        let _ = creds.password.push_str(DEFAULT_PASSWORD);
        creds
    }
}

/// Complete controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Configuration {
    pub motion: MotionConfig,
    pub remote: RemoteConfig,
    pub credentials: Credentials,
}
