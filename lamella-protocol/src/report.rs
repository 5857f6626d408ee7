//! Outbound JSON payloads
//!
//! Reports are small flat objects, written straight into a
//! `heapless::String` through `core::fmt::Write`.

use core::fmt::{self, Write};

use heapless::String;

use crate::appcmd::ConfigKey;
use crate::error::CommandError;

/// Blinds state report (`state` topic)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    /// Closed limit switch asserted
    pub closed: bool,
    /// Open percentage, `None` when not derivable
    pub percentage: Option<u32>,
}

impl StatusReport {
    /// Write the JSON object
    pub fn write_json<W: Write>(&self, out: &mut W) -> fmt::Result {
        let state = if self.closed { "closed" } else { "open" };
        write!(out, "{{\"state\":\"{}\",\"percentage\":", state)?;
        match self.percentage {
            Some(pct) => write!(out, "{}", pct)?,
            None => out.write_str("\"unknown\"")?,
        }
        out.write_char('}')
    }

    /// Render into a fixed-capacity string
    pub fn to_json<const N: usize>(&self) -> Result<String<N>, CommandError> {
        render(|out| self.write_json(out))
    }
}

/// Configuration snapshot (`config` topic)
///
/// The WiFi password is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigReport<'a> {
    pub allow_remote_control: bool,
    pub allow_remote_bleep: bool,
    pub min_lux_report_delta: u32,
    pub lux_interval_min: u32,
    pub temp_interval_min: u32,
    pub state_interval_min: u32,
    pub debounce_switches_ms: u32,
    pub debounce_rotation_ms: u32,
    pub rotation_limits: bool,
    pub closed_rotation_offset: i32,
    pub open_duration_s: u32,
    pub max_open_rotations: u32,
    pub max_current_limit: u32,
    pub max_run_duration_s: u32,
    pub ssid: &'a str,
}

impl ConfigReport<'_> {
    /// Write the JSON object, keys named after their `appcmd` keys
    pub fn write_json<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_char('{')?;
        let mut first = true;
        for key in ConfigKey::ALL {
            if !first {
                out.write_char(',')?;
            }
            first = false;

            if key == ConfigKey::WiFiSetup {
                out.write_str("\"SSID\":")?;
                write_json_str(out, self.ssid)?;
                continue;
            }

            write!(out, "\"{}\":", key.as_str())?;
            match key {
                ConfigKey::AllowRemoteControl => write_bool(out, self.allow_remote_control)?,
                ConfigKey::AllowRemoteBleep => write_bool(out, self.allow_remote_bleep)?,
                ConfigKey::RotationLimits => write_bool(out, self.rotation_limits)?,
                ConfigKey::MinLuxReportDelta => write!(out, "{}", self.min_lux_report_delta)?,
                ConfigKey::LuxInterval => write!(out, "{}", self.lux_interval_min)?,
                ConfigKey::TempInterval => write!(out, "{}", self.temp_interval_min)?,
                ConfigKey::StateInterval => write!(out, "{}", self.state_interval_min)?,
                ConfigKey::DebounceDurSwitches => write!(out, "{}", self.debounce_switches_ms)?,
                ConfigKey::DebounceDurMotor => write!(out, "{}", self.debounce_rotation_ms)?,
                ConfigKey::ClosedRotationOffset => {
                    write!(out, "{}", self.closed_rotation_offset)?
                }
                ConfigKey::OpenDuration => write!(out, "{}", self.open_duration_s)?,
                ConfigKey::MaxOpenRotations => write!(out, "{}", self.max_open_rotations)?,
                ConfigKey::MaxCurrentLimit => write!(out, "{}", self.max_current_limit)?,
                ConfigKey::MaxRunDuration => write!(out, "{}", self.max_run_duration_s)?,
                ConfigKey::WiFiSetup => {}
            }
        }
        out.write_char('}')
    }

    /// Render into a fixed-capacity string
    pub fn to_json<const N: usize>(&self) -> Result<String<N>, CommandError> {
        render(|out| self.write_json(out))
    }
}

/// Telemetry (`app_state` topic)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppStateReport<'a> {
    pub version: &'a str,
    pub device: &'a str,
    pub uptime_s: u64,
    pub start_reason: &'a str,
    pub ssid: &'a str,
    pub motor_running: bool,
}

impl AppStateReport<'_> {
    /// Write the JSON object
    pub fn write_json<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_str("{\"Version\":")?;
        write_json_str(out, self.version)?;
        out.write_str(",\"Device\":")?;
        write_json_str(out, self.device)?;
        out.write_str(",\"SSID\":")?;
        write_json_str(out, self.ssid)?;

        let s = self.uptime_s;
        write!(
            out,
            ",\"Uptime\":\"{}d{}:{:02}:{:02}\"",
            s / 86_400,
            (s / 3600) % 24,
            (s / 60) % 60,
            s % 60
        )?;

        out.write_str(",\"Start Reason\":")?;
        write_json_str(out, self.start_reason)?;
        out.write_str(",\"Motor Running\":")?;
        write_bool(out, self.motor_running)?;
        out.write_char('}')
    }

    /// Render into a fixed-capacity string
    pub fn to_json<const N: usize>(&self) -> Result<String<N>, CommandError> {
        render(|out| self.write_json(out))
    }
}

fn render<const N: usize>(
    f: impl FnOnce(&mut String<N>) -> fmt::Result,
) -> Result<String<N>, CommandError> {
    let mut out = String::new();
    f(&mut out).map_err(|_| CommandError::LineTooLong)?;
    Ok(out)
}

fn write_bool<W: Write>(out: &mut W, value: bool) -> fmt::Result {
    out.write_str(if value { "true" } else { "false" })
}

/// Write a quoted JSON string with the mandatory escapes
fn write_json_str<W: Write>(out: &mut W, value: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in value.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}
