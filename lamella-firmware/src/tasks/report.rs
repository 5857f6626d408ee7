//! Outbound reports

use defmt::*;
use embassy_time::Instant;

use lamella_core::config::Configuration;
use lamella_protocol::{AppStateReport, Topic};

use super::link::queue_line;
use crate::channels::CONTROL;

/// Largest rendered report
const REPORT_SIZE: usize = 448;

/// Reported device name
pub const DEVICE_NAME: &str = "lamella";

/// Publish the blinds state
pub fn publish_status() {
    let report = CONTROL.status().report(&CONTROL.motion_config());
    match report.to_json::<64>() {
        Ok(json) => queue_line(Topic::State, &json),
        Err(e) => warn!("Status report failed: {:?}", e),
    }
}

/// Publish the configuration snapshot
pub fn publish_config(config: &Configuration) {
    match config.report().to_json::<REPORT_SIZE>() {
        Ok(json) => queue_line(Topic::Config, &json),
        Err(e) => warn!("Config report failed: {:?}", e),
    }
}

/// Publish the telemetry report
pub fn publish_app_state(config: &Configuration, start_reason: &str) {
    let report = AppStateReport {
        version: env!("CARGO_PKG_VERSION"),
        device: DEVICE_NAME,
        uptime_s: Instant::now().as_secs(),
        start_reason,
        ssid: config.credentials.ssid.as_str(),
        motor_running: CONTROL.status().is_running(),
    };
    match report.to_json::<REPORT_SIZE>() {
        Ok(json) => queue_line(Topic::AppState, &json),
        Err(e) => warn!("App state report failed: {:?}", e),
    }
}
