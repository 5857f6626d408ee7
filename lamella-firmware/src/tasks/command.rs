//! Command task
//!
//! Owns the configuration through the [`CommandTranslator`]. Handles every
//! inbound line and the periodic app state report.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Timer};

use lamella_core::command::{CommandTranslator, Response};
use lamella_core::config::Configuration;
use lamella_protocol::{ConfigKey, Message};

use super::buzzer::queue_bleep;
use super::report;
use crate::channels::{
    PersistRequest, CONTROL, HEARTBEAT_RECEIVED, INBOUND, PERSIST, RESTART_REQUESTED,
};

/// Command task - translates inbound lines into control requests
#[embassy_executor::task]
pub async fn command_task(mut translator: CommandTranslator, start_reason: &'static str) {
    info!("Command task started");

    report::publish_config(translator.config());
    let mut next_report = report_deadline(translator.config());

    loop {
        let periodic = async move {
            match next_report {
                Some(at) => Timer::at(at).await,
                None => core::future::pending::<()>().await,
            }
        };

        match select(INBOUND.receive(), periodic).await {
            Either::First(line) => {
                if handle_line(&mut translator, &line, start_reason).await
                    == Some(ConfigKey::StateInterval)
                {
                    next_report = report_deadline(translator.config());
                }
            }
            Either::Second(()) => {
                report::publish_app_state(translator.config(), start_reason);
                next_report = report_deadline(translator.config());
            }
        }
    }
}

fn report_deadline(config: &Configuration) -> Option<Instant> {
    match config.remote.state_interval_min {
        0 => None,
        minutes => Some(Instant::now() + Duration::from_secs(u64::from(minutes) * 60)),
    }
}

/// Handle one line, returning the configuration key it changed
async fn handle_line(
    translator: &mut CommandTranslator,
    line: &str,
    start_reason: &str,
) -> Option<ConfigKey> {
    let msg = match Message::parse(line) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Unparseable link line: {:?}", e);
            return None;
        }
    };
    if !msg.topic.is_inbound() {
        trace!("Ignoring echo on {}", msg.topic.as_str());
        return None;
    }

    match translator.handle(&msg, &CONTROL) {
        Response::Ignored => trace!("Ignoring {}", msg.topic.as_str()),
        Response::Accepted => info!("Accepted {} '{}'", msg.topic.as_str(), msg.payload),
        Response::Rejected(rejection) => {
            warn!(
                "Rejected {} '{}': {:?}",
                msg.topic.as_str(),
                msg.payload,
                rejection
            );
            if let Some(pattern) = rejection.pattern() {
                queue_bleep(pattern);
            }
        }
        Response::ReportState => {
            report::publish_status();
            report::publish_app_state(translator.config(), start_reason);
        }
        Response::ReportConfig => report::publish_config(translator.config()),
        Response::ConfigChanged(key) => {
            info!("Setting {} changed", key.as_str());
            PERSIST
                .send(PersistRequest::Setting(key, translator.config().clone()))
                .await;
            report::publish_config(translator.config());
            return Some(key);
        }
        Response::Restart => RESTART_REQUESTED.signal(()),
        Response::Bleep(pattern) => queue_bleep(pattern),
        Response::Heartbeat => {
            trace!("Heartbeat received");
            HEARTBEAT_RECEIVED.signal(());
        }
    }
    None
}
