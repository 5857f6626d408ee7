//! Supervisor task
//!
//! Reacts to control iterations (status reports, position saves, alarms),
//! tracks link health and performs restarts once the motor is idle.

use defmt::*;
use embassy_futures::select::{select4, Either4};
use embassy_rp::watchdog::Watchdog;
use embassy_time::{Duration, Ticker, Timer};

use lamella_core::control::Iteration;
use lamella_core::safety::{LinkAction, LinkSupervisor, RestartReason};
use lamella_protocol::BleepPattern;

use super::buzzer::queue_bleep;
use super::report;
use crate::channels::{
    PersistRequest, CONTROL, CONTROL_EVENTS, HEARTBEAT_RECEIVED, PERSIST, RESTART_REQUESTED,
};

/// Link supervision tick
const SUPERVISOR_TICK_MS: u32 = 1000;

/// Extra time after the restart pattern before resetting
const RESTART_GRACE_MS: u64 = 500;

fn restart_pattern(reason: RestartReason) -> BleepPattern {
    match reason {
        RestartReason::LinkLost => BleepPattern::from_segments(2, &[2, 1, 0]),
        RestartReason::Requested => BleepPattern::from_segments(2, &[1, 1, 0]),
    }
}

/// Supervisor task - control events, link health and restarts
#[embassy_executor::task]
pub async fn supervisor_task(mut watchdog: Watchdog) {
    info!("Supervisor task started");

    let mut link = LinkSupervisor::new();
    let mut ticker = Ticker::every(Duration::from_millis(SUPERVISOR_TICK_MS.into()));
    let mut deferred = false;

    queue_bleep(BleepPattern::from_segments(1, &[3]));
    report::publish_status();

    loop {
        match select4(
            CONTROL_EVENTS.receive(),
            HEARTBEAT_RECEIVED.wait(),
            RESTART_REQUESTED.wait(),
            ticker.next(),
        )
        .await
        {
            Either4::First(out) => handle_iteration(out).await,
            Either4::Second(()) => link.heartbeat_received(),
            Either4::Third(()) => {
                info!("Restart requested");
                link.request_restart();
            }
            Either4::Fourth(()) => {
                let healthy = link.is_link_healthy();
                link.update_time(SUPERVISOR_TICK_MS);
                if healthy && !link.is_link_healthy() {
                    warn!("Link lost after {} missed heartbeats", link.missed_heartbeats());
                }
            }
        }

        match link.decide(CONTROL.status().is_running()) {
            LinkAction::Healthy => deferred = false,
            LinkAction::DeferRestart(reason) => {
                if !deferred {
                    warn!("Restart ({:?}) deferred until the motor stops", reason);
                    deferred = true;
                }
            }
            // a start can slip in after the status read, the lock settles it
            LinkAction::Restart(reason) if CONTROL.lock_for_restart() => {
                restart(&mut watchdog, reason).await
            }
            LinkAction::Restart(reason) => {
                if !deferred {
                    warn!("Restart ({:?}) deferred, a start is under way", reason);
                    deferred = true;
                }
            }
        }
    }
}

async fn handle_iteration(out: Iteration) {
    if out.status_changed {
        report::publish_status();
    }
    if let Some(position) = out.persist_position {
        PERSIST.send(PersistRequest::Position(position)).await;
    }
    if let Some(alarm) = out.alarm {
        queue_bleep(alarm.pattern());
    }
    if out.output_fault {
        error!("Motor output write failed");
    }
    if out.start_refused {
        info!("Start refused, restart pending");
    }
}

async fn restart(watchdog: &mut Watchdog, reason: RestartReason) {
    warn!("Restarting: {:?}", reason);

    let pattern = restart_pattern(reason);
    let playing_ms = u64::from(pattern.total_ms());
    queue_bleep(pattern);

    // starts are locked out from here on; lets the pattern and any queued
    // flash write finish
    Timer::after_millis(playing_ms + RESTART_GRACE_MS).await;
    watchdog.trigger_reset();
}
