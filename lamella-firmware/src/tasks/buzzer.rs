//! Buzzer task
//!
//! Plays queued patterns one after another.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::Delay;

use lamella_drivers::buzzer::Buzzer;
use lamella_protocol::BleepPattern;

use crate::channels::BLEEP;

/// Buzzer task - plays patterns from the bleep queue
#[embassy_executor::task]
pub async fn buzzer_task(mut buzzer: Buzzer<Output<'static>>) {
    info!("Buzzer task started");

    let mut delay = Delay;

    loop {
        let pattern = BLEEP.receive().await;
        debug!("Playing {:?}", pattern);
        if buzzer.play(&pattern, &mut delay).await.is_err() {
            warn!("Buzzer output failed");
        }
    }
}

/// Queue a pattern, dropping it if the buzzer is backed up
pub fn queue_bleep(pattern: BleepPattern) {
    if BLEEP.try_send(pattern).is_err() {
        warn!("Bleep queue full, dropping pattern");
    }
}
