//! Control loop and edge tasks
//!
//! The edge tasks stand in for pin interrupts: they only timestamp edges
//! into the control context. The control task is the only owner of the
//! H-bridge.

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::pwm::PwmOutput;
use embassy_time::{Delay, Instant, Timer};

use lamella_core::control::{Iteration, MotorController};
use lamella_drivers::motor::HBridge;
use lamella_hal_rp2040::adc::AdcCurrentSense;
use lamella_hal_rp2040::inputs::{BoardSwitches, ButtonInput};

use crate::channels::{CONTROL, CONTROL_EVENTS};

/// Pause between control iterations
pub const CONTROL_PERIOD_MS: u64 = 1;

/// The controller as wired on the board
pub type BoardController = MotorController<
    BoardSwitches<'static>,
    AdcCurrentSense<'static>,
    HBridge<Output<'static>, PwmOutput<'static>>,
>;

/// Control task - runs the motor state machine every millisecond
#[embassy_executor::task]
pub async fn control_task(mut controller: BoardController) {
    info!("Control task started");

    if let Err(e) = controller.init(&CONTROL) {
        error!("Failed to release motor outputs: {:?}", e);
    }
    info!("Initial motor status: {:?}", controller.status());

    let mut delay = Delay;
    let mut backlog = Iteration::default();

    loop {
        let now_ms = Instant::now().as_millis();
        let out = controller.iterate(&CONTROL, &mut delay, now_ms).await;

        if let Some(direction) = out.started {
            info!("Motor started: {:?}", direction);
        }
        if let Some(reason) = out.stopped {
            if reason.is_safety() {
                warn!("Motor stopped by safety check: {:?}", reason);
            } else {
                info!("Motor stopped: {:?}", reason);
            }
        }

        // unsent effects are retried on the next pass, never dropped
        backlog.merge(out);
        if !backlog.is_empty() {
            match CONTROL_EVENTS.try_send(backlog) {
                Ok(()) => backlog = Iteration::default(),
                Err(_) => debug!("Control event queue full, holding {:?}", backlog),
            }
        }

        Timer::after_millis(CONTROL_PERIOD_MS).await;
    }
}

/// Button task - one instance per button
#[embassy_executor::task(pool_size = 2)]
pub async fn button_task(mut button: ButtonInput<'static>) {
    info!("Button task started: {:?}", button.direction());

    loop {
        button.wait_for_press().await;
        if CONTROL.button_edge(button.direction(), Instant::now().as_millis()) {
            debug!("Button press: {:?}", button.direction());
        }
    }
}

/// Rotation task - counts motor axis pulses
#[embassy_executor::task]
pub async fn rotation_task(mut pin: Input<'static>) {
    info!("Rotation task started");

    loop {
        pin.wait_for_falling_edge().await;
        if CONTROL.rotation_edge(Instant::now().as_millis()) {
            trace!("Rotation pulse");
        }
    }
}
