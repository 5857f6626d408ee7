//! Lamella - Motorised Blinds Controller Firmware
//!
//! Drives a DC wiper motor through an IBT-2 H-bridge to open and close a
//! blind. Commands come from two manual buttons and from a network bridge
//! on UART0; limit switches and a rotation sensor bound the travel.
//!
//! Named after the thin slats ("lamellae") of a venetian blind.
//!
//! # Pin map (Raspberry Pi Pico)
//!
//! | GPIO | Use                               |
//! |------|-----------------------------------|
//! | 0/1  | UART0 TX/RX to the network bridge |
//! | 2    | R_EN                              |
//! | 3    | L_EN                              |
//! | 4    | RPWM (opens)                      |
//! | 5    | LPWM (closes)                     |
//! | 6    | Active buzzer                     |
//! | 10   | Open button                       |
//! | 11   | Close button                      |
//! | 12   | Open limit switch                 |
//! | 13   | Closed limit switch               |
//! | 14   | Rotation sensor                   |
//! | 26   | Current sense (R_IS + L_IS)       |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use embassy_rp::watchdog::{ResetReason, Watchdog};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use lamella_core::command::CommandTranslator;
use lamella_core::control::MotorController;
use lamella_core::traits::Direction;
use lamella_drivers::buzzer::Buzzer;
use lamella_drivers::motor::HBridge;
use lamella_drivers::storage::SettingsStore;
use lamella_hal_rp2040::adc::AdcCurrentSense;
use lamella_hal_rp2040::flash::Rp2040FlashStorage;
use lamella_hal_rp2040::inputs::{BoardSwitches, ButtonInput};
use lamella_hal_rp2040::pwm::motor_pwm;

mod channels;
mod tasks;

use crate::channels::{BUTTON_LEVELS, CONTROL};

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Runs the control loop and the edge tasks above thread mode
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Lamella firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let watchdog = Watchdog::new(p.WATCHDOG);
    let start_reason = match watchdog.reset_reason() {
        Some(ResetReason::Forced) => "Software reset",
        Some(ResetReason::TimedOut) => "Watchdog",
        None => "Power-on",
    };
    info!("Start reason: {}", start_reason);

    // Settings and last known position
    let mut store = SettingsStore::new(Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0));
    let (config, summary) = store.load().await;
    info!(
        "Settings loaded: {} from flash, {} default, {} invalid",
        summary.restored, summary.missing, summary.invalid
    );
    if summary.invalid > 0 {
        warn!("{} settings were unreadable and use defaults", summary.invalid);
    }
    let position = store.load_position().await;
    info!("Last position: {}", position);
    CONTROL.set_motion_config(config.motion);

    // UART link to the network bridge, 115200 baud default
    let tx_buf = TX_BUF.init([0u8; 1024]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        tx_buf,
        rx_buf,
        UartConfig::default(),
    );
    let (tx, rx) = uart.split();
    info!("UART initialized for the network bridge");

    // Motor output stage
    let Some((rpwm, lpwm)) = motor_pwm(p.PWM_SLICE2, p.PIN_4, p.PIN_5) else {
        defmt::panic!("PWM slice 2 did not yield both channels");
    };
    let bridge = HBridge::new(
        Output::new(p.PIN_2, Level::Low),
        Output::new(p.PIN_3, Level::Low),
        rpwm,
        lpwm,
    );
    let current = AdcCurrentSense::new(p.ADC, p.PIN_26);
    let switches = BoardSwitches::new(
        Input::new(p.PIN_12, Pull::Up),
        Input::new(p.PIN_13, Pull::Up),
        &BUTTON_LEVELS,
    );
    let controller = MotorController::new(switches, current, bridge, position);
    info!("Motor controller initialized");

    let open_button = ButtonInput::new(
        Input::new(p.PIN_10, Pull::Up),
        Direction::Open,
        &BUTTON_LEVELS,
    );
    let close_button = ButtonInput::new(
        Input::new(p.PIN_11, Pull::Up),
        Direction::Close,
        &BUTTON_LEVELS,
    );
    let rotation = Input::new(p.PIN_14, Pull::Up);
    let buzzer = Buzzer::new(Output::new(p.PIN_6, Level::Low));

    // High-priority executor: control loop and edge tasks
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high.spawn(tasks::control_task(controller).unwrap());
    high.spawn(tasks::button_task(open_button).unwrap());
    high.spawn(tasks::button_task(close_button).unwrap());
    high.spawn(tasks::rotation_task(rotation).unwrap());

    // Thread mode: link, commands and housekeeping
    spawner.spawn(tasks::link_rx_task(rx).unwrap());
    spawner.spawn(tasks::link_tx_task(tx).unwrap());
    spawner.spawn(tasks::command_task(CommandTranslator::new(config), start_reason).unwrap());
    spawner.spawn(tasks::buzzer_task(buzzer).unwrap());
    spawner.spawn(tasks::persistence_task(store).unwrap());
    spawner.spawn(tasks::supervisor_task(watchdog).unwrap());

    info!("All tasks spawned, firmware running");
}
