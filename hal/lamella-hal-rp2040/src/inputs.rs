//! Limit switch and button inputs
//!
//! All switches are wired normally-open to ground with the internal pull-up
//! enabled, so a pressed or reached switch reads low.
//!
//! Button pins are owned by their edge-wait tasks. Each task mirrors the
//! pin level into a [`ButtonLevels`] so the control loop can read it without
//! sharing the pin.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_rp::gpio::Input;
use lamella_core::traits::{Direction, SwitchInputs};

/// Last observed level of each button, indexed by [`Direction::index`]
pub struct ButtonLevels {
    pressed: [AtomicBool; 2],
}

impl ButtonLevels {
    pub const fn new() -> Self {
        Self {
            pressed: [AtomicBool::new(false), AtomicBool::new(false)],
        }
    }

    pub fn set(&self, direction: Direction, pressed: bool) {
        self.pressed[direction.index()].store(pressed, Ordering::Relaxed);
    }

    pub fn get(&self, direction: Direction) -> bool {
        self.pressed[direction.index()].load(Ordering::Relaxed)
    }
}

impl Default for ButtonLevels {
    fn default() -> Self {
        Self::new()
    }
}

/// A button pin plus the level mirror it keeps up to date
pub struct ButtonInput<'d> {
    pin: Input<'d>,
    direction: Direction,
    levels: &'d ButtonLevels,
}

impl<'d> ButtonInput<'d> {
    pub fn new(pin: Input<'d>, direction: Direction, levels: &'d ButtonLevels) -> Self {
        levels.set(direction, pin.is_low());
        Self {
            pin,
            direction,
            levels,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Wait for the next falling edge, tracking releases along the way
    pub async fn wait_for_press(&mut self) {
        loop {
            self.pin.wait_for_any_edge().await;
            let pressed = self.pin.is_low();
            self.levels.set(self.direction, pressed);
            if pressed {
                return;
            }
        }
    }
}

/// Switch inputs as seen by the control loop
pub struct BoardSwitches<'d> {
    limit_open: Input<'d>,
    limit_closed: Input<'d>,
    buttons: &'d ButtonLevels,
}

impl<'d> BoardSwitches<'d> {
    pub fn new(limit_open: Input<'d>, limit_closed: Input<'d>, buttons: &'d ButtonLevels) -> Self {
        Self {
            limit_open,
            limit_closed,
            buttons,
        }
    }
}

impl SwitchInputs for BoardSwitches<'_> {
    fn limit_active(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Open => self.limit_open.is_low(),
            Direction::Close => self.limit_closed.is_low(),
        }
    }

    fn button_pressed(&mut self, direction: Direction) -> bool {
        self.buttons.get(direction)
    }
}
