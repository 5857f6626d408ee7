//! Dual half-bridge motor driver (IBT-2 / BTS7960)
//!
//! The board has one enable and one PWM line per half:
//!
//! | Line  | Use                      |
//! |-------|--------------------------|
//! | R_EN  | enable, open half        |
//! | L_EN  | enable, close half       |
//! | RPWM  | duty while opening       |
//! | LPWM  | duty while closing       |
//!
//! Both enables are asserted for either direction; the direction is chosen
//! by which PWM line carries the duty.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use lamella_core::traits::{Direction, MotorError, MotorOutputs, PWM_MAX_DUTY};

/// H-bridge output stage
pub struct HBridge<EN, PWM> {
    enable_open: EN,
    enable_close: EN,
    pwm_open: PWM,
    pwm_close: PWM,
}

impl<EN, PWM> HBridge<EN, PWM>
where
    EN: OutputPin,
    PWM: SetDutyCycle,
{
    /// Create the driver; call [`MotorOutputs::release`] before first use
    pub fn new(enable_open: EN, enable_close: EN, pwm_open: PWM, pwm_close: PWM) -> Self {
        Self {
            enable_open,
            enable_close,
            pwm_open,
            pwm_close,
        }
    }

    fn halves(&mut self, direction: Direction) -> (&mut PWM, &mut PWM) {
        match direction {
            Direction::Open => (&mut self.pwm_open, &mut self.pwm_close),
            Direction::Close => (&mut self.pwm_close, &mut self.pwm_open),
        }
    }
}

impl<EN, PWM> MotorOutputs for HBridge<EN, PWM>
where
    EN: OutputPin,
    PWM: SetDutyCycle,
{
    fn enable(&mut self) -> Result<(), MotorError> {
        self.enable_open.set_high().map_err(|_| MotorError::Output)?;
        self.enable_close.set_high().map_err(|_| MotorError::Output)
    }

    fn set_duty(&mut self, direction: Direction, duty: u8) -> Result<(), MotorError> {
        let (active, idle) = self.halves(direction);
        idle.set_duty_cycle_fully_off().map_err(|_| MotorError::Output)?;
        active
            .set_duty_cycle_fraction(u16::from(duty), u16::from(PWM_MAX_DUTY))
            .map_err(|_| MotorError::Output)
    }

    fn release(&mut self) -> Result<(), MotorError> {
        // every line is written even if an earlier one fails
        let results = [
            self.pwm_open.set_duty_cycle_fully_off().is_ok(),
            self.pwm_close.set_duty_cycle_fully_off().is_ok(),
            self.enable_open.set_low().is_ok(),
            self.enable_close.set_low().is_ok(),
        ];
        if results.iter().all(|ok| *ok) {
            Ok(())
        } else {
            Err(MotorError::Output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use embedded_hal::digital::{self, ErrorKind as PinErrorKind};
    use embedded_hal::pwm::{self, ErrorKind as PwmErrorKind};

    #[derive(Default)]
    struct Pin {
        high: Cell<bool>,
        broken: Cell<bool>,
    }

    impl digital::ErrorType for &Pin {
        type Error = PinErrorKind;
    }

    impl OutputPin for &Pin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            if self.broken.get() {
                return Err(PinErrorKind::Other);
            }
            self.high.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            if self.broken.get() {
                return Err(PinErrorKind::Other);
            }
            self.high.set(true);
            Ok(())
        }
    }

    struct Channel {
        duty: Cell<u16>,
        broken: Cell<bool>,
    }

    impl Default for Channel {
        fn default() -> Self {
            // powered-up garbage
            Self {
                duty: Cell::new(77),
                broken: Cell::new(false),
            }
        }
    }

    impl pwm::ErrorType for &Channel {
        type Error = PwmErrorKind;
    }

    impl SetDutyCycle for &Channel {
        fn max_duty_cycle(&self) -> u16 {
            256
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            if self.broken.get() {
                return Err(PwmErrorKind::Other);
            }
            self.duty.set(duty);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Board {
        ren: Pin,
        len: Pin,
        rpwm: Channel,
        lpwm: Channel,
    }

    impl Board {
        fn bridge(&self) -> HBridge<&Pin, &Channel> {
            HBridge::new(&self.ren, &self.len, &self.rpwm, &self.lpwm)
        }
    }

    #[test]
    fn test_enable_asserts_both_halves() {
        let board = Board::default();
        let mut bridge = board.bridge();
        bridge.enable().unwrap();
        assert!(board.ren.high.get());
        assert!(board.len.high.get());
    }

    #[test]
    fn test_duty_follows_direction() {
        let board = Board::default();
        let mut bridge = board.bridge();

        bridge.set_duty(Direction::Open, PWM_MAX_DUTY).unwrap();
        assert_eq!(board.rpwm.duty.get(), 256);
        assert_eq!(board.lpwm.duty.get(), 0);

        bridge.set_duty(Direction::Close, 50).unwrap();
        assert_eq!(board.rpwm.duty.get(), 0);
        assert_eq!(board.lpwm.duty.get(), 50 * 256 / 255);
    }

    #[test]
    fn test_release_clears_everything() {
        let board = Board::default();
        let mut bridge = board.bridge();
        bridge.enable().unwrap();
        bridge.set_duty(Direction::Open, 200).unwrap();

        bridge.release().unwrap();
        assert!(!board.ren.high.get());
        assert!(!board.len.high.get());
        assert_eq!(board.rpwm.duty.get(), 0);
        assert_eq!(board.lpwm.duty.get(), 0);
    }

    #[test]
    fn test_release_continues_past_failure() {
        let board = Board::default();
        let mut bridge = board.bridge();
        bridge.enable().unwrap();
        board.rpwm.broken.set(true);

        assert_eq!(bridge.release(), Err(MotorError::Output));
        assert_eq!(board.lpwm.duty.get(), 0);
        assert!(!board.ren.high.get());
        assert!(!board.len.high.get());
    }

    #[test]
    fn test_enable_reports_pin_failure() {
        let board = Board::default();
        board.len.broken.set(true);
        let mut bridge = board.bridge();
        assert_eq!(bridge.enable(), Err(MotorError::Output));
    }
}
