//! PWM slice setup for the H-bridge
//!
//! RPWM and LPWM share one slice (channel A opens, channel B closes). The
//! counter wraps at [`PWM_TOP`] so the 8-bit ramp duty maps one-to-one onto
//! compare values.

use embassy_rp::pwm::{ChannelAPin, ChannelBPin, Config, Pwm, PwmOutput, Slice};
use embassy_rp::Peri;
use fixed::types::U12F4;

/// Counter wrap value
pub const PWM_TOP: u16 = 255;

/// Clock divider: 125 MHz / 20 / 256 ≈ 24.4 kHz, inside the IBT-2 range
pub const PWM_DIVIDER: u8 = 20;

/// Slice configuration with both outputs low
pub fn motor_pwm_config() -> Config {
    let mut config = Config::default();
    config.top = PWM_TOP;
    config.divider = U12F4::from_num(PWM_DIVIDER);
    config.compare_a = 0;
    config.compare_b = 0;
    config
}

/// Split a slice into the (open, close) PWM outputs
///
/// Returns `None` if the slice did not yield both channels.
pub fn motor_pwm<'d, T: Slice>(
    slice: Peri<'d, T>,
    open: Peri<'d, impl ChannelAPin<T>>,
    close: Peri<'d, impl ChannelBPin<T>>,
) -> Option<(PwmOutput<'d>, PwmOutput<'d>)> {
    let pwm = Pwm::new_output_ab(slice, open, close, motor_pwm_config());
    match pwm.split() {
        (Some(open), Some(close)) => Some((open, close)),
        _ => None,
    }
}
