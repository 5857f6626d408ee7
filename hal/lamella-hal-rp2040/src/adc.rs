//! Motor current sense
//!
//! The IBT-2 R_IS and L_IS outputs are tied together onto one ADC pin with a
//! 10k pull-down. Readings are raw 12-bit counts, compared directly against
//! the configured current limit.

use embassy_rp::adc::{Adc, AdcPin, Blocking, Channel, Config};
use embassy_rp::gpio::Pull;
use embassy_rp::peripherals::ADC;
use embassy_rp::Peri;
use lamella_core::traits::CurrentSensor;

/// Blocking single-channel current sensor
pub struct AdcCurrentSense<'d> {
    adc: Adc<'d, Blocking>,
    channel: Channel<'d>,
}

impl<'d> AdcCurrentSense<'d> {
    pub fn new(adc: Peri<'d, ADC>, pin: Peri<'d, impl AdcPin>) -> Self {
        Self {
            adc: Adc::new_blocking(adc, Config::default()),
            channel: Channel::new_pin(pin, Pull::None),
        }
    }
}

impl CurrentSensor for AdcCurrentSense<'_> {
    fn read_current(&mut self) -> Option<u32> {
        // a failed conversion skips this sample
        self.adc.blocking_read(&mut self.channel).ok().map(u32::from)
    }
}
