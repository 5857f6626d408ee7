//! Active buzzer pattern player
//!
//! Plays a [`BleepPattern`] by switching an active buzzer on and off. The
//! pin is always left low, including when a write fails midway.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use lamella_protocol::BleepPattern;

/// Buzzer on a single output pin
pub struct Buzzer<P> {
    pin: P,
}

impl<P: OutputPin> Buzzer<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Play a pattern to completion
    pub async fn play<D: DelayNs>(
        &mut self,
        pattern: &BleepPattern,
        delay: &mut D,
    ) -> Result<(), P::Error> {
        let result = self.play_tones(pattern, delay).await;
        self.pin.set_low()?;
        result
    }

    async fn play_tones<D: DelayNs>(
        &mut self,
        pattern: &BleepPattern,
        delay: &mut D,
    ) -> Result<(), P::Error> {
        for tone in pattern.tones() {
            if tone.on {
                self.pin.set_high()?;
            } else {
                self.pin.set_low()?;
            }
            delay.delay_ms(tone.ms).await;
        }
        Ok(())
    }
}
