//! Buzzer bleep patterns (`notify` topic)
//!
//! Format: `"AxB.B.B..."`
//! - `A`: repeat count, a single digit (0 plays nothing)
//! - `B`: bleep length as a multiple of [`BLEEP_ON_MS`], up to four digits.
//!   `0` or a segment without digits is a pause of [`BLEEP_SILENCE_MS`].
//!
//! `"1x1.0.1.2.1"` plays beep, pause, beep, long beep, beep.

use heapless::Vec;

use crate::error::CommandError;

/// Base "on" time of one bleep unit
pub const BLEEP_ON_MS: u32 = 80;
/// Gap after every bleep
pub const BLEEP_OFF_MS: u32 = 110;
/// Length of a silent segment
pub const BLEEP_SILENCE_MS: u32 = 300;
/// Gap between repeats
pub const BLEEP_REPEAT_GAP_MS: u32 = 200;

/// Maximum number of segments kept from a pattern
pub const MAX_SEGMENTS: usize = 32;

/// Largest per-segment multiplier (four digits)
const MAX_SEGMENT_VALUE: u16 = 9999;

/// One buzzer state held for a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tone {
    /// Buzzer driven
    pub on: bool,
    /// Duration in milliseconds
    pub ms: u32,
}

impl Tone {
    const fn on(ms: u32) -> Self {
        Self { on: true, ms }
    }

    const fn off(ms: u32) -> Self {
        Self { on: false, ms }
    }
}

/// A parsed bleep pattern
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BleepPattern {
    repeats: u8,
    segments: Vec<u16, MAX_SEGMENTS>,
}

impl BleepPattern {
    /// Parse a pattern string
    ///
    /// Segments beyond [`MAX_SEGMENTS`] are dropped.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let text = text.trim();
        let bytes = text.as_bytes();
        if bytes.len() < 2 || !bytes[0].is_ascii_digit() || bytes[1] != b'x' {
            return Err(CommandError::InvalidPattern);
        }

        let repeats = bytes[0] - b'0';
        let mut segments = Vec::new();
        for part in bytes[2..].split(|&b| b == b'.') {
            let value = part
                .iter()
                .copied()
                .filter(u8::is_ascii_digit)
                .take(4)
                .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'));
            if segments.push(value).is_err() {
                break;
            }
        }

        Ok(Self { repeats, segments })
    }

    /// Build a pattern from a repeat count and segment multipliers
    pub fn from_segments(repeats: u8, segments: &[u16]) -> Self {
        let mut kept = Vec::new();
        for &segment in segments.iter().take(MAX_SEGMENTS) {
            let _ = kept.push(segment.min(MAX_SEGMENT_VALUE));
        }
        Self {
            repeats: repeats.min(9),
            segments: kept,
        }
    }

    /// `count` short bleeps, played once
    pub fn short(count: usize) -> Self {
        let mut segments = Vec::new();
        for _ in 0..count.min(MAX_SEGMENTS) {
            let _ = segments.push(1);
        }
        Self {
            repeats: 1,
            segments,
        }
    }

    /// Repeat count
    pub fn repeats(&self) -> u8 {
        self.repeats
    }

    /// Segment multipliers
    pub fn segments(&self) -> &[u16] {
        &self.segments
    }

    /// Iterate over the tones making up this pattern
    pub fn tones(&self) -> Tones<'_> {
        Tones {
            pattern: self,
            repeat: 0,
            segment: 0,
            pending_off: false,
        }
    }

    /// Total playing time in milliseconds
    pub fn total_ms(&self) -> u32 {
        self.tones().map(|tone| tone.ms).sum()
    }
}

/// Iterator over the [`Tone`]s of a [`BleepPattern`]
pub struct Tones<'a> {
    pattern: &'a BleepPattern,
    repeat: u8,
    segment: usize,
    pending_off: bool,
}

impl Iterator for Tones<'_> {
    type Item = Tone;

    fn next(&mut self) -> Option<Tone> {
        if self.pending_off {
            self.pending_off = false;
            return Some(Tone::off(BLEEP_OFF_MS));
        }

        if self.repeat >= self.pattern.repeats {
            return None;
        }

        if self.segment >= self.pattern.segments.len() {
            self.segment = 0;
            self.repeat += 1;
            if self.repeat >= self.pattern.repeats || self.pattern.segments.is_empty() {
                self.repeat = self.pattern.repeats;
                return None;
            }
            return Some(Tone::off(BLEEP_REPEAT_GAP_MS));
        }

        let units = self.pattern.segments[self.segment];
        self.segment += 1;
        if units == 0 {
            Some(Tone::off(BLEEP_SILENCE_MS))
        } else {
            self.pending_off = true;
            Some(Tone::on(BLEEP_ON_MS * u32::from(units)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::vec::Vec as StdVec;

    fn collect(pattern: &BleepPattern) -> StdVec<Tone> {
        pattern.tones().collect()
    }

    #[test]
    fn test_parse_basic() {
        let p = BleepPattern::parse("2x1.1.1").unwrap();
        assert_eq!(p.repeats(), 2);
        assert_eq!(p.segments(), &[1, 1, 1]);
    }

    #[test]
    fn test_two_repeats_of_three_pulses() {
        let p = BleepPattern::parse("2x1.1.1").unwrap();
        let pulse = [Tone::on(80), Tone::off(110)];
        let mut expected = StdVec::new();
        for _ in 0..3 {
            expected.extend_from_slice(&pulse);
        }
        expected.push(Tone::off(BLEEP_REPEAT_GAP_MS));
        for _ in 0..3 {
            expected.extend_from_slice(&pulse);
        }
        assert_eq!(collect(&p), expected);
        assert_eq!(p.total_ms(), 6 * 190 + 200);
    }

    #[test]
    fn test_zero_and_non_numeric_are_silence() {
        let p = BleepPattern::parse("1x2.0.zz.3").unwrap();
        assert_eq!(p.segments(), &[2, 0, 0, 3]);
        assert_eq!(
            collect(&p),
            [
                Tone::on(160),
                Tone::off(110),
                Tone::off(300),
                Tone::off(300),
                Tone::on(240),
                Tone::off(110),
            ]
        );
    }

    #[test]
    fn test_long_segment_truncated_to_four_digits() {
        let p = BleepPattern::parse("1x123456").unwrap();
        assert_eq!(p.segments(), &[1234]);
    }

    #[test]
    fn test_zero_repeats_is_silent() {
        let p = BleepPattern::parse("0x1.1").unwrap();
        assert_eq!(p.tones().count(), 0);
    }

    #[test]
    fn test_invalid_prefix() {
        assert_eq!(BleepPattern::parse("x1"), Err(CommandError::InvalidPattern));
        assert_eq!(BleepPattern::parse("3"), Err(CommandError::InvalidPattern));
        assert_eq!(BleepPattern::parse("21.1"), Err(CommandError::InvalidPattern));
        assert_eq!(BleepPattern::parse(""), Err(CommandError::InvalidPattern));
    }

    #[test]
    fn test_short_matches_parsed() {
        assert_eq!(BleepPattern::short(2), BleepPattern::parse("1x1.1").unwrap());
    }

    #[test]
    fn test_startup_pattern() {
        let p = BleepPattern::parse("1x3").unwrap();
        assert_eq!(collect(&p), [Tone::on(240), Tone::off(110)]);
    }

    proptest! {
        #[test]
        fn prop_parse_never_panics(s in "\\PC{0,80}") {
            if let Ok(p) = BleepPattern::parse(&s) {
                prop_assert!(p.segments().len() <= MAX_SEGMENTS);
                prop_assert!(p.segments().iter().all(|&d| d <= MAX_SEGMENT_VALUE));
                let _ = p.total_ms();
            }
        }

        #[test]
        fn prop_tone_count(repeats in 1u8..=9, segs in proptest::collection::vec(1u16..5, 1..8)) {
            let p = BleepPattern::from_segments(repeats, &segs);
            let expected = usize::from(repeats) * segs.len() * 2 + usize::from(repeats) - 1;
            prop_assert_eq!(p.tones().count(), expected);
        }
    }
}
