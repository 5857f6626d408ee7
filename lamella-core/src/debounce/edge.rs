//! Time-window edge filter

/// Accepts an edge only if the window has elapsed since the last accepted one
///
/// Runs in interrupt context: a comparison and a timestamp store, nothing
/// else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeDebounce {
    last_accepted_ms: Option<u64>,
}

impl EdgeDebounce {
    pub const fn new() -> Self {
        Self {
            last_accepted_ms: None,
        }
    }

    /// Offer an edge seen at `now_ms`, returns true if it counts
    pub fn accept(&mut self, now_ms: u64, window_ms: u32) -> bool {
        match self.last_accepted_ms {
            Some(last) if now_ms.saturating_sub(last) <= u64::from(window_ms) => false,
            _ => {
                self.last_accepted_ms = Some(now_ms);
                true
            }
        }
    }

    /// Time of the last accepted edge
    pub fn last_accepted(&self) -> Option<u64> {
        self.last_accepted_ms
    }
}
