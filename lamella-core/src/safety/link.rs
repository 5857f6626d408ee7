//! Link health and restart arbitration
//!
//! The network bridge sends a `ping` line periodically. Too many missed
//! heartbeats mean the link is lost and the controller restarts, but never
//! while the motor is running: the restart waits until it stops.

/// Time without a heartbeat that counts as one miss
pub const HEARTBEAT_TIMEOUT_MS: u32 = 10_000;

/// Misses before the link is considered lost
pub const MAX_MISSED_HEARTBEATS: u8 = 3;

/// Why a restart is wanted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RestartReason {
    /// Heartbeats stopped arriving
    LinkLost,
    /// `appcmd:restart`
    Requested,
}

/// What the caller should do now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkAction {
    /// Nothing to do
    Healthy,
    /// Restart now
    Restart(RestartReason),
    /// Restart wanted, motor still running
    DeferRestart(RestartReason),
}

/// Heartbeat tracker
#[derive(Debug, Clone, Default)]
pub struct LinkSupervisor {
    missed_heartbeats: u8,
    time_since_heartbeat_ms: u32,
    restart_requested: bool,
}

impl LinkSupervisor {
    pub const fn new() -> Self {
        Self {
            missed_heartbeats: 0,
            time_since_heartbeat_ms: 0,
            restart_requested: false,
        }
    }

    /// Record a heartbeat received
    pub fn heartbeat_received(&mut self) {
        self.missed_heartbeats = 0;
        self.time_since_heartbeat_ms = 0;
    }

    /// Advance time by `delta_ms`
    pub fn update_time(&mut self, delta_ms: u32) {
        self.time_since_heartbeat_ms = self.time_since_heartbeat_ms.saturating_add(delta_ms);

        if self.time_since_heartbeat_ms >= HEARTBEAT_TIMEOUT_MS {
            self.missed_heartbeats = self.missed_heartbeats.saturating_add(1);
            self.time_since_heartbeat_ms = 0;
        }
    }

    /// Latch an explicit restart request
    pub fn request_restart(&mut self) {
        self.restart_requested = true;
    }

    pub fn is_link_healthy(&self) -> bool {
        self.missed_heartbeats < MAX_MISSED_HEARTBEATS
    }

    pub fn missed_heartbeats(&self) -> u8 {
        self.missed_heartbeats
    }

    /// Decide whether to restart, given the motor run state
    pub fn decide(&self, motor_running: bool) -> LinkAction {
        let reason = if self.restart_requested {
            RestartReason::Requested
        } else if !self.is_link_healthy() {
            RestartReason::LinkLost
        } else {
            return LinkAction::Healthy;
        };

        if motor_running {
            LinkAction::DeferRestart(reason)
        } else {
            LinkAction::Restart(reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_lost() {
        let mut link = LinkSupervisor::new();
        for _ in 0..MAX_MISSED_HEARTBEATS {
            link.update_time(HEARTBEAT_TIMEOUT_MS);
        }
        assert!(!link.is_link_healthy());
        assert_eq!(link.decide(false), LinkAction::Restart(RestartReason::LinkLost));
    }

    #[test]
    fn test_restart_deferred_while_running() {
        let mut link = LinkSupervisor::new();
        for _ in 0..MAX_MISSED_HEARTBEATS {
            link.update_time(HEARTBEAT_TIMEOUT_MS);
        }
        assert_eq!(
            link.decide(true),
            LinkAction::DeferRestart(RestartReason::LinkLost)
        );
        assert_eq!(link.decide(false), LinkAction::Restart(RestartReason::LinkLost));
    }

    #[test]
    fn test_heartbeat_resets_counter() {
        let mut link = LinkSupervisor::new();
        link.update_time(HEARTBEAT_TIMEOUT_MS);
        link.update_time(HEARTBEAT_TIMEOUT_MS);
        assert_eq!(link.missed_heartbeats(), 2);

        link.heartbeat_received();
        assert_eq!(link.missed_heartbeats(), 0);
        assert_eq!(link.decide(false), LinkAction::Healthy);
    }

    #[test]
    fn test_partial_timeouts_accumulate() {
        let mut link = LinkSupervisor::new();
        link.update_time(HEARTBEAT_TIMEOUT_MS / 2);
        assert_eq!(link.missed_heartbeats(), 0);
        link.update_time(HEARTBEAT_TIMEOUT_MS / 2);
        assert_eq!(link.missed_heartbeats(), 1);
    }

    #[test]
    fn test_requested_restart() {
        let mut link = LinkSupervisor::new();
        link.request_restart();
        assert_eq!(
            link.decide(true),
            LinkAction::DeferRestart(RestartReason::Requested)
        );
        assert_eq!(link.decide(false), LinkAction::Restart(RestartReason::Requested));
    }
}
