//! Control context
//!
//! Lock discipline: every method takes the lock once, touches a handful of
//! fields and returns. No method blocks, awaits or calls back out while
//! holding it.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::MotionConfig;
use crate::debounce::EdgeDebounce;
use crate::state::{Direction, MotorStatus, StopReason};

/// A validated remote move waiting for the control task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RemoteAction {
    pub direction: Direction,
    /// Rotation target, `None` for a timer-bounded run
    pub target: Option<u32>,
}

/// Flags drained by the control task at the top of an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputSnapshot {
    pub stop: Option<StopReason>,
    pub pending: Option<RemoteAction>,
    /// Accepted button edges, indexed by [`Direction::index`]
    pub buttons_changed: [bool; 2],
    /// Confirmed rotations since the last snapshot
    pub rotations: u16,
    pub motion: MotionConfig,
}

#[derive(Debug, Clone, Copy)]
struct ButtonLatch {
    changed: bool,
    debounce: EdgeDebounce,
}

impl ButtonLatch {
    const fn new() -> Self {
        Self {
            changed: false,
            debounce: EdgeDebounce::new(),
        }
    }
}

#[derive(Debug)]
struct SharedState {
    stop: Option<StopReason>,
    pending: Option<RemoteAction>,
    buttons: [ButtonLatch; 2],
    rotation: EdgeDebounce,
    rotations_pending: u16,
    allow_to_run: bool,
    restart_pending: bool,
    motion: MotionConfig,
    status: MotorStatus,
}

/// Cross-context control state
pub struct ControlContext<M: RawMutex> {
    inner: Mutex<M, RefCell<SharedState>>,
}

impl<M: RawMutex> ControlContext<M> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(SharedState {
                stop: None,
                pending: None,
                buttons: [ButtonLatch::new(), ButtonLatch::new()],
                rotation: EdgeDebounce::new(),
                rotations_pending: 0,
                allow_to_run: false,
                restart_pending: false,
                motion: MotionConfig::new(),
                status: MotorStatus::new(),
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut SharedState) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    // --- interrupt side ---

    /// Button edge seen at `now_ms`, returns true if it passed the debounce
    pub fn button_edge(&self, direction: Direction, now_ms: u64) -> bool {
        self.with(|s| {
            let window = s.motion.debounce_switches_ms;
            let latch = &mut s.buttons[direction.index()];
            if latch.debounce.accept(now_ms, window) {
                latch.changed = true;
                true
            } else {
                false
            }
        })
    }

    /// Rotation pulse seen at `now_ms`, returns true if counted
    pub fn rotation_edge(&self, now_ms: u64) -> bool {
        self.with(|s| {
            if !s.motion.counts_rotations() {
                return false;
            }
            if s.rotation.accept(now_ms, s.motion.debounce_rotation_ms) {
                s.rotations_pending = s.rotations_pending.saturating_add(1);
                true
            } else {
                false
            }
        })
    }

    /// Request a stop; the first reason since the last drain wins
    ///
    /// Also withdraws permission to run, which cancels a ramp in progress.
    pub fn request_stop(&self, reason: StopReason) {
        self.with(|s| {
            s.stop.get_or_insert(reason);
            s.allow_to_run = false;
        })
    }

    // --- background side ---

    /// Leave a remote move for the control task
    ///
    /// Single slot: returns the unconsumed action this one replaced.
    pub fn submit(&self, action: RemoteAction) -> Option<RemoteAction> {
        self.with(|s| s.pending.replace(action))
    }

    /// Refuse every further start until the MCU resets
    ///
    /// Fails while the motor runs or a start already holds permission to
    /// run. Checked under the same lock as [`Self::claim_start`], so once
    /// this returns true no run can begin.
    pub fn lock_for_restart(&self) -> bool {
        self.with(|s| {
            if s.allow_to_run || s.status.is_running() {
                return false;
            }
            s.restart_pending = true;
            true
        })
    }

    /// Last published motor status
    pub fn status(&self) -> MotorStatus {
        self.with(|s| s.status)
    }

    pub fn motion_config(&self) -> MotionConfig {
        self.with(|s| s.motion)
    }

    pub fn set_motion_config(&self, motion: MotionConfig) {
        self.with(|s| s.motion = motion)
    }

    // --- control side ---

    /// Read and clear every request flag as one batch
    pub fn take_inputs(&self) -> InputSnapshot {
        self.with(|s| {
            let mut buttons_changed = [false; 2];
            for (changed, latch) in buttons_changed.iter_mut().zip(s.buttons.iter_mut()) {
                *changed = core::mem::take(&mut latch.changed);
            }
            InputSnapshot {
                stop: s.stop.take(),
                pending: s.pending.take(),
                buttons_changed,
                rotations: core::mem::take(&mut s.rotations_pending),
                motion: s.motion,
            }
        })
    }

    /// Take permission to run, unless a restart is pending
    pub fn claim_start(&self) -> bool {
        self.with(|s| {
            if s.restart_pending {
                return false;
            }
            s.allow_to_run = true;
            true
        })
    }

    pub fn set_allow_to_run(&self, allow: bool) {
        self.with(|s| s.allow_to_run = allow)
    }

    pub fn allow_to_run(&self) -> bool {
        self.with(|s| s.allow_to_run)
    }

    /// Whether a ramp in progress must give up
    ///
    /// True once permission is withdrawn, a stop is pending or a button
    /// edge arrived. Nothing is consumed.
    pub fn start_cancelled(&self) -> bool {
        self.with(|s| {
            !s.allow_to_run || s.stop.is_some() || s.buttons.iter().any(|latch| latch.changed)
        })
    }

    pub fn publish_status(&self, status: MotorStatus) {
        self.with(|s| s.status = status)
    }
}

impl<M: RawMutex> Default for ControlContext<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, NoopRawMutex};

    static SHARED: ControlContext<CriticalSectionRawMutex> = ControlContext::new();

    fn open_to(target: u32) -> RemoteAction {
        RemoteAction {
            direction: Direction::Open,
            target: Some(target),
        }
    }

    #[test]
    fn test_static_context() {
        SHARED.request_stop(StopReason::Remote);
        assert_eq!(SHARED.take_inputs().stop, Some(StopReason::Remote));
        assert_eq!(SHARED.take_inputs().stop, None);
    }

    #[test]
    fn test_pending_last_write_wins() {
        let ctx: ControlContext<NoopRawMutex> = ControlContext::new();
        assert_eq!(ctx.submit(open_to(5)), None);
        assert_eq!(ctx.submit(open_to(8)), Some(open_to(5)));
        assert_eq!(ctx.take_inputs().pending, Some(open_to(8)));
        assert_eq!(ctx.take_inputs().pending, None);
    }

    #[test]
    fn test_first_stop_reason_kept() {
        let ctx: ControlContext<NoopRawMutex> = ControlContext::new();
        ctx.set_allow_to_run(true);
        ctx.request_stop(StopReason::OpenLimit);
        ctx.request_stop(StopReason::Button);
        assert!(!ctx.allow_to_run());
        assert_eq!(ctx.take_inputs().stop, Some(StopReason::OpenLimit));
    }

    #[test]
    fn test_button_edges_debounced() {
        let ctx: ControlContext<NoopRawMutex> = ControlContext::new();
        assert!(ctx.button_edge(Direction::Close, 1000));
        assert!(!ctx.button_edge(Direction::Close, 1100));
        assert!(ctx.button_edge(Direction::Open, 1100));

        let inputs = ctx.take_inputs();
        assert_eq!(inputs.buttons_changed, [true, true]);
        assert_eq!(ctx.take_inputs().buttons_changed, [false, false]);
    }

    #[test]
    fn test_rotations_need_counting_enabled() {
        let ctx: ControlContext<NoopRawMutex> = ControlContext::new();
        assert!(ctx.rotation_edge(0));
        assert!(!ctx.rotation_edge(200));
        assert!(ctx.rotation_edge(501));
        assert_eq!(ctx.take_inputs().rotations, 2);

        let mut motion = MotionConfig::new();
        motion.max_open_rotations = 0;
        ctx.set_motion_config(motion);
        assert!(!ctx.rotation_edge(5000));
        assert_eq!(ctx.take_inputs().rotations, 0);
    }

    #[test]
    fn test_start_cancelled() {
        let ctx: ControlContext<NoopRawMutex> = ControlContext::new();
        assert!(ctx.start_cancelled());
        ctx.set_allow_to_run(true);
        assert!(!ctx.start_cancelled());
        ctx.button_edge(Direction::Open, 0);
        assert!(ctx.start_cancelled());
        let _ = ctx.take_inputs();
        assert!(!ctx.start_cancelled());
        ctx.request_stop(StopReason::MaxRunDuration);
        assert!(ctx.start_cancelled());
    }

    #[test]
    fn test_restart_lock_blocks_starts() {
        let ctx: ControlContext<NoopRawMutex> = ControlContext::new();
        assert!(ctx.claim_start());
        assert!(!ctx.lock_for_restart());

        ctx.request_stop(StopReason::Remote);
        assert!(ctx.lock_for_restart());
        assert!(!ctx.claim_start());
        assert!(!ctx.allow_to_run());
    }
}
