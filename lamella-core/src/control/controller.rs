//! Motor controller
//!
//! Owns the motor outputs and every piece of motor state. Each iteration:
//!
//! 1. Drain the request flags from the [`ControlContext`] in one batch
//! 2. Run the safety checks
//! 3. Confirm the limit switch in the direction of travel
//! 4. Apply confirmed rotations to the position
//! 5. Handle button edges, then the pending remote action
//! 6. Stop if anything asked for it, otherwise start if something may
//!
//! A stop always wins over a start seen in the same iteration.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;
use lamella_protocol::BleepPattern;

use super::ramp::SoftStart;
use crate::config::MotionConfig;
use crate::debounce::ShiftDebounce;
use crate::position::{self, PositionTracker};
use crate::safety::{SafetyMonitor, SafetyStatus};
use crate::shared::ControlContext;
use crate::state::{
    Direction, LimitState, MotorIntent, MotorStatus, Owner, Phase, PhaseEvent, StopReason,
};
use crate::traits::{CurrentSensor, MotorError, MotorOutputs, SwitchInputs};

/// Time after a button stop during which the buttons do not start the motor
pub const BUTTON_HOLDOFF_MS: u64 = 1000;

/// Audible alarm raised by an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alarm {
    /// Button pressed towards an asserted limit
    ButtonRejected,
    /// Current threshold exceeded
    OverCurrent,
}

impl Alarm {
    pub fn pattern(self) -> BleepPattern {
        match self {
            Alarm::ButtonRejected => BleepPattern::short(2),
            Alarm::OverCurrent => BleepPattern::from_segments(2, &[1, 1, 1]),
        }
    }
}

/// Side effects of one iteration for the surrounding application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Iteration {
    /// Publish the status report
    pub status_changed: bool,
    /// Persist this position (stored form)
    pub persist_position: Option<i32>,
    pub alarm: Option<Alarm>,
    /// Motor was stopped for this reason
    pub stopped: Option<StopReason>,
    /// Motor was started in this direction
    pub started: Option<Direction>,
    /// An output write failed
    pub output_fault: bool,
    /// A start was refused because a restart is pending
    pub start_refused: bool,
}

impl Iteration {
    /// Fold a later iteration into this one
    ///
    /// Flags accumulate and the later value of each field wins, so nothing
    /// that still has to be published or persisted is lost.
    pub fn merge(&mut self, later: Iteration) {
        self.status_changed |= later.status_changed;
        self.persist_position = later.persist_position.or(self.persist_position);
        self.alarm = later.alarm.or(self.alarm);
        self.stopped = later.stopped.or(self.stopped);
        self.started = later.started.or(self.started);
        self.output_fault |= later.output_fault;
        self.start_refused |= later.start_refused;
    }

    pub fn is_empty(&self) -> bool {
        *self == Iteration::default()
    }
}

struct StartRequest {
    direction: Direction,
    owner: Owner,
    target: Option<u32>,
}

/// The motor state machine and its actuation
pub struct MotorController<S, C, O> {
    switches: S,
    current: C,
    outputs: O,
    phase: Phase,
    intent: MotorIntent,
    allow_to_run: bool,
    tracker: PositionTracker,
    limits: LimitState,
    limit_debounce: [ShiftDebounce; 2],
    safety: SafetyMonitor,
    last_button_stop_ms: [Option<u64>; 2],
}

impl<S, C, O> MotorController<S, C, O>
where
    S: SwitchInputs,
    C: CurrentSensor,
    O: MotorOutputs,
{
    /// Create the controller with the persisted position
    ///
    /// An asserted closed limit overrides the persisted value with 0.
    pub fn new(switches: S, current: C, outputs: O, persisted_position: i32) -> Self {
        let mut controller = Self {
            switches,
            current,
            outputs,
            phase: Phase::Idle,
            intent: MotorIntent::Idle,
            allow_to_run: false,
            tracker: PositionTracker::new(position::from_stored(persisted_position)),
            limits: LimitState::default(),
            limit_debounce: [ShiftDebounce::new(); 2],
            safety: SafetyMonitor::new(),
            last_button_stop_ms: [None; 2],
        };
        controller.resample_limits();
        controller
    }

    /// Release the outputs and publish the initial status
    pub fn init<M: RawMutex>(&mut self, ctx: &ControlContext<M>) -> Result<(), MotorError> {
        let released = self.outputs.release();
        ctx.set_allow_to_run(false);
        self.publish(ctx);
        released
    }

    pub fn status(&self) -> MotorStatus {
        MotorStatus {
            phase: self.phase,
            intent: self.intent,
            allow_to_run: self.allow_to_run,
            position: self.tracker.position(),
            limits: self.limits,
        }
    }

    /// One control loop pass
    pub async fn iterate<M: RawMutex, D: DelayNs>(
        &mut self,
        ctx: &ControlContext<M>,
        delay: &mut D,
        now_ms: u64,
    ) -> Iteration {
        let mut out = Iteration::default();
        let inputs = ctx.take_inputs();
        let motion = inputs.motion;
        let mut stop = inputs.stop;
        let active = self.phase.is_active();

        let raw_closed = self.switches.limit_active(Direction::Close);
        let raw_open = self.switches.limit_active(Direction::Open);
        if let SafetyStatus::Fault(reason) = self.safety.check(
            now_ms,
            active,
            raw_closed,
            raw_open,
            &mut self.current,
            &motion,
        ) {
            match reason {
                StopReason::OverCurrent => out.alarm = Some(Alarm::OverCurrent),
                StopReason::LimitFault => self.tracker.invalidate(),
                _ => {}
            }
            stop.get_or_insert(reason);
        }

        if active {
            if let Some(direction) = self.intent.direction() {
                let raw = match direction {
                    Direction::Close => raw_closed,
                    Direction::Open => raw_open,
                };
                if self.limit_debounce[direction.index()].poll(raw) {
                    self.limits.confirm(direction);
                    let reason = match direction {
                        Direction::Close => {
                            self.tracker.set_closed();
                            StopReason::ClosedLimit
                        }
                        Direction::Open => StopReason::OpenLimit,
                    };
                    stop.get_or_insert(reason);
                }

                if let Some(owner) = self.intent.owner() {
                    let target = self.intent.target();
                    for _ in 0..inputs.rotations {
                        let reached = self.tracker.on_rotation(direction, owner, target, &motion);
                        if let Some(reason) = reached {
                            stop.get_or_insert(reason);
                            break;
                        }
                    }
                }
            }
        }

        let mut start = None;
        for direction in Direction::ALL {
            let i = direction.index();
            if !inputs.buttons_changed[i] {
                continue;
            }
            if active {
                // any button edge while running is a stop
                self.last_button_stop_ms[i] = Some(now_ms);
                stop.get_or_insert(StopReason::Button);
                continue;
            }
            let held_off = matches!(
                self.last_button_stop_ms[i],
                Some(last) if now_ms.saturating_sub(last) <= BUTTON_HOLDOFF_MS
            );
            if held_off || !self.switches.button_pressed(direction) {
                continue;
            }
            self.resample_limits();
            if self.limits.is_set(direction) || start.is_some() {
                out.alarm = Some(Alarm::ButtonRejected);
            } else {
                start = Some(StartRequest {
                    direction,
                    owner: Owner::Button,
                    target: None,
                });
            }
        }

        if let Some(action) = inputs.pending {
            if !active && start.is_none() && !self.limits.is_set(action.direction) {
                start = Some(StartRequest {
                    direction: action.direction,
                    owner: Owner::Remote,
                    target: action.target,
                });
            }
        }

        if let Some(reason) = stop {
            self.stop(ctx, reason, &mut out);
        } else if let Some(request) = start {
            self.start(ctx, delay, request, &motion, now_ms, &mut out).await;
        }

        out
    }

    async fn start<M: RawMutex, D: DelayNs>(
        &mut self,
        ctx: &ControlContext<M>,
        delay: &mut D,
        request: StartRequest,
        motion: &MotionConfig,
        now_ms: u64,
        out: &mut Iteration,
    ) {
        let StartRequest {
            direction,
            owner,
            target,
        } = request;
        if !ctx.claim_start() {
            out.start_refused = true;
            return;
        }
        let was_closed = self.limits.closed;

        self.phase = self.phase.transition(PhaseEvent::Start);
        self.intent = MotorIntent::moving(direction, owner, target);
        self.allow_to_run = true;
        self.tracker.begin_run();
        for debounce in &mut self.limit_debounce {
            debounce.reset();
        }
        self.safety
            .timers_mut()
            .arm(now_ms, direction, owner, motion);
        self.publish(ctx);
        out.started = Some(direction);

        if self.outputs.enable().is_err() {
            out.output_fault = true;
            ctx.request_stop(StopReason::OutputFault);
            return;
        }

        for step in SoftStart::new() {
            if ctx.start_cancelled() {
                break;
            }
            if self.outputs.set_duty(direction, step.duty).is_err() {
                out.output_fault = true;
                ctx.request_stop(StopReason::OutputFault);
                break;
            }
            delay.delay_ms(step.wait_ms).await;
        }

        // A cancelled ramp keeps its duty; the pending stop is handled on
        // the next pass
        self.phase = self.phase.transition(PhaseEvent::RampDone);
        self.resample_limits();
        if was_closed && direction == Direction::Open {
            out.status_changed = true;
        }
        self.publish(ctx);
    }

    /// Release outputs and return to idle
    ///
    /// Runs the full release whatever the current phase.
    fn stop<M: RawMutex>(&mut self, ctx: &ControlContext<M>, reason: StopReason, out: &mut Iteration) {
        let was_active = self.phase.is_active();
        self.phase = self.phase.transition(PhaseEvent::Stop);
        self.intent = MotorIntent::Stopping { reason };

        if self.outputs.release().is_err() {
            out.output_fault = true;
        }
        self.safety.timers_mut().cancel();
        for debounce in &mut self.limit_debounce {
            debounce.reset();
        }

        let before = self.limits;
        self.resample_limits();

        self.phase = self.phase.transition(PhaseEvent::Released);
        self.intent = MotorIntent::Idle;
        self.allow_to_run = false;
        ctx.set_allow_to_run(false);

        if was_active {
            out.stopped = Some(reason);
            out.persist_position = Some(position::to_stored(self.tracker.position()));
        }
        if was_active || before != self.limits {
            out.status_changed = true;
        }
        self.publish(ctx);
    }

    /// Read both limit switches directly
    ///
    /// Both asserted is a wiring fault: neither side is trusted and the
    /// position is dropped.
    fn resample_limits(&mut self) {
        let closed = self.switches.limit_active(Direction::Close);
        let open = self.switches.limit_active(Direction::Open);
        if closed && open {
            self.limits = LimitState::default();
            self.tracker.invalidate();
            return;
        }
        self.limits = LimitState { closed, open };
        if closed {
            self.tracker.set_closed();
        }
    }

    fn publish<M: RawMutex>(&self, ctx: &ControlContext<M>) {
        ctx.publish_status(self.status());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::RemoteAction;
    use core::cell::{Cell, RefCell};
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use proptest::prelude::*;
    use std::vec::Vec;

    #[derive(Default)]
    struct Board {
        limits: [Cell<bool>; 2],
        buttons: [Cell<bool>; 2],
        current: Cell<Option<u32>>,
        enabled: Cell<bool>,
        duty: [Cell<u8>; 2],
        writes: RefCell<Vec<(Direction, u8)>>,
        fail_enable: Cell<bool>,
    }

    impl Board {
        fn set_limit(&self, direction: Direction, active: bool) {
            self.limits[direction.index()].set(active);
        }

        fn set_button(&self, direction: Direction, pressed: bool) {
            self.buttons[direction.index()].set(pressed);
        }

        fn released(&self) -> bool {
            !self.enabled.get() && self.duty.iter().all(|d| d.get() == 0)
        }
    }

    impl SwitchInputs for &Board {
        fn limit_active(&mut self, direction: Direction) -> bool {
            self.limits[direction.index()].get()
        }

        fn button_pressed(&mut self, direction: Direction) -> bool {
            self.buttons[direction.index()].get()
        }
    }

    impl CurrentSensor for &Board {
        fn read_current(&mut self) -> Option<u32> {
            self.current.get()
        }
    }

    impl MotorOutputs for &Board {
        fn enable(&mut self) -> Result<(), MotorError> {
            if self.fail_enable.get() {
                return Err(MotorError::Output);
            }
            self.enabled.set(true);
            Ok(())
        }

        fn set_duty(&mut self, direction: Direction, duty: u8) -> Result<(), MotorError> {
            self.duty[direction.index()].set(duty);
            self.duty[direction.opposite().index()].set(0);
            self.writes.borrow_mut().push((direction, duty));
            Ok(())
        }

        fn release(&mut self) -> Result<(), MotorError> {
            self.enabled.set(false);
            self.duty[0].set(0);
            self.duty[1].set(0);
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        async fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Requests a stop after a number of ramp steps
    struct StopAfter<'a> {
        ctx: &'a ControlContext<NoopRawMutex>,
        remaining: usize,
    }

    impl DelayNs for StopAfter<'_> {
        async fn delay_ns(&mut self, _ns: u32) {}

        async fn delay_ms(&mut self, _ms: u32) {
            if self.remaining == 0 {
                self.ctx.request_stop(StopReason::Remote);
            } else {
                self.remaining -= 1;
            }
        }
    }

    type Controller<'a> = MotorController<&'a Board, &'a Board, &'a Board>;

    fn controller(board: &Board, persisted: i32) -> Controller<'_> {
        MotorController::new(board, board, board, persisted)
    }

    fn run(
        c: &mut Controller<'_>,
        ctx: &ControlContext<NoopRawMutex>,
        now_ms: u64,
    ) -> Iteration {
        block_on(c.iterate(ctx, &mut NoDelay, now_ms))
    }

    fn remote(direction: Direction, target: Option<u32>) -> RemoteAction {
        RemoteAction { direction, target }
    }

    #[test]
    fn test_closed_limit_at_startup_resets_position() {
        let board = Board::default();
        board.set_limit(Direction::Close, true);
        let c = controller(&board, 13);
        assert_eq!(c.status().position, Some(0));
        assert!(c.status().limits.closed);

        let board = Board::default();
        let c = controller(&board, 13);
        assert_eq!(c.status().position, Some(13));

        let c = controller(&board, -1);
        assert_eq!(c.status().position, None);
    }

    #[test]
    fn test_remote_open_ramps_and_runs() {
        let board = Board::default();
        board.set_limit(Direction::Close, true);
        let ctx = ControlContext::new();
        let mut c = controller(&board, 0);
        c.init(&ctx).unwrap();

        ctx.submit(remote(Direction::Open, Some(10)));
        board.set_limit(Direction::Close, false);
        let out = run(&mut c, &ctx, 0);

        assert_eq!(out.started, Some(Direction::Open));
        assert!(out.status_changed);
        assert!(board.enabled.get());
        assert_eq!(board.duty[Direction::Open.index()].get(), 255);
        assert_eq!(board.writes.borrow().len(), 206);

        let status = ctx.status();
        assert_eq!(status.phase, Phase::Running);
        assert!(status.allow_to_run);
        assert_eq!(status.intent.owner(), Some(Owner::Remote));
        assert_eq!(status.intent.target(), Some(10));
    }

    #[test]
    fn test_stop_request_releases_outputs() {
        let board = Board::default();
        let ctx = ControlContext::new();
        let mut c = controller(&board, 5);
        ctx.submit(remote(Direction::Close, Some(0)));
        run(&mut c, &ctx, 0);
        assert!(board.enabled.get());

        ctx.request_stop(StopReason::Remote);
        let out = run(&mut c, &ctx, 10);
        assert!(board.released());
        assert_eq!(out.stopped, Some(StopReason::Remote));
        assert_eq!(out.persist_position, Some(5));
        assert!(out.status_changed);
        assert_eq!(ctx.status().phase, Phase::Idle);
        assert!(!ctx.allow_to_run());
    }

    #[test]
    fn test_stop_while_idle_is_quiet() {
        let board = Board::default();
        let ctx = ControlContext::new();
        let mut c = controller(&board, 5);
        ctx.request_stop(StopReason::Remote);
        let out = run(&mut c, &ctx, 0);
        assert!(board.released());
        assert!(!out.status_changed);
        assert_eq!(out.stopped, None);
        assert_eq!(out.persist_position, None);
    }

    #[test]
    fn test_stop_wins_over_pending_start() {
        let board = Board::default();
        let ctx = ControlContext::new();
        let mut c = controller(&board, 5);
        ctx.submit(remote(Direction::Open, None));
        ctx.request_stop(StopReason::Remote);
        let out = run(&mut c, &ctx, 0);
        assert_eq!(out.started, None);
        assert!(!board.enabled.get());
        assert_eq!(ctx.take_inputs().pending, None);
    }

    #[test]
    fn test_ramp_cancelled_by_stop() {
        let board = Board::default();
        let ctx = ControlContext::new();
        let mut c = controller(&board, 5);
        ctx.submit(remote(Direction::Open, None));
        let mut delay = StopAfter {
            ctx: &ctx,
            remaining: 9,
        };
        block_on(c.iterate(&ctx, &mut delay, 0));
        assert_eq!(board.writes.borrow().len(), 10);
        assert_eq!(board.duty[Direction::Open.index()].get(), 59);

        let out = run(&mut c, &ctx, 100);
        assert_eq!(out.stopped, Some(StopReason::Remote));
        assert!(board.released());
    }

    #[test]
    fn test_closed_limit_confirmed_stops_close() {
        let board = Board::default();
        let ctx = ControlContext::new();
        let mut c = controller(&board, 2);
        ctx.submit(remote(Direction::Close, Some(0)));
        run(&mut c, &ctx, 0);

        board.set_limit(Direction::Close, true);
        for now in 1..4 {
            assert_eq!(run(&mut c, &ctx, now).stopped, None);
        }
        let out = run(&mut c, &ctx, 4);
        assert_eq!(out.stopped, Some(StopReason::ClosedLimit));
        assert_eq!(out.persist_position, Some(0));
        let status = ctx.status();
        assert!(status.limits.closed && !status.limits.open);
        assert_eq!(status.report(&MotionConfig::new()).percentage, Some(0));
    }

    #[test]
    fn test_rotation_target_reached() {
        let board = Board::default();
        let ctx = ControlContext::new();
        let mut c = controller(&board, 0);
        ctx.submit(remote(Direction::Open, Some(2)));
        run(&mut c, &ctx, 0);

        assert!(ctx.rotation_edge(1000));
        assert_eq!(run(&mut c, &ctx, 1001).stopped, None);
        assert!(ctx.rotation_edge(2000));
        let out = run(&mut c, &ctx, 2001);
        assert_eq!(out.stopped, Some(StopReason::TargetReached));
        assert_eq!(out.persist_position, Some(2));
    }

    #[test]
    fn test_button_starts_and_stops() {
        let board = Board::default();
        let ctx = ControlContext::new();
        let mut c = controller(&board, 3);

        board.set_button(Direction::Close, true);
        ctx.button_edge(Direction::Close, 0);
        let out = run(&mut c, &ctx, 0);
        assert_eq!(out.started, Some(Direction::Close));
        assert_eq!(ctx.status().intent.owner(), Some(Owner::Button));

        // release edge while running stops
        board.set_button(Direction::Close, false);
        ctx.button_edge(Direction::Close, 500);
        let out = run(&mut c, &ctx, 500);
        assert_eq!(out.stopped, Some(StopReason::Button));

        // pressed again inside the holdoff: ignored
        board.set_button(Direction::Close, true);
        ctx.button_edge(Direction::Close, 1200);
        assert_eq!(run(&mut c, &ctx, 1200).started, None);

        ctx.button_edge(Direction::Close, 1600);
        assert_eq!(run(&mut c, &ctx, 1600).started, Some(Direction::Close));
    }

    #[test]
    fn test_button_rejected_at_limit() {
        let board = Board::default();
        board.set_limit(Direction::Open, true);
        let ctx = ControlContext::new();
        let mut c = controller(&board, 20);
        board.set_button(Direction::Open, true);
        ctx.button_edge(Direction::Open, 0);
        let out = run(&mut c, &ctx, 0);
        assert_eq!(out.started, None);
        assert_eq!(out.alarm, Some(Alarm::ButtonRejected));
        assert_eq!(Alarm::ButtonRejected.pattern(), BleepPattern::short(2));
    }

    #[test]
    fn test_over_current_stops_with_alarm() {
        let board = Board::default();
        let ctx = ControlContext::new();
        let mut motion = MotionConfig::new();
        motion.max_current = 400;
        ctx.set_motion_config(motion);
        let mut c = controller(&board, 5);
        ctx.submit(remote(Direction::Close, Some(0)));
        run(&mut c, &ctx, 0);

        board.current.set(Some(900));
        let out = run(&mut c, &ctx, 1);
        assert_eq!(out.stopped, Some(StopReason::OverCurrent));
        assert_eq!(out.alarm, Some(Alarm::OverCurrent));
        assert!(board.released());
    }

    #[test]
    fn test_both_limits_fault() {
        let board = Board::default();
        let ctx = ControlContext::new();
        let mut c = controller(&board, 5);
        ctx.submit(remote(Direction::Open, None));
        run(&mut c, &ctx, 0);

        board.set_limit(Direction::Open, true);
        board.set_limit(Direction::Close, true);
        let out = run(&mut c, &ctx, 1);
        assert_eq!(out.stopped, Some(StopReason::LimitFault));
        assert_eq!(out.persist_position, Some(position::UNKNOWN_POSITION));
        let status = ctx.status();
        assert_eq!(status.position, None);
        assert_eq!(status.limits, LimitState::default());
    }

    #[test]
    fn test_max_run_timer() {
        let board = Board::default();
        let ctx = ControlContext::new();
        let mut c = controller(&board, 5);
        ctx.submit(remote(Direction::Close, Some(0)));
        run(&mut c, &ctx, 0);
        assert_eq!(run(&mut c, &ctx, 59_999).stopped, None);
        assert_eq!(
            run(&mut c, &ctx, 60_000).stopped,
            Some(StopReason::MaxRunDuration)
        );
    }

    #[test]
    fn test_enable_failure_requests_stop() {
        let board = Board::default();
        board.fail_enable.set(true);
        let ctx = ControlContext::new();
        let mut c = controller(&board, 5);
        ctx.submit(remote(Direction::Open, None));
        let out = run(&mut c, &ctx, 0);
        assert!(out.output_fault);
        assert!(board.writes.borrow().is_empty());
        assert_eq!(run(&mut c, &ctx, 1).stopped, Some(StopReason::OutputFault));
    }

    #[test]
    fn test_remote_open_refused_at_open_limit() {
        let board = Board::default();
        board.set_limit(Direction::Open, true);
        let ctx = ControlContext::new();
        let mut c = controller(&board, 20);
        ctx.submit(remote(Direction::Open, None));
        let out = run(&mut c, &ctx, 0);
        assert_eq!(out.started, None);
        assert!(board.released());
        assert!(board.writes.borrow().is_empty());
        assert_eq!(ctx.status().phase, Phase::Idle);
        assert_eq!(ctx.take_inputs().pending, None);
    }

    #[test]
    fn test_open_duration_stops_remote_open() {
        let board = Board::default();
        let ctx = ControlContext::new();
        let mut c = controller(&board, 5);
        ctx.submit(remote(Direction::Open, None));
        assert_eq!(run(&mut c, &ctx, 0).started, Some(Direction::Open));

        assert_eq!(run(&mut c, &ctx, 19_999).stopped, None);
        let out = run(&mut c, &ctx, 20_000);
        assert_eq!(out.stopped, Some(StopReason::OpenDuration));
        assert_eq!(out.persist_position, Some(5));
        assert!(board.released());
    }

    #[test]
    fn test_closed_offset_extra_rotations() {
        let board = Board::default();
        let ctx = ControlContext::new();
        let mut motion = MotionConfig::new();
        motion.closed_offset_raw = 2;
        ctx.set_motion_config(motion);
        let mut c = controller(&board, 1);
        ctx.submit(remote(Direction::Close, Some(0)));
        run(&mut c, &ctx, 0);

        // reaches zero, then two extra rotations
        for now in [1000, 2000] {
            assert!(ctx.rotation_edge(now));
            assert_eq!(run(&mut c, &ctx, now + 1).stopped, None);
            assert_eq!(c.status().position, Some(0));
        }
        assert!(ctx.rotation_edge(3000));
        let out = run(&mut c, &ctx, 3001);
        assert_eq!(out.stopped, Some(StopReason::ClosedOffsetReached));
        assert_eq!(out.persist_position, Some(0));
        assert!(board.released());
    }

    #[test]
    fn test_no_start_once_restart_locked() {
        let board = Board::default();
        let ctx = ControlContext::new();
        let mut c = controller(&board, 5);
        c.init(&ctx).unwrap();
        assert!(ctx.lock_for_restart());

        board.set_button(Direction::Close, true);
        ctx.button_edge(Direction::Close, 10);
        let out = run(&mut c, &ctx, 10);
        assert_eq!(out.started, None);
        assert!(out.start_refused);

        ctx.submit(remote(Direction::Open, None));
        let out = run(&mut c, &ctx, 20);
        assert_eq!(out.started, None);
        assert!(out.start_refused);

        assert!(board.released());
        assert!(board.writes.borrow().is_empty());
        assert!(!ctx.status().is_running());
    }

    #[test]
    fn test_restart_lock_refused_while_running() {
        let board = Board::default();
        let ctx = ControlContext::new();
        let mut c = controller(&board, 5);
        ctx.submit(remote(Direction::Close, Some(0)));
        run(&mut c, &ctx, 0);
        assert!(!ctx.lock_for_restart());

        ctx.request_stop(StopReason::Remote);
        run(&mut c, &ctx, 10);
        assert!(ctx.lock_for_restart());
    }

    #[test]
    fn test_merge_keeps_pending_effects() {
        let board = Board::default();
        let ctx = ControlContext::new();
        let mut c = controller(&board, 5);
        ctx.submit(remote(Direction::Close, Some(0)));
        let mut backlog = run(&mut c, &ctx, 0);

        ctx.request_stop(StopReason::Remote);
        backlog.merge(run(&mut c, &ctx, 10));

        board.set_limit(Direction::Open, true);
        board.set_button(Direction::Open, true);
        ctx.button_edge(Direction::Open, 2000);
        backlog.merge(run(&mut c, &ctx, 2000));

        assert!(backlog.status_changed);
        assert_eq!(backlog.persist_position, Some(5));
        assert_eq!(backlog.stopped, Some(StopReason::Remote));
        assert_eq!(backlog.started, Some(Direction::Close));
        assert_eq!(backlog.alarm, Some(Alarm::ButtonRejected));
        assert!(!backlog.is_empty());
        assert!(Iteration::default().is_empty());
    }

    #[derive(Debug, Clone)]
    enum Step {
        Button(usize, bool),
        Remote(bool, Option<u32>),
        Stop,
        Rotation,
        Limit(usize, bool),
        Wait(u64),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0usize..2, any::<bool>()).prop_map(|(i, p)| Step::Button(i, p)),
            (any::<bool>(), proptest::option::of(0u32..25)).prop_map(|(o, t)| Step::Remote(o, t)),
            Just(Step::Stop),
            Just(Step::Rotation),
            (0usize..2, any::<bool>()).prop_map(|(i, a)| Step::Limit(i, a)),
            (1u64..2000).prop_map(Step::Wait),
        ]
    }

    proptest! {
        #[test]
        fn prop_interlock_invariants(steps in proptest::collection::vec(step(), 1..80)) {
            let board = Board::default();
            let ctx: ControlContext<NoopRawMutex> = ControlContext::new();
            let mut c = controller(&board, 0);
            c.init(&ctx).unwrap();
            let mut now = 0u64;

            for s in steps {
                let mut stop_requested = false;
                match s {
                    Step::Button(i, pressed) => {
                        let direction = Direction::ALL[i];
                        board.set_button(direction, pressed);
                        ctx.button_edge(direction, now);
                    }
                    Step::Remote(open, target) => {
                        let direction = if open { Direction::Open } else { Direction::Close };
                        ctx.submit(remote(direction, target));
                    }
                    Step::Stop => {
                        ctx.request_stop(StopReason::Remote);
                        stop_requested = true;
                    }
                    Step::Rotation => {
                        ctx.rotation_edge(now);
                    }
                    Step::Limit(i, active) => board.set_limit(Direction::ALL[i], active),
                    Step::Wait(ms) => now += ms,
                }

                run(&mut c, &ctx, now);
                now += 1;
                let status = c.status();

                if status.is_running() {
                    prop_assert!(status.allow_to_run);
                    prop_assert!(status.intent.owner().is_some());
                    prop_assert!(status.intent.direction().is_some());
                    prop_assert!(board.enabled.get());
                } else {
                    prop_assert_eq!(status.intent, MotorIntent::Idle);
                    prop_assert!(board.released());
                }
                if stop_requested {
                    prop_assert!(!status.is_running());
                    prop_assert!(board.released());
                }
                prop_assert!(!(status.limits.open && status.limits.closed));
            }
        }
    }
}
