// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tick scheduling state machine.
//!
//! The [`Scheduler`] tracks whether the loop is running, when the last tick
//! happened, and whether a frame has been requested from the host's
//! [`FrameClock`] and not yet delivered. It does no work itself: the
//! [`Engine`](crate::engine::Engine) brackets every tick with
//! [`begin_tick`](Scheduler::begin_tick) and [`end_tick`](Scheduler::end_tick)
//! and forwards the reschedule decision to the clock.
//!
//! ```text
//!            start()            stop()
//!   Idle ───────────► Running ─────────► Stopped
//!                        ▲                  │
//!                        └──────────────────┘
//!                             start()
//! ```
//!
//! Stopping only prevents *new* frame requests. A frame already requested
//! still ticks once when the host delivers it, and that tick requests nothing.
//! At most one request is outstanding at any time.
//!
//! A tick that never reached [`end_tick`](Scheduler::end_tick) (a hook
//! panicked and the host caught the unwind) leaves the loop marked running
//! with nothing requested. [`start`](Scheduler::start) recovers from that.

use crate::time::HostTime;
use crate::trace::TickEvent;

/// The host's frame clock.
///
/// `request_frame` asks for one callback at the next frame boundary. The host
/// answers by calling [`Engine::on_frame`](crate::engine::Engine::on_frame)
/// with the time of that boundary.
pub trait FrameClock {
    /// Current time on the frame clock.
    fn now(&self) -> HostTime;

    /// Requests a single future frame callback.
    fn request_frame(&mut self);
}

/// Lifecycle state of the tick loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// Never started.
    #[default]
    Idle,
    /// Ticks request their successor.
    Running,
    /// Stopped; an in-flight frame may still tick once.
    Stopped,
}

/// What the tick loop should do after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickOutcome {
    /// A new frame must be requested from the clock.
    Rescheduled,
    /// Still running, but a frame request is already outstanding.
    AlreadyPending,
    /// Not running; nothing further is requested.
    Halted,
}

/// Tick loop state machine.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    state: SchedulerState,
    started_at: Option<HostTime>,
    last_tick: Option<HostTime>,
    frame_pending: bool,
    in_tick: bool,
    frame_index: u64,
}

impl Scheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
            started_at: None,
            last_tick: None,
            frame_pending: false,
            in_tick: false,
            frame_index: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// Returns `true` in [`SchedulerState::Running`].
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, SchedulerState::Running)
    }

    /// When the loop was last started.
    #[must_use]
    pub const fn started_at(&self) -> Option<HostTime> {
        self.started_at
    }

    /// When the last tick ended.
    #[must_use]
    pub const fn last_tick(&self) -> Option<HostTime> {
        self.last_tick
    }

    /// Number of completed ticks.
    #[must_use]
    pub const fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Whether a frame has been requested and not yet delivered.
    #[must_use]
    pub const fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    /// Whether a tick was opened and not closed.
    ///
    /// Outside of a tick this means the last tick was interrupted.
    #[must_use]
    pub const fn in_tick(&self) -> bool {
        self.in_tick
    }

    /// Enters [`SchedulerState::Running`], resetting the tick baseline to
    /// `now` so the next tick's offset is measured from here.
    ///
    /// Returns `false` (and changes nothing) if already running, unless the
    /// last tick was interrupted, in which case the loop is restarted.
    pub fn start(&mut self, now: HostTime) -> bool {
        if self.is_running() && !self.in_tick {
            return false;
        }
        self.in_tick = false;
        self.state = SchedulerState::Running;
        self.started_at = Some(now);
        self.last_tick = Some(now);
        true
    }

    /// Enters [`SchedulerState::Stopped`].
    ///
    /// Returns `false` if the loop was not running.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = SchedulerState::Stopped;
        true
    }

    /// Records delivery of the outstanding frame request.
    ///
    /// Returns whether a request was outstanding.
    pub fn frame_fired(&mut self) -> bool {
        core::mem::replace(&mut self.frame_pending, false)
    }

    /// Opens a tick at `now` and returns its offset from the previous tick.
    ///
    /// A tick without a previous one has a zero offset.
    #[must_use]
    pub fn begin_tick(&mut self, now: HostTime) -> TickEvent {
        self.in_tick = true;
        let offset = now.saturating_duration_since(self.last_tick.unwrap_or(now));
        TickEvent {
            frame_index: self.frame_index,
            now,
            offset,
        }
    }

    /// Closes the tick opened at `now` and decides whether to reschedule.
    pub fn end_tick(&mut self, now: HostTime) -> TickOutcome {
        self.in_tick = false;
        self.last_tick = Some(now);
        self.frame_index += 1;

        if !self.is_running() {
            TickOutcome::Halted
        } else if self.frame_pending {
            TickOutcome::AlreadyPending
        } else {
            self.frame_pending = true;
            TickOutcome::Rescheduled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Duration;

    #[test]
    fn starts_idle() {
        let sched = Scheduler::new();
        assert_eq!(sched.state(), SchedulerState::Idle);
        assert_eq!(sched.started_at(), None);
        assert!(!sched.frame_pending());
    }

    #[test]
    fn first_tick_after_start_has_zero_offset() {
        let mut sched = Scheduler::new();
        assert!(sched.start(HostTime(5_000)));
        let tick = sched.begin_tick(HostTime(5_000));
        assert_eq!(tick.offset, Duration::ZERO);
        assert_eq!(tick.frame_index, 0);
        assert_eq!(sched.end_tick(HostTime(5_000)), TickOutcome::Rescheduled);
        assert!(sched.frame_pending());
    }

    #[test]
    fn offset_is_time_since_previous_tick() {
        let mut sched = Scheduler::new();
        sched.start(HostTime(0));
        let _ = sched.end_tick(HostTime(0));

        sched.frame_fired();
        let tick = sched.begin_tick(HostTime(16_667));
        assert_eq!(tick.offset, Duration(16_667));
        assert_eq!(tick.frame_index, 1);
        let _ = sched.end_tick(HostTime(16_667));

        sched.frame_fired();
        let tick = sched.begin_tick(HostTime(40_000));
        assert_eq!(tick.offset, Duration(23_333));
    }

    #[test]
    fn stop_lets_pending_tick_finish_without_rescheduling() {
        let mut sched = Scheduler::new();
        sched.start(HostTime(0));
        assert_eq!(sched.end_tick(HostTime(0)), TickOutcome::Rescheduled);

        assert!(sched.stop());
        assert_eq!(sched.state(), SchedulerState::Stopped);

        // The already-requested frame still arrives.
        assert!(sched.frame_fired());
        let _ = sched.begin_tick(HostTime(16));
        assert_eq!(sched.end_tick(HostTime(16)), TickOutcome::Halted);
        assert!(!sched.frame_pending());
    }

    #[test]
    fn restart_while_frame_in_flight_keeps_a_single_request() {
        let mut sched = Scheduler::new();
        sched.start(HostTime(0));
        assert_eq!(sched.end_tick(HostTime(0)), TickOutcome::Rescheduled);
        sched.stop();

        // Restarted before the requested frame arrived.
        assert!(sched.start(HostTime(5)));
        assert_eq!(sched.end_tick(HostTime(5)), TickOutcome::AlreadyPending);

        assert!(sched.frame_fired());
        assert_eq!(sched.end_tick(HostTime(16)), TickOutcome::Rescheduled);
    }

    #[test]
    fn start_while_running_is_a_no_op() {
        let mut sched = Scheduler::new();
        assert!(sched.start(HostTime(10)));
        assert!(!sched.start(HostTime(99)));
        assert_eq!(sched.started_at(), Some(HostTime(10)));
    }

    #[test]
    fn start_recovers_from_an_interrupted_tick() {
        let mut sched = Scheduler::new();
        sched.start(HostTime(0));
        let _ = sched.begin_tick(HostTime(0));
        let _ = sched.end_tick(HostTime(0));

        // The delivered frame's tick unwinds before it is closed.
        sched.frame_fired();
        let _ = sched.begin_tick(HostTime(16));
        assert!(sched.is_running());
        assert!(sched.in_tick());
        assert!(!sched.frame_pending());

        assert!(sched.start(HostTime(40)));
        assert!(!sched.in_tick());
        assert_eq!(sched.started_at(), Some(HostTime(40)));
        let tick = sched.begin_tick(HostTime(40));
        assert_eq!(tick.offset, Duration::ZERO);
        assert_eq!(sched.end_tick(HostTime(40)), TickOutcome::Rescheduled);
        assert!(!sched.start(HostTime(50)), "healthy loop is left alone");
    }

    #[test]
    fn stop_when_idle_is_a_no_op() {
        let mut sched = Scheduler::new();
        assert!(!sched.stop());
        assert_eq!(sched.state(), SchedulerState::Idle);
    }

    #[test]
    fn clock_going_backwards_saturates() {
        let mut sched = Scheduler::new();
        sched.start(HostTime(1_000));
        let tick = sched.begin_tick(HostTime(900));
        assert_eq!(tick.offset, Duration::ZERO);
    }
}
