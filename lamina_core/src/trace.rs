// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the tick loop.
//!
//! The engine reports each stage of a tick to a [`TraceSink`]. All sink methods
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. With the `trace` feature
//! **off** every `Tracer` method compiles to nothing; with it **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! [`TickSummaryBuilder`] collects phase timestamps during a tick and produces
//! a [`TickSummary`] at the end.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies.
//! - `trace-rich` (implies `trace`) adds the per-layer [`LayerDrawEvent`].

use crate::scheduler::SchedulerState;
use crate::time::{Duration, HostTime};

#[cfg(feature = "trace-rich")]
use kurbo::Point;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which part of a tick is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// The pre-render hook.
    StepStart,
    /// The render pass.
    Render,
    /// The post-render hook.
    StepEnd,
}

impl PhaseKind {
    /// Short lowercase name for log lines and trace viewers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StepStart => "step_start",
            Self::Render => "render",
            Self::StepEnd => "step_end",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::StepStart => 0,
            Self::Render => 1,
            Self::StepEnd => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a tick begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickEvent {
    /// Monotonic tick counter.
    pub frame_index: u64,
    /// Host time handed to the tick.
    pub now: HostTime,
    /// Time since the previous tick.
    pub offset: Duration,
}

/// Marks the beginning of a tick phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseBeginEvent {
    /// Tick counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Clock reading at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a tick phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseEndEvent {
    /// Tick counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Clock reading at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted when the scheduler changes state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChangeEvent {
    /// Previous state.
    pub from: SchedulerState,
    /// New state.
    pub to: SchedulerState,
    /// Clock reading at the transition.
    pub at: HostTime,
}

/// Emitted for every layer the render pass draws.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerDrawEvent {
    /// Tick counter at the time of the pass.
    pub frame_index: u64,
    /// Position of the layer in the stack.
    pub layer_index: u32,
    /// Alpha used for the draw.
    pub alpha: f64,
    /// Where the source was drawn.
    pub origin: Point,
}

/// Per-tick timing summary produced by [`TickSummaryBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickSummary {
    /// Tick counter.
    pub frame_index: u64,
    /// Host time handed to the tick.
    pub now: HostTime,
    /// Time since the previous tick.
    pub offset: Duration,
    /// Pre-hook duration in ticks (0 if no hook ran).
    pub step_start_ticks: u64,
    /// Render duration in ticks.
    pub render_ticks: u64,
    /// Post-hook duration in ticks (0 if no hook ran).
    pub step_end_ticks: u64,
    /// Layers drawn by the render pass.
    pub drawn: u32,
    /// Layers skipped by the render pass.
    pub skipped: u32,
    /// Whether another frame was requested.
    pub rescheduled: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the tick loop.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called when a tick begins.
    fn on_tick(&mut self, e: &TickEvent) {
        _ = e;
    }

    /// Called at the beginning of a tick phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a tick phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when the scheduler changes state.
    fn on_state_change(&mut self, e: &StateChangeEvent) {
        _ = e;
    }

    /// Called with the per-tick summary.
    fn on_tick_summary(&mut self, s: &TickSummary) {
        _ = s;
    }

    /// Called for each drawn layer (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_layer_draw(&mut self, e: &LayerDrawEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to `sink` if there is one.
    #[inline]
    #[must_use]
    pub fn new(sink: Option<&'a mut dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::new(None)
    }

    /// Emits a [`TickEvent`].
    #[inline]
    pub fn tick(&mut self, e: &TickEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_tick(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`StateChangeEvent`].
    #[inline]
    pub fn state_change(&mut self, e: &StateChangeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_state_change(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TickSummary`].
    #[inline]
    pub fn tick_summary(&mut self, s: &TickSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_tick_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits a [`LayerDrawEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn layer_draw(&mut self, e: &LayerDrawEvent) {
        if let Some(s) = &mut self.sink {
            s.on_layer_draw(e);
        }
    }
}

// ---------------------------------------------------------------------------
// TickSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects phase timestamps during a tick and produces a [`TickSummary`].
#[derive(Debug)]
pub struct TickSummaryBuilder {
    tick: TickEvent,
    phase_starts: [Option<HostTime>; 3],
    phase_ends: [Option<HostTime>; 3],
    drawn: u32,
    skipped: u32,
}

impl TickSummaryBuilder {
    /// Starts a summary for the given tick.
    #[must_use]
    pub fn new(tick: &TickEvent) -> Self {
        Self {
            tick: *tick,
            phase_starts: [None; 3],
            phase_ends: [None; 3],
            drawn: 0,
            skipped: 0,
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_starts[phase.index()] = Some(t);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_ends[phase.index()] = Some(t);
    }

    /// Records render pass counts.
    pub fn set_layer_counts(&mut self, drawn: u32, skipped: u32) {
        self.drawn = drawn;
        self.skipped = skipped;
    }

    /// Consumes the builder.
    #[must_use]
    pub fn finish(self, rescheduled: bool) -> TickSummary {
        TickSummary {
            frame_index: self.tick.frame_index,
            now: self.tick.now,
            offset: self.tick.offset,
            step_start_ticks: self.phase_duration(PhaseKind::StepStart),
            render_ticks: self.phase_duration(PhaseKind::Render),
            step_end_ticks: self.phase_duration(PhaseKind::StepEnd),
            drawn: self.drawn,
            skipped: self.skipped,
            rescheduled,
        }
    }

    fn phase_duration(&self, phase: PhaseKind) -> u64 {
        let idx = phase.index();
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).ticks(),
            _ => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tick() -> TickEvent {
        TickEvent {
            frame_index: 3,
            now: HostTime(50_000),
            offset: Duration(16_667),
        }
    }

    #[test]
    fn summary_builder_computes_durations() {
        let mut builder = TickSummaryBuilder::new(&sample_tick());
        builder.phase_begin(PhaseKind::StepStart, HostTime(50_000));
        builder.phase_end(PhaseKind::StepStart, HostTime(50_010));
        builder.phase_begin(PhaseKind::Render, HostTime(50_010));
        builder.phase_end(PhaseKind::Render, HostTime(50_400));
        builder.set_layer_counts(2, 1);

        let summary = builder.finish(true);
        assert_eq!(summary.step_start_ticks, 10);
        assert_eq!(summary.render_ticks, 390);
        assert_eq!(summary.step_end_ticks, 0, "no post hook recorded");
        assert_eq!((summary.drawn, summary.skipped), (2, 1));
        assert!(summary.rescheduled);
        assert_eq!(summary.offset, Duration(16_667));
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.tick(&sample_tick());
        tracer.state_change(&StateChangeEvent {
            from: SchedulerState::Idle,
            to: SchedulerState::Running,
            at: HostTime(0),
        });
    }

    #[test]
    fn phase_names() {
        assert_eq!(PhaseKind::StepStart.name(), "step_start");
        assert_eq!(PhaseKind::Render.name(), "render");
        assert_eq!(PhaseKind::StepEnd.name(), "step_end");
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct Frames(Vec<u64>);
        impl TraceSink for Frames {
            fn on_tick(&mut self, e: &TickEvent) {
                self.0.push(e.frame_index);
            }
        }

        let mut sink = Frames(Vec::new());
        {
            let mut tracer = Tracer::new(Some(&mut sink));
            tracer.tick(&sample_tick());
        }
        assert_eq!(sink.0, [3]);
    }

    #[test]
    fn noop_sink_accepts_every_event() {
        let mut sink = NoopSink;
        let mut tracer = Tracer::new(Some(&mut sink));
        tracer.tick(&sample_tick());
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: 3,
            phase: PhaseKind::Render,
            timestamp: HostTime(50_000),
        });
        tracer.phase_end(&PhaseEndEvent {
            frame_index: 3,
            phase: PhaseKind::Render,
            timestamp: HostTime(50_100),
        });
        tracer.tick_summary(&TickSummaryBuilder::new(&sample_tick()).finish(false));
    }
}
