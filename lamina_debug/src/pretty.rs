// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use lamina_core::time::{HostTime, Timebase};
use lamina_core::trace::{
    LayerDrawEvent, PhaseBeginEvent, PhaseEndEvent, StateChangeEvent, TickEvent, TickSummary,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_micros(ticks)
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_tick(&mut self, e: &TickEvent) {
        let _ = writeln!(
            self.writer,
            "[tick] frame={} now={:.1}µs offset={:.1}µs",
            e.frame_index,
            self.host_us(e.now),
            self.ticks_to_us(e.offset.ticks()),
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {:.1}µs",
            e.frame_index,
            e.phase.name(),
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {:.1}µs",
            e.frame_index,
            e.phase.name(),
            self.host_us(e.timestamp),
        );
    }

    fn on_state_change(&mut self, e: &StateChangeEvent) {
        let _ = writeln!(
            self.writer,
            "[state] {:?} -> {:?} at {:.1}µs",
            e.from,
            e.to,
            self.host_us(e.at),
        );
    }

    fn on_tick_summary(&mut self, s: &TickSummary) {
        let next = if s.rescheduled { "requested" } else { "none" };
        let _ = writeln!(
            self.writer,
            "[summary] frame={} start={:.1}µs render={:.1}µs end={:.1}µs \
             drawn={} skipped={} next={next}",
            s.frame_index,
            self.ticks_to_us(s.step_start_ticks),
            self.ticks_to_us(s.render_ticks),
            self.ticks_to_us(s.step_end_ticks),
            s.drawn,
            s.skipped,
        );
    }

    fn on_layer_draw(&mut self, e: &LayerDrawEvent) {
        let _ = writeln!(
            self.writer,
            "[draw] frame={} layer={} alpha={:.3} at ({}, {})",
            e.frame_index, e.layer_index, e.alpha, e.origin.x, e.origin.y,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_core::scheduler::SchedulerState;
    use lamina_core::time::Duration;

    #[test]
    fn pretty_print_tick() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_tick(&TickEvent {
            frame_index: 1,
            now: HostTime(1_000_000),
            offset: Duration(16_000),
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("[tick]"), "got: {output}");
        assert!(output.contains("frame=1"), "got: {output}");
        assert!(output.contains("offset=16.0µs"), "got: {output}");
    }

    #[test]
    fn pretty_print_state_and_summary() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::MICROS);
        sink.on_state_change(&StateChangeEvent {
            from: SchedulerState::Running,
            to: SchedulerState::Stopped,
            at: HostTime(2),
        });
        sink.on_tick_summary(&TickSummary {
            frame_index: 4,
            now: HostTime(2),
            offset: Duration(1),
            step_start_ticks: 0,
            render_ticks: 3,
            step_end_ticks: 0,
            drawn: 2,
            skipped: 1,
            rescheduled: false,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "[state] Running -> Stopped at 2.0µs");
        assert!(lines[1].contains("render=3.0µs"), "got: {output}");
        assert!(lines[1].ends_with("next=none"), "got: {output}");
    }
}
