// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format export.
//!
//! [`ChromeTraceSink`] converts tick-loop events into [Chrome Trace Event
//! Format][format] objects as they arrive. The engine owns the sink, so the
//! events are read through a [`ChromeTrace`] handle that shares the buffer
//! and can [`write`](ChromeTrace::write) it out at any time.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use serde_json::{Value, json};

use lamina_core::time::Timebase;
use lamina_core::trace::{
    LayerDrawEvent, PhaseBeginEvent, PhaseEndEvent, StateChangeEvent, TickEvent, TickSummary,
    TraceSink,
};

type Events = Rc<RefCell<Vec<Value>>>;

/// A [`TraceSink`] that records Chrome trace event objects.
#[derive(Debug)]
pub struct ChromeTraceSink {
    events: Events,
    timebase: Timebase,
}

/// Read side of a [`ChromeTraceSink`].
#[derive(Clone, Debug)]
pub struct ChromeTrace {
    events: Events,
}

impl ChromeTraceSink {
    /// Creates a sink and the handle used to read what it records.
    ///
    /// Timestamps are converted to microseconds using `timebase`.
    #[must_use]
    pub fn new(timebase: Timebase) -> (Self, ChromeTrace) {
        let events = Events::default();
        let handle = ChromeTrace {
            events: Rc::clone(&events),
        };
        (Self { events, timebase }, handle)
    }

    fn push(&self, event: Value) {
        self.events.borrow_mut().push(event);
    }

    fn us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_micros(ticks)
    }
}

impl ChromeTrace {
    /// Number of events recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// A copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<Value> {
        self.events.borrow().clone()
    }

    /// Writes the recorded events as a pretty-printed JSON array, suitable
    /// for loading into `chrome://tracing` or
    /// [Perfetto](https://ui.perfetto.dev/).
    pub fn write(&self, writer: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(writer, &*self.events.borrow())?;
        Ok(())
    }
}

impl TraceSink for ChromeTraceSink {
    fn on_tick(&mut self, e: &TickEvent) {
        self.push(json!({
            "ph": "i",
            "name": "Tick",
            "cat": "Scheduler",
            "ts": self.us(e.now.ticks()),
            "pid": 0,
            "tid": 0,
            "s": "g",
            "args": {
                "frame_index": e.frame_index,
                "offset_us": self.us(e.offset.ticks()),
            }
        }));
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.push(json!({
            "ph": "B",
            "name": e.phase.name(),
            "cat": "Tick",
            "ts": self.us(e.timestamp.ticks()),
            "pid": 0,
            "tid": 0,
            "args": {
                "frame_index": e.frame_index,
            }
        }));
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.push(json!({
            "ph": "E",
            "name": e.phase.name(),
            "cat": "Tick",
            "ts": self.us(e.timestamp.ticks()),
            "pid": 0,
            "tid": 0,
            "args": {
                "frame_index": e.frame_index,
            }
        }));
    }

    fn on_state_change(&mut self, e: &StateChangeEvent) {
        self.push(json!({
            "ph": "i",
            "name": "StateChange",
            "cat": "Scheduler",
            "ts": self.us(e.at.ticks()),
            "pid": 0,
            "tid": 0,
            "s": "g",
            "args": {
                "from": format!("{:?}", e.from),
                "to": format!("{:?}", e.to),
            }
        }));
    }

    fn on_tick_summary(&mut self, s: &TickSummary) {
        self.push(json!({
            "ph": "i",
            "name": "TickSummary",
            "cat": "Summary",
            "ts": self.us(s.now.ticks()),
            "pid": 0,
            "tid": 0,
            "s": "g",
            "args": {
                "frame_index": s.frame_index,
                "step_start_us": self.us(s.step_start_ticks),
                "render_us": self.us(s.render_ticks),
                "step_end_us": self.us(s.step_end_ticks),
                "drawn": s.drawn,
                "skipped": s.skipped,
                "rescheduled": s.rescheduled,
            }
        }));
    }

    fn on_layer_draw(&mut self, e: &LayerDrawEvent) {
        self.push(json!({
            "ph": "i",
            "name": "LayerDraw",
            "cat": "Rich",
            "ts": 0,
            "pid": 0,
            "tid": 0,
            "s": "p",
            "args": {
                "frame_index": e.frame_index,
                "layer_index": e.layer_index,
                "alpha": e.alpha,
                "x": e.origin.x,
                "y": e.origin.y,
            }
        }));
    }
}
