// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fan-out to two sinks.

use lamina_core::trace::{
    LayerDrawEvent, PhaseBeginEvent, PhaseEndEvent, StateChangeEvent, TickEvent, TickSummary,
    TraceSink,
};

/// Forwards every event to `first`, then `second`.
///
/// Nest `Tee`s to fan out further.
#[derive(Debug, Default)]
pub struct Tee<A, B> {
    /// Receives each event first.
    pub first: A,
    /// Receives each event second.
    pub second: B,
}

impl<A: TraceSink, B: TraceSink> Tee<A, B> {
    /// Combines two sinks.
    #[must_use]
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: TraceSink, B: TraceSink> TraceSink for Tee<A, B> {
    fn on_tick(&mut self, e: &TickEvent) {
        self.first.on_tick(e);
        self.second.on_tick(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.first.on_phase_begin(e);
        self.second.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.first.on_phase_end(e);
        self.second.on_phase_end(e);
    }

    fn on_state_change(&mut self, e: &StateChangeEvent) {
        self.first.on_state_change(e);
        self.second.on_state_change(e);
    }

    fn on_tick_summary(&mut self, s: &TickSummary) {
        self.first.on_tick_summary(s);
        self.second.on_tick_summary(s);
    }

    fn on_layer_draw(&mut self, e: &LayerDrawEvent) {
        self.first.on_layer_draw(e);
        self.second.on_layer_draw(e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chrome::ChromeTraceSink;
    use lamina_core::time::{Duration, HostTime, Timebase};

    #[test]
    fn both_sinks_see_every_event() {
        let (a, trace_a) = ChromeTraceSink::new(Timebase::MICROS);
        let (b, trace_b) = ChromeTraceSink::new(Timebase::MICROS);
        let mut tee = Tee::new(a, b);

        for frame_index in 0..3 {
            tee.on_tick(&TickEvent {
                frame_index,
                now: HostTime(frame_index * 16),
                offset: Duration(16),
            });
        }

        assert_eq!(trace_a.len(), 3);
        assert_eq!(trace_b.events(), trace_a.events());
    }
}
