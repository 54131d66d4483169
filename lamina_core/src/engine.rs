// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine: one surface, one layer stack, one tick loop.
//!
//! [`Engine`] owns a [`SurfaceBinding`], a [`LayerStack`] and a [`Scheduler`],
//! and drives them through the host's [`FrameClock`]. Its lifecycle is
//! configure → bind → start/stop:
//!
//! ```rust,ignore
//! let mut engine = Engine::new(clock).with_resolver(resolver);
//! engine.configure(
//!     EngineOptions::new(Target::Selector("#stage".into()))
//!         .layer(background)
//!         .step_start(|offset, now, size| { /* animate */ }),
//! )?;
//! // Host frame callback:
//! engine.on_frame(now);
//! ```
//!
//! Each tick runs the pre-hook, one render pass and the post-hook, then asks
//! the clock for the next frame if the loop is still running.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{BindingError, ConfigError, EngineError};
use crate::layer::{LayerQuery, LayerStack, SharedLayer};
use crate::render::{RenderStats, render_pass};
use crate::scheduler::{FrameClock, Scheduler, SchedulerState, TickOutcome};
use crate::surface::{SelectorResolver, Surface, SurfaceBinding, SurfaceSize, Target};
use crate::time::{Duration, HostTime};
use crate::trace::{
    PhaseBeginEvent, PhaseEndEvent, PhaseKind, StateChangeEvent, TickEvent, TickSummaryBuilder,
    TraceSink, Tracer,
};

/// A per-tick callback: `(offset since previous tick, now, surface size)`.
pub type Hook = Box<dyn FnMut(Duration, HostTime, SurfaceSize)>;

/// Whether [`Engine::configure`] starts the loop unless told otherwise.
pub const DEFAULT_AUTO_START: bool = true;

/// Options accepted by [`Engine::configure`].
///
/// Built from [`Default`] (or [`new`](Self::new)) plus builder calls; every
/// field not set keeps its named default: no target, no layers, no hooks,
/// [`DEFAULT_AUTO_START`].
pub struct EngineOptions<S: Surface> {
    target: Option<Target<S>>,
    layers: Vec<SharedLayer<S::Source>>,
    step_start: Option<Hook>,
    step_end: Option<Hook>,
    auto_start: bool,
}

impl<S: Surface> Default for EngineOptions<S> {
    fn default() -> Self {
        Self {
            target: None,
            layers: Vec::new(),
            step_start: None,
            step_end: None,
            auto_start: DEFAULT_AUTO_START,
        }
    }
}

impl<S: Surface> EngineOptions<S> {
    /// Options with the given target and defaults for everything else.
    #[must_use]
    pub fn new(target: impl Into<Target<S>>) -> Self {
        Self::default().target(target)
    }

    /// Sets the surface (or selector) to bind.
    #[must_use]
    pub fn target(mut self, target: impl Into<Target<S>>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Names the surface to bind by selector.
    #[must_use]
    pub fn selector(self, selector: &str) -> Self {
        self.target(Target::Selector(selector.into()))
    }

    /// Replaces the initial layers.
    #[must_use]
    pub fn layers(mut self, layers: impl IntoIterator<Item = SharedLayer<S::Source>>) -> Self {
        self.layers = layers.into_iter().collect();
        self
    }

    /// Appends one initial layer.
    #[must_use]
    pub fn layer(mut self, layer: SharedLayer<S::Source>) -> Self {
        self.layers.push(layer);
        self
    }

    /// Sets the hook run before each render pass.
    #[must_use]
    pub fn step_start(mut self, hook: impl FnMut(Duration, HostTime, SurfaceSize) + 'static) -> Self {
        self.step_start = Some(Box::new(hook));
        self
    }

    /// Sets the hook run after each render pass.
    #[must_use]
    pub fn step_end(mut self, hook: impl FnMut(Duration, HostTime, SurfaceSize) + 'static) -> Self {
        self.step_end = Some(Box::new(hook));
        self
    }

    /// Whether a successful configure starts the loop.
    #[must_use]
    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }
}

impl<S: Surface> fmt::Debug for EngineOptions<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("target", &self.target)
            .field("layers", &self.layers.len())
            .field("step_start", &self.step_start.is_some())
            .field("step_end", &self.step_end.is_some())
            .field("auto_start", &self.auto_start)
            .finish()
    }
}

/// Layered rendering loop over one surface.
pub struct Engine<S: Surface, C> {
    clock: C,
    binding: Option<SurfaceBinding<S>>,
    layers: LayerStack<S::Source>,
    scheduler: Scheduler,
    step_start: Option<Hook>,
    step_end: Option<Hook>,
    resolver: Option<Box<dyn SelectorResolver<S>>>,
    trace: Option<Box<dyn TraceSink>>,
    created_at: Option<HostTime>,
}

impl<S: Surface, C: FrameClock> Engine<S, C> {
    /// Creates an unconfigured engine on `clock`.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            binding: None,
            layers: LayerStack::new(),
            scheduler: Scheduler::new(),
            step_start: None,
            step_end: None,
            resolver: None,
            trace: None,
            created_at: None,
        }
    }

    /// Installs the resolver used for selector targets.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl SelectorResolver<S> + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Replaces the resolver used for selector targets.
    pub fn set_resolver(&mut self, resolver: impl SelectorResolver<S> + 'static) {
        self.resolver = Some(Box::new(resolver));
    }

    /// Routes tick-loop trace events to `sink`.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace = Some(sink);
    }

    /// Removes and returns the trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.trace.take()
    }

    // -- Configuration ----------------------------------------------------

    /// Applies `options`: binds the target, replaces layers and hooks, and
    /// starts the loop if `auto_start` is set.
    ///
    /// If the target is missing or cannot be bound nothing changes.
    pub fn configure(&mut self, options: EngineOptions<S>) -> Result<(), EngineError> {
        let EngineOptions {
            target,
            layers,
            step_start,
            step_end,
            auto_start,
        } = options;

        let target = match target {
            None => return Err(config_failed(ConfigError::MissingTarget)),
            Some(Target::Selector(s)) if s.is_empty() => {
                return Err(config_failed(ConfigError::EmptySelector));
            }
            Some(target) => target,
        };
        self.bind_target(target)?;

        self.created_at = Some(self.clock.now());
        self.layers.reset(layers);
        self.step_start = step_start;
        self.step_end = step_end;
        log::debug!(
            "engine configured with {} layer(s), auto_start={auto_start}",
            self.layers.len()
        );

        if auto_start {
            self.start()?;
        }
        Ok(())
    }

    /// Binds `target` as the drawing surface at its natural size.
    ///
    /// On failure any previous binding stays in place.
    pub fn bind_target(&mut self, target: impl Into<Target<S>>) -> Result<SurfaceSize, EngineError> {
        let surface = match target.into() {
            Target::Surface(surface) => surface,
            Target::Selector(selector) => self.resolve(selector)?,
        };
        let binding = SurfaceBinding::new(surface);
        let size = binding.size();
        self.binding = Some(binding);
        log::debug!("bound surface at {}x{}", size.width, size.height);
        Ok(size)
    }

    fn resolve(&self, selector: String) -> Result<S, EngineError> {
        let result = match &self.resolver {
            None => Err(BindingError::NoResolver(selector)),
            Some(_) if selector.is_empty() => Err(BindingError::NotFound(selector)),
            Some(resolver) => resolver.resolve(&selector),
        };
        result.map_err(|e| {
            log::error!("cannot bind target: {e}");
            EngineError::Binding(e)
        })
    }

    /// Resizes the bound surface. A missing dimension falls back to the
    /// surface's current natural size.
    pub fn set_size(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<SurfaceSize, EngineError> {
        let Some(binding) = self.binding.as_mut() else {
            log::error!("cannot resize: {}", EngineError::Unbound);
            return Err(EngineError::Unbound);
        };
        Ok(binding.resize(width, height))
    }

    /// The bound surface.
    #[must_use]
    pub fn target(&self) -> Option<&S> {
        self.binding.as_ref().map(SurfaceBinding::surface)
    }

    /// The bound surface, mutably.
    pub fn target_mut(&mut self) -> Option<&mut S> {
        self.binding.as_mut().map(SurfaceBinding::surface_mut)
    }

    /// Dimensions captured for the bound surface.
    #[must_use]
    pub fn surface_size(&self) -> Option<SurfaceSize> {
        self.binding.as_ref().map(SurfaceBinding::size)
    }

    /// Replaces the pre-render hook.
    pub fn set_step_start(&mut self, hook: impl FnMut(Duration, HostTime, SurfaceSize) + 'static) {
        self.step_start = Some(Box::new(hook));
    }

    /// Replaces the post-render hook.
    pub fn set_step_end(&mut self, hook: impl FnMut(Duration, HostTime, SurfaceSize) + 'static) {
        self.step_end = Some(Box::new(hook));
    }

    /// Removes both hooks.
    pub fn clear_hooks(&mut self) {
        self.step_start = None;
        self.step_end = None;
    }

    // -- Layers -------------------------------------------------------------

    /// The layer stack.
    #[must_use]
    pub fn layers(&self) -> &LayerStack<S::Source> {
        &self.layers
    }

    /// Clears the stack and appends each of `layers`; invalid entries are
    /// reported and skipped. Returns the new length.
    pub fn reset_layers(&mut self, layers: impl IntoIterator<Item = SharedLayer<S::Source>>) -> usize {
        self.layers.reset(layers)
    }

    /// Appends a layer on top and returns the new length.
    pub fn add_layer(&mut self, layer: SharedLayer<S::Source>) -> Result<usize, EngineError> {
        Ok(self.layers.push(layer)?)
    }

    /// Removes every layer matching `query` (a handle or a label) and returns
    /// the new length.
    pub fn remove_layer<'q>(
        &mut self,
        query: impl Into<LayerQuery<'q, S::Source>>,
    ) -> Result<usize, EngineError>
    where
        S::Source: 'q,
    {
        Ok(self.layers.remove(query)?)
    }

    // -- Rendering and scheduling ------------------------------------------

    /// Runs one render pass on the bound surface. Does nothing when unbound.
    pub fn render(&mut self) {
        let frame_index = self.scheduler.frame_index();
        let Some(binding) = self.binding.as_mut() else {
            log::debug!("render skipped: no surface bound");
            return;
        };
        let size = binding.size();
        render_pass(
            binding.surface_mut(),
            size,
            &self.layers,
            frame_index,
            &mut tracer(&mut self.trace),
        );
    }

    /// Starts the loop and runs the first tick immediately.
    ///
    /// Starting a running loop does nothing, unless a hook panicked during
    /// the last tick and the host caught it. The loop is then restarted.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.binding.is_none() {
            log::error!("cannot start: {}", EngineError::Unbound);
            return Err(EngineError::Unbound);
        }
        let now = self.clock.now();
        let from = self.scheduler.state();
        if !self.scheduler.start(now) {
            return Ok(());
        }
        if from == SchedulerState::Running {
            log::warn!("restarting loop after an interrupted tick at {now:?}");
        } else {
            tracer(&mut self.trace).state_change(&StateChangeEvent {
                from,
                to: SchedulerState::Running,
                at: now,
            });
            log::debug!("loop started at {now:?}");
        }
        self.tick(now);
        Ok(())
    }

    /// Stops requesting frames. A frame already requested still ticks once.
    pub fn stop(&mut self) {
        if self.scheduler.stop() {
            let now = self.clock.now();
            tracer(&mut self.trace).state_change(&StateChangeEvent {
                from: SchedulerState::Running,
                to: SchedulerState::Stopped,
                at: now,
            });
            log::debug!("loop stopped at {now:?}");
        }
    }

    /// Host frame callback: delivers the requested frame at `now` and ticks.
    pub fn on_frame(&mut self, now: HostTime) -> TickOutcome {
        if !self.scheduler.frame_fired() {
            log::trace!("frame delivered without an outstanding request");
        }
        self.tick(now)
    }

    fn tick(&mut self, now: HostTime) -> TickOutcome {
        let Some(binding) = self.binding.as_mut() else {
            log::warn!("tick skipped: no surface bound");
            return TickOutcome::Halted;
        };
        let size = binding.size();
        let tick = self.scheduler.begin_tick(now);

        let mut timer = PhaseTimer::new(&self.clock, &mut self.trace, &tick);

        if let Some(hook) = self.step_start.as_mut() {
            timer.begin(PhaseKind::StepStart);
            hook(tick.offset, now, size);
            timer.end(PhaseKind::StepStart);
        }

        timer.begin(PhaseKind::Render);
        let stats = render_pass(
            binding.surface_mut(),
            size,
            &self.layers,
            tick.frame_index,
            &mut timer.tracer(),
        );
        timer.end(PhaseKind::Render);

        if let Some(hook) = self.step_end.as_mut() {
            timer.begin(PhaseKind::StepEnd);
            hook(tick.offset, now, size);
            timer.end(PhaseKind::StepEnd);
        }

        let outcome = self.scheduler.end_tick(now);
        timer.finish(stats, outcome);

        if outcome == TickOutcome::Rescheduled {
            self.clock.request_frame();
        }
        outcome
    }

    // -- State --------------------------------------------------------------

    /// Scheduler state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Returns `true` while the loop requests frames.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// When the engine was last successfully configured.
    #[must_use]
    pub fn created_at(&self) -> Option<HostTime> {
        self.created_at
    }

    /// When the loop was last started.
    #[must_use]
    pub fn started_at(&self) -> Option<HostTime> {
        self.scheduler.started_at()
    }

    /// When the last tick ran.
    #[must_use]
    pub fn last_tick(&self) -> Option<HostTime> {
        self.scheduler.last_tick()
    }

    /// Number of completed ticks.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.scheduler.frame_index()
    }

    /// The frame clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The frame clock, mutably.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

impl<S: Surface, C> fmt::Debug for Engine<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("bound", &self.binding.as_ref().map(SurfaceBinding::size))
            .field("layers", &self.layers)
            .field("scheduler", &self.scheduler)
            .field("step_start", &self.step_start.is_some())
            .field("step_end", &self.step_end.is_some())
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

fn config_failed(e: ConfigError) -> EngineError {
    log::error!("cannot configure engine: {e}");
    EngineError::Config(e)
}

fn tracer(sink: &mut Option<Box<dyn TraceSink>>) -> Tracer<'_> {
    match sink {
        Some(s) => {
            let s: &mut dyn TraceSink = s.as_mut();
            Tracer::new(Some(s))
        }
        None => Tracer::none(),
    }
}

/// Emits phase events for one tick and accumulates its summary.
struct PhaseTimer<'a, C> {
    clock: &'a C,
    sink: &'a mut Option<Box<dyn TraceSink>>,
    frame_index: u64,
    summary: TickSummaryBuilder,
}

impl<'a, C: FrameClock> PhaseTimer<'a, C> {
    fn new(clock: &'a C, sink: &'a mut Option<Box<dyn TraceSink>>, tick: &TickEvent) -> Self {
        tracer(sink).tick(tick);
        Self {
            clock,
            sink,
            frame_index: tick.frame_index,
            summary: TickSummaryBuilder::new(tick),
        }
    }

    fn tracer(&mut self) -> Tracer<'_> {
        tracer(self.sink)
    }

    fn begin(&mut self, phase: PhaseKind) {
        let timestamp = self.clock.now();
        self.summary.phase_begin(phase, timestamp);
        tracer(self.sink).phase_begin(&PhaseBeginEvent {
            frame_index: self.frame_index,
            phase,
            timestamp,
        });
    }

    fn end(&mut self, phase: PhaseKind) {
        let timestamp = self.clock.now();
        self.summary.phase_end(phase, timestamp);
        tracer(self.sink).phase_end(&PhaseEndEvent {
            frame_index: self.frame_index,
            phase,
            timestamp,
        });
    }

    fn finish(mut self, stats: RenderStats, outcome: TickOutcome) {
        self.summary.set_layer_counts(stats.drawn, stats.skipped);
        let summary = self.summary.finish(outcome == TickOutcome::Rescheduled);
        tracer(self.sink).tick_summary(&summary);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};

    use kurbo::Point;

    use super::*;
    use crate::error::LayerError;
    use crate::harness::{DrawCommand, ManualClock, RecordingSurface};
    use crate::layer::Layer;

    type TestSurface = RecordingSurface<&'static str>;
    type TestEngine = Engine<TestSurface, ManualClock>;

    const FRAME: Duration = Duration(16_667);

    fn canvas() -> TestSurface {
        RecordingSurface::new(SurfaceSize::new(800, 600))
    }

    fn engine() -> TestEngine {
        Engine::new(ManualClock::new(HostTime(1_000)))
    }

    fn layer(label: &str, source: &'static str) -> SharedLayer<&'static str> {
        Layer::new(label).with_source(Rc::new(source)).into_shared()
    }

    /// Advances the clock one frame and delivers it if one was requested.
    fn pump(engine: &mut TestEngine) -> Option<TickOutcome> {
        engine.clock_mut().advance(FRAME);
        if engine.clock_mut().take_request() {
            let now = engine.clock().now();
            Some(engine.on_frame(now))
        } else {
            None
        }
    }

    type CallLog = Rc<RefCell<Vec<(&'static str, Duration, HostTime, SurfaceSize)>>>;

    fn logging_hook(
        log: &CallLog,
        name: &'static str,
    ) -> impl FnMut(Duration, HostTime, SurfaceSize) + 'static {
        let log = Rc::clone(log);
        move |offset, now, size| log.borrow_mut().push((name, offset, now, size))
    }

    #[test]
    fn configure_without_target_fails_and_stays_unbound() {
        let mut engine = engine();
        let result = engine.configure(EngineOptions::default().layer(layer("bg", "a")));

        assert_eq!(
            result,
            Err(EngineError::Config(ConfigError::MissingTarget))
        );
        assert!(engine.target().is_none());
        assert!(engine.layers().is_empty(), "layers not applied");
        assert_eq!(engine.created_at(), None);
        assert_eq!(engine.state(), SchedulerState::Idle);
    }

    #[test]
    fn configure_with_empty_selector_fails() {
        let mut engine =
            engine().with_resolver(|_: &str| -> Result<TestSurface, BindingError> { Ok(canvas()) });
        let result = engine.configure(EngineOptions::default().selector(""));
        assert_eq!(
            result,
            Err(EngineError::Config(ConfigError::EmptySelector))
        );
        assert!(engine.target().is_none());
    }

    #[test]
    fn direct_render_without_autostart() {
        let mut engine = engine();
        engine
            .configure(
                EngineOptions::new(canvas())
                    .layers([layer("bg", "imgA")])
                    .auto_start(false),
            )
            .unwrap();
        assert_eq!(engine.surface_size(), Some(SurfaceSize::new(800, 600)));
        assert_eq!(engine.created_at(), Some(HostTime(1_000)));

        engine.render();

        let surface = engine.target().unwrap();
        let draws: Vec<_> = surface.draws().map(|(s, at, a)| (*s, at, a)).collect();
        assert_eq!(draws, [("imgA", Point::ORIGIN, 1.0)]);
        assert_eq!(surface.global_alpha(), 1.0);
        assert_eq!(engine.clock().total_requests(), 0, "nothing scheduled");
        assert_eq!(engine.state(), SchedulerState::Idle);
        assert_eq!(engine.frame_index(), 0);
    }

    #[test]
    fn render_on_unbound_engine_is_a_no_op() {
        let mut engine = engine();
        engine.render();
        assert!(engine.target().is_none());
    }

    #[test]
    fn auto_start_ticks_immediately_with_zero_offset() {
        let calls = CallLog::default();
        let mut engine = engine();
        engine
            .configure(
                EngineOptions::new(canvas())
                    .step_start(logging_hook(&calls, "start"))
                    .step_end(logging_hook(&calls, "end")),
            )
            .unwrap();

        assert!(engine.is_running());
        assert_eq!(engine.started_at(), Some(HostTime(1_000)));
        assert_eq!(engine.frame_index(), 1, "first tick ran synchronously");
        assert_eq!(engine.clock().pending_requests(), 1);

        let size = SurfaceSize::new(800, 600);
        assert_eq!(
            *calls.borrow(),
            [
                ("start", Duration::ZERO, HostTime(1_000), size),
                ("end", Duration::ZERO, HostTime(1_000), size),
            ]
        );
    }

    #[test]
    fn hooks_bracket_the_render_pass() {
        let mut engine = engine();
        engine
            .configure(EngineOptions::new(canvas()).auto_start(false))
            .unwrap();

        let order = Rc::new(RefCell::new(Vec::new()));
        let pre = Rc::clone(&order);
        let post = Rc::clone(&order);
        engine.set_step_start(move |_, now, _| pre.borrow_mut().push(("pre", now)));
        engine.set_step_end(move |_, now, _| post.borrow_mut().push(("post", now)));

        engine.start().unwrap();
        pump(&mut engine);

        let t0 = HostTime(1_000);
        let t1 = t0 + FRAME;
        assert_eq!(
            *order.borrow(),
            [("pre", t0), ("post", t0), ("pre", t1), ("post", t1)]
        );
        let clears = engine
            .target()
            .unwrap()
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Clear(_)))
            .count();
        assert_eq!(clears, 2, "one render pass per tick");
    }

    #[test]
    fn offsets_track_time_between_ticks() {
        let calls = CallLog::default();
        let mut engine = engine();
        engine
            .configure(EngineOptions::new(canvas()).step_start(logging_hook(&calls, "s")))
            .unwrap();

        pump(&mut engine);
        engine.clock_mut().advance(Duration(5_000));
        pump(&mut engine);

        let offsets: Vec<_> = calls.borrow().iter().map(|c| c.1).collect();
        assert_eq!(offsets, [Duration::ZERO, FRAME, Duration(FRAME.0 + 5_000)]);
        assert_eq!(engine.last_tick(), Some(HostTime(1_000 + 2 * FRAME.0 + 5_000)));
    }

    #[test]
    fn clock_stepping_back_gives_zero_offset() {
        let calls = CallLog::default();
        let mut engine = engine();
        engine
            .configure(EngineOptions::new(canvas()).step_start(logging_hook(&calls, "s")))
            .unwrap();

        engine.clock_mut().set(HostTime(400));
        assert!(engine.clock_mut().take_request());
        assert_eq!(engine.on_frame(HostTime(400)), TickOutcome::Rescheduled);

        let last = calls.borrow().last().copied().map(|c| (c.1, c.2));
        assert_eq!(last, Some((Duration::ZERO, HostTime(400))));
        assert_eq!(engine.last_tick(), Some(HostTime(400)));
    }

    #[test]
    fn stop_allows_exactly_one_more_tick() {
        let calls = CallLog::default();
        let mut engine = engine();
        engine
            .configure(EngineOptions::new(canvas()).step_end(logging_hook(&calls, "end")))
            .unwrap();
        assert_eq!(pump(&mut engine), Some(TickOutcome::Rescheduled));

        engine.stop();
        assert_eq!(engine.state(), SchedulerState::Stopped);

        // The frame requested before stop() still runs, fully.
        assert_eq!(pump(&mut engine), Some(TickOutcome::Halted));
        assert_eq!(calls.borrow().len(), 3);

        // Nothing further is ever delivered.
        for _ in 0..5 {
            assert_eq!(pump(&mut engine), None);
        }
        assert_eq!(calls.borrow().len(), 3);
        assert_eq!(engine.clock().total_requests(), 2);
    }

    #[test]
    fn restart_resumes_with_fresh_baseline() {
        let calls = CallLog::default();
        let mut engine = engine();
        engine
            .configure(EngineOptions::new(canvas()).step_start(logging_hook(&calls, "s")))
            .unwrap();
        engine.stop();
        pump(&mut engine);
        assert_eq!(pump(&mut engine), None);

        engine.clock_mut().advance(Duration(1_000_000));
        engine.start().unwrap();
        assert!(engine.is_running());

        let last = *calls.borrow().last().unwrap();
        assert_eq!(last.1, Duration::ZERO, "offset measured from restart");
        assert_eq!(pump(&mut engine), Some(TickOutcome::Rescheduled));
    }

    #[test]
    fn restart_before_in_flight_frame_keeps_one_chain() {
        let mut engine = engine();
        engine.configure(EngineOptions::new(canvas())).unwrap();
        engine.stop();
        engine.start().unwrap();

        assert_eq!(engine.clock().pending_requests(), 1);
        assert_eq!(pump(&mut engine), Some(TickOutcome::Rescheduled));
        assert_eq!(engine.clock().pending_requests(), 1);
    }

    #[test]
    fn start_requires_binding() {
        let mut engine = engine();
        assert_eq!(engine.start(), Err(EngineError::Unbound));
        assert_eq!(engine.state(), SchedulerState::Idle);
    }

    #[test]
    fn start_while_running_does_not_tick_again() {
        let mut engine = engine();
        engine.configure(EngineOptions::new(canvas())).unwrap();
        engine.start().unwrap();
        assert_eq!(engine.frame_index(), 1);
        assert_eq!(engine.clock().total_requests(), 1);
    }

    #[test]
    fn selector_targets_resolve_through_resolver() {
        let mut engine = engine().with_resolver(|sel: &str| -> Result<TestSurface, BindingError> {
            match sel {
                "#stage" => Ok(RecordingSurface::new(SurfaceSize::new(320, 200))),
                "#div" => Err(BindingError::NotASurface(sel.into())),
                _ => Err(BindingError::NotFound(sel.into())),
            }
        });
        engine
            .configure(EngineOptions::default().selector("#stage").auto_start(false))
            .unwrap();
        assert_eq!(engine.surface_size(), Some(SurfaceSize::new(320, 200)));

        let err = engine.bind_target(Target::Selector("#div".into()));
        assert_eq!(
            err,
            Err(EngineError::Binding(BindingError::NotASurface("#div".into())))
        );
        assert_eq!(
            engine.surface_size(),
            Some(SurfaceSize::new(320, 200)),
            "previous binding kept"
        );
    }

    #[test]
    fn selector_without_resolver_fails() {
        let mut engine = engine();
        let err = engine.configure(EngineOptions::default().selector("#stage"));
        assert_eq!(
            err,
            Err(EngineError::Binding(BindingError::NoResolver("#stage".into())))
        );
        assert!(engine.target().is_none());
    }

    #[test]
    fn failed_reconfigure_keeps_previous_setup() {
        let mut engine = engine();
        engine
            .configure(
                EngineOptions::new(canvas())
                    .layer(layer("bg", "a"))
                    .auto_start(false),
            )
            .unwrap();

        let err = engine.configure(EngineOptions::default().selector("#missing"));
        assert!(matches!(err, Err(EngineError::Binding(_))));
        assert_eq!(engine.layers().len(), 1);
        assert!(engine.target().is_some());
    }

    #[test]
    fn set_size_overrides_and_falls_back() {
        let mut engine = engine();
        assert_eq!(engine.set_size(Some(1), Some(1)), Err(EngineError::Unbound));

        engine
            .configure(EngineOptions::new(canvas()).auto_start(false))
            .unwrap();
        assert_eq!(
            engine.set_size(Some(640), None),
            Ok(SurfaceSize::new(640, 600))
        );
        assert_eq!(
            engine.target().unwrap().pixel_size(),
            SurfaceSize::new(640, 600)
        );

        engine.render();
        assert_eq!(
            engine.target().unwrap().commands()[0],
            DrawCommand::Clear(kurbo::Rect::new(0.0, 0.0, 640.0, 600.0))
        );
    }

    #[test]
    fn layer_management_through_engine() {
        let mut engine = engine();
        assert_eq!(engine.add_layer(layer("X", "x1")), Ok(1));
        assert_eq!(engine.add_layer(layer("Y", "y")), Ok(2));
        assert_eq!(engine.add_layer(layer("X", "x2")), Ok(3));

        let bad = Layer::new("bad").with_opacity(7.0).into_shared();
        assert_eq!(
            engine.add_layer(bad),
            Err(EngineError::Layer(LayerError::InvalidOpacity(7.0)))
        );
        assert_eq!(engine.layers().len(), 3);

        assert_eq!(engine.remove_layer("X"), Ok(1));
        assert_eq!(engine.layers().get(0).unwrap().borrow().label(), "Y");
        assert_eq!(
            engine.remove_layer(""),
            Err(EngineError::Layer(LayerError::EmptyLabel))
        );

        assert_eq!(engine.reset_layers(vec![layer("a", "a"), layer("b", "b")]), 2);
    }

    #[test]
    fn hooks_can_animate_shared_layers() {
        let sprite = layer("sprite", "ship");
        let handle = Rc::clone(&sprite);

        let mut engine = engine();
        engine
            .configure(
                EngineOptions::new(canvas())
                    .layer(sprite)
                    .step_start(move |offset, _, _| {
                        let mut layer = handle.borrow_mut();
                        let x = layer.position().x + offset.ticks() as f64 / 1000.0;
                        layer.set_position(Point::new(x, 0.0));
                    }),
            )
            .unwrap();
        engine.target_mut().unwrap().clear_commands();
        pump(&mut engine);

        let origins: Vec<_> = engine.target().unwrap().draws().map(|(_, at, _)| at).collect();
        assert_eq!(origins, [Point::new(16.667, 0.0)]);
    }

    #[test]
    fn unrequested_frame_still_ticks() {
        let mut engine = engine();
        engine
            .configure(EngineOptions::new(canvas()).auto_start(false))
            .unwrap();
        assert_eq!(engine.on_frame(HostTime(2_000)), TickOutcome::Halted);
        assert_eq!(engine.frame_index(), 1);
    }

    #[test]
    #[should_panic(expected = "hook failure")]
    fn hook_panics_propagate() {
        let mut engine = engine();
        engine
            .configure(
                EngineOptions::new(canvas())
                    .auto_start(false)
                    .step_start(|_, _, _| panic!("hook failure")),
            )
            .unwrap();
        let _ = engine.start();
    }

    #[test]
    fn start_recovers_after_a_hook_panic() {
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let fail = Rc::new(Cell::new(false));
        let hook_fail = Rc::clone(&fail);
        let mut engine = engine();
        engine
            .configure(
                EngineOptions::new(canvas())
                    .layer(layer("bg", "a"))
                    .step_end(move |_, _, _| assert!(!hook_fail.get(), "hook failure")),
            )
            .unwrap();
        assert_eq!(engine.frame_index(), 1);

        fail.set(true);
        let unwound = catch_unwind(AssertUnwindSafe(|| pump(&mut engine)));
        assert!(unwound.is_err());
        assert!(engine.is_running());
        assert_eq!(engine.frame_index(), 1, "interrupted tick did not complete");
        assert_eq!(engine.clock().pending_requests(), 0, "chain is broken");

        fail.set(false);
        engine.start().unwrap();
        assert_eq!(engine.frame_index(), 2);
        assert_eq!(engine.started_at(), Some(engine.clock().now()));
        assert_eq!(engine.clock().pending_requests(), 1);
        assert_eq!(pump(&mut engine), Some(TickOutcome::Rescheduled));

        // Back to normal: a second start is a no-op again.
        engine.start().unwrap();
        assert_eq!(engine.frame_index(), 3);
        assert_eq!(engine.clock().pending_requests(), 1);
    }
}
