// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` frame clock and driver.
//!
//! [`RafClock`] is the [`FrameClock`] handed to the engine: it reads
//! `performance.now()` and records frame requests. [`RafDriver`] owns the
//! engine and turns each recorded request into one `requestAnimationFrame`
//! registration. Each callback receives a [`DOMHighResTimeStamp`][mdn]
//! (milliseconds), converted to microsecond [`HostTime`] ticks and passed to
//! [`Engine::on_frame`](lamina_core::engine::Engine::on_frame).
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use lamina_core::engine::EngineOptions;
use lamina_core::error::EngineError;
use lamina_core::scheduler::{FrameClock, SchedulerState};
use lamina_core::time::HostTime;

use crate::WebEngine;
use crate::surface::CanvasSurface;

// Direct global bindings instead of `web_sys::Window` methods, so no
// Window/Performance object is fetched (and unwrapped) on every frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

/// Frame clock backed by `performance.now()`.
///
/// Requests are only recorded here; [`RafDriver`] turns them into
/// `requestAnimationFrame` registrations.
#[derive(Debug, Default)]
pub struct RafClock {
    requested: bool,
}

impl RafClock {
    /// Creates a clock with no outstanding request.
    #[must_use]
    pub const fn new() -> Self {
        Self { requested: false }
    }

    /// Consumes the recorded request, returning whether there was one.
    pub fn take_request(&mut self) -> bool {
        core::mem::replace(&mut self.requested, false)
    }

    /// Consumes the recorded request only if no callback is `outstanding`.
    ///
    /// Returns whether a new callback should be registered. A request made
    /// while one is outstanding stays recorded for the next flush.
    pub fn take_request_if_idle(&mut self, outstanding: Option<i32>) -> bool {
        outstanding.is_none() && self.take_request()
    }
}

impl FrameClock for RafClock {
    fn now(&self) -> HostTime {
        crate::now()
    }

    fn request_frame(&mut self) {
        self.requested = true;
    }
}

type RafClosure = Closure<dyn FnMut(f64)>;

/// Runs a [`WebEngine`] on `requestAnimationFrame`.
///
/// All engine access goes through the driver so that frame requests made
/// during the call are registered afterwards. Hooks must not call back into
/// the driver: the engine is already borrowed while they run.
pub struct RafDriver {
    inner: Rc<RafInner>,
}

struct RafInner {
    engine: RefCell<WebEngine>,

    /// The JS closure registered with `requestAnimationFrame`.
    ///
    /// Set once after the `Rc` exists; the closure holds a clone of it, so
    /// the cycle is broken in `Drop`.
    closure: RefCell<Option<RafClosure>>,

    /// The ID of the registered callback, if one is outstanding.
    raf_id: Cell<Option<i32>>,
}

impl RafInner {
    /// Registers a callback if the engine requested a frame and none is
    /// outstanding yet.
    fn flush(&self) {
        let outstanding = self.raf_id.get();
        if !self
            .engine
            .borrow_mut()
            .clock_mut()
            .take_request_if_idle(outstanding)
        {
            return;
        }
        if let Some(ref closure) = *self.closure.borrow() {
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.raf_id.set(Some(id));
        }
    }

    /// Flushes frame requests, or stops the loop and rethrows if the surface
    /// recorded a draw failure. The engine is no longer borrowed when this
    /// throws.
    ///
    /// A stopped loop leaves its frame request recorded on the clock, so the
    /// next successful [`RafDriver::start`] picks the chain up again.
    fn finish(&self) {
        let failure = {
            let mut engine = self.engine.borrow_mut();
            let failure = engine.target_mut().and_then(CanvasSurface::take_failure);
            if failure.is_some() {
                engine.stop();
            }
            failure
        };
        match failure {
            Some(e) => wasm_bindgen::throw_val(e),
            None => self.flush(),
        }
    }
}

impl RafDriver {
    /// Takes ownership of `engine`. Nothing is scheduled until the engine
    /// requests a frame.
    pub fn new(engine: WebEngine) -> Self {
        let inner = Rc::new(RafInner {
            engine: RefCell::new(engine),
            closure: RefCell::new(None),
            raf_id: Cell::new(None),
        });

        let frame_inner = Rc::clone(&inner);
        let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
            frame_inner.raf_id.set(None);
            let now = crate::ms_to_host_time(timestamp_ms);
            frame_inner.engine.borrow_mut().on_frame(now);
            frame_inner.finish();
        }) as Box<dyn FnMut(f64)>);
        *inner.closure.borrow_mut() = Some(closure);

        let driver = Self { inner };
        // The engine may have been started before it was handed over.
        driver.inner.flush();
        driver
    }

    /// Runs `f` on the engine, then registers any frame it requested.
    ///
    /// A `drawImage` failure during `f` stops the loop and is thrown to the
    /// JavaScript caller.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut WebEngine) -> R) -> R {
        let result = f(&mut self.inner.engine.borrow_mut());
        self.inner.finish();
        result
    }

    /// See [`Engine::configure`](lamina_core::engine::Engine::configure).
    pub fn configure(&self, options: EngineOptions<CanvasSurface>) -> Result<(), EngineError> {
        self.with_engine(|engine| engine.configure(options))
    }

    /// See [`Engine::start`](lamina_core::engine::Engine::start).
    pub fn start(&self) -> Result<(), EngineError> {
        self.with_engine(WebEngine::start)
    }

    /// See [`Engine::stop`](lamina_core::engine::Engine::stop). A callback
    /// already registered still ticks once.
    pub fn stop(&self) {
        self.with_engine(WebEngine::stop);
    }

    /// Scheduler state of the driven engine.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.inner.engine.borrow().state()
    }

    /// Returns `true` while the engine requests frames.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.engine.borrow().is_running()
    }
}

impl Drop for RafDriver {
    fn drop(&mut self) {
        if let Some(id) = self.inner.raf_id.take() {
            cancel_animation_frame(id);
        }
        // Drop the JS closure so it doesn't leak.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for RafDriver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafDriver")
            .field("engine", &self.inner.engine)
            .field("raf_id", &self.inner.raf_id.get())
            .finish_non_exhaustive()
    }
}
