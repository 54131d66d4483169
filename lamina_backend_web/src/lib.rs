// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for lamina.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`CanvasSurface`]: `<canvas>` 2D context as a drawing surface, drawing
//!   [`ImageSource`]s (images, canvases, videos)
//! - [`DomResolver`]: selector targets via `document.querySelector`
//! - [`RafClock`] and [`RafDriver`]: `requestAnimationFrame` frame clock
//!
//! ```rust,ignore
//! let driver = RafDriver::new(lamina_backend_web::engine());
//! driver.configure(
//!     EngineOptions::default()
//!         .selector("#stage")
//!         .layer(Layer::new("bg").with_source(Rc::new(img.into())).into_shared()),
//! )?;
//! ```

#![no_std]

extern crate alloc;

mod raf;
mod resolver;
mod surface;

pub use raf::{RafClock, RafDriver};
pub use resolver::DomResolver;
pub use surface::{CanvasSurface, ImageSource};

use lamina_core::engine::Engine;
use lamina_core::time::{HostTime, Timebase};

/// An engine drawing on a `<canvas>` and paced by `requestAnimationFrame`.
pub type WebEngine = Engine<CanvasSurface, RafClock>;

/// Creates a [`WebEngine`] that resolves selectors against the current
/// document.
///
/// Outside a window (e.g. in a worker) no resolver is installed and only
/// direct [`CanvasSurface`] targets can be bound.
#[must_use]
pub fn engine() -> WebEngine {
    let engine = Engine::new(RafClock::new());
    match DomResolver::new() {
        Some(resolver) => engine.with_resolver(resolver),
        None => {
            log::warn!("no document available; selector targets cannot be resolved");
            engine
        }
    }
}

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks. Use [`timebase`] to
/// convert to nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    ms_to_host_time(raf::performance_now())
}

/// Returns the web [`Timebase`]: 1 tick = 1 µs = 1000 ns.
///
/// `Timebase { numer: 1000, denom: 1 }` means `nanoseconds = ticks × 1000`.
#[must_use]
pub fn timebase() -> Timebase {
    Timebase::MICROS
}

/// Converts a `DOMHighResTimeStamp` in milliseconds to microsecond ticks.
fn ms_to_host_time(ms: f64) -> HostTime {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "DOMHighResTimeStamp is a small positive f64; µs fits in u64"
    )]
    let us = (ms * 1000.0) as u64;
    HostTime(us)
}
