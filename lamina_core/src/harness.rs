// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic stand-ins for the host: a hand-driven frame clock and a
//! surface that records draw calls instead of producing pixels.
//!
//! Both are used by the crate's own tests and by headless demos. A typical
//! headless loop:
//!
//! ```rust,ignore
//! engine.start()?;
//! for _ in 0..60 {
//!     engine.clock_mut().advance(Duration(16_667));
//!     if engine.clock_mut().take_request() {
//!         let now = engine.clock().now();
//!         engine.on_frame(now);
//!     }
//! }
//! ```

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use crate::scheduler::FrameClock;
use crate::surface::{Surface, SurfaceSize};
use crate::time::{Duration, HostTime};

/// A [`FrameClock`] whose time only moves when told to.
///
/// Frame requests are counted rather than scheduled; the driver polls them
/// with [`take_request`](Self::take_request).
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: HostTime,
    pending: u32,
    total_requests: u64,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    #[must_use]
    pub const fn new(start: HostTime) -> Self {
        Self {
            now: start,
            pending: 0,
            total_requests: 0,
        }
    }

    /// Moves the clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now = self.now + by;
    }

    /// Sets the clock to an absolute time.
    pub fn set(&mut self, now: HostTime) {
        self.now = now;
    }

    /// Consumes one outstanding frame request, returning whether there was one.
    pub fn take_request(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        self.pending -= 1;
        true
    }

    /// Frame requests not yet taken.
    #[must_use]
    pub fn pending_requests(&self) -> u32 {
        self.pending
    }

    /// Frame requests received over the clock's lifetime.
    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> HostTime {
        self.now
    }

    fn request_frame(&mut self) {
        self.pending += 1;
        self.total_requests += 1;
    }
}

/// One recorded surface call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand<Src> {
    /// `clear_rect`.
    Clear(Rect),
    /// `set_global_alpha`.
    SetAlpha(f64),
    /// `draw_image`, with the source cloned.
    Draw {
        /// The drawn source.
        source: Src,
        /// Top-left corner.
        origin: Point,
        /// Global alpha in effect for this draw.
        alpha: f64,
    },
}

/// A [`Surface`] that records every call.
#[derive(Clone, Debug)]
pub struct RecordingSurface<Src> {
    natural: SurfaceSize,
    pixel: SurfaceSize,
    alpha: f64,
    commands: Vec<DrawCommand<Src>>,
}

impl<Src> RecordingSurface<Src> {
    /// Creates a surface reporting `natural` as its natural size.
    #[must_use]
    pub fn new(natural: SurfaceSize) -> Self {
        Self {
            natural,
            pixel: SurfaceSize::default(),
            alpha: 1.0,
            commands: Vec::new(),
        }
    }

    /// Changes the reported natural size, as a host layout change would.
    pub fn set_natural_size(&mut self, natural: SurfaceSize) {
        self.natural = natural;
    }

    /// The last pixel size written by the engine.
    #[must_use]
    pub fn pixel_size(&self) -> SurfaceSize {
        self.pixel
    }

    /// The current global alpha.
    #[must_use]
    pub fn global_alpha(&self) -> f64 {
        self.alpha
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand<Src>] {
        &self.commands
    }

    /// Only the draw calls, as `(source, origin, alpha)`.
    pub fn draws(&self) -> impl Iterator<Item = (&Src, Point, f64)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Draw {
                source,
                origin,
                alpha,
            } => Some((source, *origin, *alpha)),
            _ => None,
        })
    }

    /// Forgets recorded commands.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

impl<Src: Clone> Surface for RecordingSurface<Src> {
    type Source = Src;

    fn natural_size(&self) -> SurfaceSize {
        self.natural
    }

    fn set_pixel_size(&mut self, size: SurfaceSize) {
        self.pixel = size;
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Clear(rect));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
        self.commands.push(DrawCommand::SetAlpha(alpha));
    }

    fn draw_image(&mut self, source: &Src, origin: Point) {
        self.commands.push(DrawCommand::Draw {
            source: source.clone(),
            origin,
            alpha: self.alpha,
        });
    }
}
