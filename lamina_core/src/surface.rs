// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing surface contract and surface binding.
//!
//! Backends implement [`Surface`] over their native 2D drawing target (the web
//! backend wraps a `<canvas>` and its 2D context). The engine never queries
//! the surface's size on its own during a frame: dimensions are captured in a
//! [`SurfaceBinding`] when the target is bound or explicitly resized.
//!
//! A target can be handed to the engine directly or named by a selector
//! string. Selectors go through a [`SelectorResolver`], which is the only place
//! a backend decides whether the thing it found is drawable.

use alloc::string::String;
use core::fmt;

use kurbo::{Point, Rect};

use crate::error::BindingError;

/// Integer pixel dimensions of a bound surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceSize {
    /// Creates a size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The full pixel rectangle `(0, 0, width, height)`.
    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// A 2D drawing target.
///
/// The method set is the subset of an immediate-mode 2D context the render
/// pass needs.
pub trait Surface {
    /// Anything this surface can draw at native size.
    type Source: ?Sized;

    /// The size the target currently occupies on the host (e.g. CSS client
    /// size), used when no explicit size is given.
    fn natural_size(&self) -> SurfaceSize;

    /// Sets the backing pixel dimensions.
    fn set_pixel_size(&mut self, size: SurfaceSize);

    /// Clears `rect` to transparent.
    fn clear_rect(&mut self, rect: Rect);

    /// Sets the opacity applied to subsequent draws.
    fn set_global_alpha(&mut self, alpha: f64);

    /// Draws `source` with its top-left corner at `origin`, unscaled.
    fn draw_image(&mut self, source: &Self::Source, origin: Point);
}

/// Maps a selector string to a concrete surface.
pub trait SelectorResolver<S> {
    /// Resolves `selector`, failing if nothing matches or the match is not a
    /// drawable surface.
    fn resolve(&self, selector: &str) -> Result<S, BindingError>;
}

impl<S, F> SelectorResolver<S> for F
where
    F: Fn(&str) -> Result<S, BindingError>,
{
    fn resolve(&self, selector: &str) -> Result<S, BindingError> {
        self(selector)
    }
}

/// What to bind: a surface value or a selector naming one.
pub enum Target<S> {
    /// Bind this surface.
    Surface(S),
    /// Resolve this selector first.
    Selector(String),
}

impl<S> From<S> for Target<S> {
    fn from(surface: S) -> Self {
        Self::Surface(surface)
    }
}

impl<S> fmt::Debug for Target<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surface(_) => f.write_str("Target::Surface(..)"),
            Self::Selector(s) => f.debug_tuple("Target::Selector").field(s).finish(),
        }
    }
}

/// A bound surface together with the dimensions captured for it.
#[derive(Debug)]
pub struct SurfaceBinding<S> {
    surface: S,
    size: SurfaceSize,
}

impl<S: Surface> SurfaceBinding<S> {
    /// Binds `surface` at its natural size and writes that size back as its
    /// pixel size.
    pub fn new(surface: S) -> Self {
        let mut binding = Self {
            surface,
            size: SurfaceSize::default(),
        };
        binding.resize(None, None);
        binding
    }

    /// Resizes the surface. A missing dimension falls back to the surface's
    /// current natural size.
    pub fn resize(&mut self, width: Option<u32>, height: Option<u32>) -> SurfaceSize {
        let natural = self.surface.natural_size();
        let size = SurfaceSize {
            width: width.unwrap_or(natural.width),
            height: height.unwrap_or(natural.height),
        };
        self.surface.set_pixel_size(size);
        self.size = size;
        size
    }

    /// The captured dimensions.
    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// The bound surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The bound surface, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
