// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layer data contract.

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;
use core::fmt;

use kurbo::Point;

use crate::error::LayerError;

/// A layer handle shared between the caller and the [`LayerStack`].
///
/// [`LayerStack`]: super::LayerStack
pub type SharedLayer<Src> = Rc<RefCell<Layer<Src>>>;

/// One visual unit in the stack.
///
/// A new layer is active, fully opaque, positioned at the origin and has no
/// source. A layer without a source, with `active == false` or with zero
/// opacity stays in the stack but is skipped when rendering.
pub struct Layer<Src: ?Sized> {
    label: String,
    active: bool,
    opacity: f64,
    position: Point,
    source: Option<Rc<Src>>,
}

impl<Src: ?Sized> Layer<Src> {
    /// Creates a layer with the given label and defaults for everything else.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            active: true,
            opacity: 1.0,
            position: Point::ORIGIN,
            source: None,
        }
    }

    /// Sets the drawable source.
    #[must_use]
    pub fn with_source(mut self, source: Rc<Src>) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Sets the top-left position.
    #[must_use]
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Sets the activity flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Wraps the layer in a [`SharedLayer`] handle.
    #[must_use]
    pub fn into_shared(self) -> SharedLayer<Src> {
        Rc::new(RefCell::new(self))
    }

    /// The layer's label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the layer takes part in rendering.
    #[must_use]
    pub fn active(&self) -> bool {
        self.active
    }

    /// The compositing opacity.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// The top-left position in surface pixels.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// The drawable source, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Src> {
        self.source.as_deref()
    }

    /// Replaces the label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Enables or disables rendering of this layer.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Sets the opacity. Values outside `[0, 1]` are clamped at draw time.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity;
    }

    /// Moves the layer.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Replaces (or clears) the drawable source.
    pub fn set_source(&mut self, source: Option<Rc<Src>>) {
        self.source = source;
    }

    /// Whether the renderer draws this layer in its current state.
    ///
    /// NaN opacity counts as zero.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.active && self.source.is_some() && self.opacity != 0.0 && !self.opacity.is_nan()
    }

    /// Checks the values the stack requires on entry.
    pub(crate) fn validate(&self) -> Result<(), LayerError> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(LayerError::InvalidOpacity(self.opacity));
        }
        if !self.position.is_finite() {
            return Err(LayerError::NonFinitePosition);
        }
        Ok(())
    }
}

impl<Src: ?Sized> Clone for Layer<Src> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            active: self.active,
            opacity: self.opacity,
            position: self.position,
            source: self.source.clone(),
        }
    }
}

impl<Src: ?Sized> fmt::Debug for Layer<Src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("label", &self.label)
            .field("active", &self.active)
            .field("opacity", &self.opacity)
            .field("position", &self.position)
            .field("has_source", &self.source.is_some())
            .finish()
    }
}
