// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;
use core::fmt;

use super::model::SharedLayer;

/// Selects stack entries for removal.
///
/// A [`Layer`](Self::Layer) query matches entries that are the same `Rc`; a
/// [`Label`](Self::Label) query matches every entry carrying that label.
pub enum LayerQuery<'a, Src: ?Sized> {
    /// Match by handle identity.
    Layer(&'a SharedLayer<Src>),
    /// Match by label equality.
    Label(&'a str),
}

impl<Src: ?Sized> LayerQuery<'_, Src> {
    /// Returns `true` if `candidate` is selected by this query.
    #[must_use]
    pub fn matches(&self, candidate: &SharedLayer<Src>) -> bool {
        match self {
            Self::Layer(layer) => Rc::ptr_eq(layer, candidate),
            Self::Label(label) => candidate.borrow().label() == *label,
        }
    }
}

impl<'a, Src: ?Sized> From<&'a SharedLayer<Src>> for LayerQuery<'a, Src> {
    fn from(layer: &'a SharedLayer<Src>) -> Self {
        Self::Layer(layer)
    }
}

impl<'a, Src: ?Sized> From<&'a str> for LayerQuery<'a, Src> {
    fn from(label: &'a str) -> Self {
        Self::Label(label)
    }
}

impl<Src: ?Sized> Clone for LayerQuery<'_, Src> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Src: ?Sized> Copy for LayerQuery<'_, Src> {}

impl<Src: ?Sized> fmt::Debug for LayerQuery<'_, Src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layer(layer) => f
                .debug_tuple("Layer")
                .field(&Rc::as_ptr(layer))
                .finish(),
            Self::Label(label) => f.debug_tuple("Label").field(label).finish(),
        }
    }
}
