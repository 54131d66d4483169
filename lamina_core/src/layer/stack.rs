// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered layer storage with append, bulk reset and query-based removal.

use alloc::vec::Vec;
use core::fmt;

use crate::error::LayerError;

use super::model::SharedLayer;
use super::query::LayerQuery;

/// Ordered collection of [`SharedLayer`] handles in paint order.
///
/// Every entry passed the layer contract check when it was appended. The stack
/// never sorts or deduplicates; the same handle may appear more than once.
pub struct LayerStack<Src: ?Sized> {
    layers: Vec<SharedLayer<Src>>,
}

impl<Src: ?Sized> Default for LayerStack<Src> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Src: ?Sized> LayerStack<Src> {
    /// Creates an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if the stack has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Returns the entry at `index` (0 is drawn first).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SharedLayer<Src>> {
        self.layers.get(index)
    }

    /// Returns the first entry with the given label.
    #[must_use]
    pub fn find(&self, label: &str) -> Option<&SharedLayer<Src>> {
        self.layers.iter().find(|l| l.borrow().label() == label)
    }

    /// Iterates entries in paint order.
    pub fn iter(&self) -> core::slice::Iter<'_, SharedLayer<Src>> {
        self.layers.iter()
    }

    /// Appends `layer` on top of the stack and returns the new length.
    ///
    /// On a contract violation the stack is left unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the caller holds a mutable borrow of `layer`.
    pub fn push(&mut self, layer: SharedLayer<Src>) -> Result<usize, LayerError> {
        if let Err(e) = layer.borrow().validate() {
            log::error!("rejected layer `{}`: {e}", layer.borrow().label());
            return Err(e);
        }
        self.layers.push(layer);
        Ok(self.layers.len())
    }

    /// Removes every entry selected by `query` and returns the new length.
    ///
    /// All matches are removed, not just the first. An empty label is a
    /// contract violation and removes nothing.
    pub fn remove<'q>(&mut self, query: impl Into<LayerQuery<'q, Src>>) -> Result<usize, LayerError>
    where
        Src: 'q,
    {
        let query = query.into();
        if let LayerQuery::Label(label) = query
            && label.is_empty()
        {
            log::error!("cannot remove layers: {}", LayerError::EmptyLabel);
            return Err(LayerError::EmptyLabel);
        }

        // Back to front so removal never shifts an unvisited entry.
        let mut i = self.layers.len();
        while i > 0 {
            i -= 1;
            if query.matches(&self.layers[i]) {
                self.layers.remove(i);
            }
        }
        Ok(self.layers.len())
    }

    /// Clears the stack, then appends each of `layers` in order.
    ///
    /// Entries that violate the layer contract are reported and skipped.
    /// Returns the resulting length.
    pub fn reset(&mut self, layers: impl IntoIterator<Item = SharedLayer<Src>>) -> usize {
        self.layers.clear();
        for layer in layers {
            // Already logged by `push`.
            let _ = self.push(layer);
        }
        self.layers.len()
    }
}

impl<'a, Src: ?Sized> IntoIterator for &'a LayerStack<Src> {
    type Item = &'a SharedLayer<Src>;
    type IntoIter = core::slice::Iter<'a, SharedLayer<Src>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<Src: ?Sized> fmt::Debug for LayerStack<Src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for layer in &self.layers {
            list.entry(&layer.borrow().label());
        }
        list.finish()
    }
}
