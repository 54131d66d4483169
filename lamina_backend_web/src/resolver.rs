// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selector targets resolved against the DOM.

use alloc::string::ToString as _;

use wasm_bindgen::JsCast as _;
use web_sys::{Document, HtmlCanvasElement};

use lamina_core::error::BindingError;
use lamina_core::surface::SelectorResolver;

use crate::surface::CanvasSurface;

/// Resolves selectors with `document.querySelector`.
///
/// Only `<canvas>` elements with a 2D context are accepted.
#[derive(Clone, Debug)]
pub struct DomResolver {
    document: Document,
}

impl DomResolver {
    /// A resolver over the current window's document, if there is one.
    #[must_use]
    pub fn new() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self { document })
    }

    /// A resolver over `document`.
    #[must_use]
    pub fn from_document(document: Document) -> Self {
        Self { document }
    }
}

impl SelectorResolver<CanvasSurface> for DomResolver {
    fn resolve(&self, selector: &str) -> Result<CanvasSurface, BindingError> {
        // A syntactically invalid selector throws; treat it like no match.
        let element = self
            .document
            .query_selector(selector)
            .ok()
            .flatten()
            .ok_or_else(|| BindingError::NotFound(selector.to_string()))?;
        let canvas = element
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| BindingError::NotASurface(selector.to_string()))?;
        CanvasSurface::new(canvas).ok_or_else(|| BindingError::NotASurface(selector.to_string()))
    }
}
