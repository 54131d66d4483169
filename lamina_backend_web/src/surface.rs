// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `<canvas>` 2D drawing surface.

use kurbo::{Point, Rect};
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, HtmlVideoElement,
};

use lamina_core::surface::{Surface, SurfaceSize};

/// Anything `drawImage` accepts that a layer can show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// An `<img>` element.
    Image(HtmlImageElement),
    /// Another `<canvas>`, e.g. an offscreen sprite sheet.
    Canvas(HtmlCanvasElement),
    /// The current frame of a `<video>`.
    Video(HtmlVideoElement),
}

impl From<HtmlImageElement> for ImageSource {
    fn from(img: HtmlImageElement) -> Self {
        Self::Image(img)
    }
}

impl From<HtmlCanvasElement> for ImageSource {
    fn from(canvas: HtmlCanvasElement) -> Self {
        Self::Canvas(canvas)
    }
}

impl From<HtmlVideoElement> for ImageSource {
    fn from(video: HtmlVideoElement) -> Self {
        Self::Video(video)
    }
}

/// A `<canvas>` element with its 2D rendering context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    /// First `drawImage` error since the last [`take_failure`](Self::take_failure).
    failure: Option<JsValue>,
}

impl core::fmt::Debug for CanvasSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CanvasSurface")
            .field("width", &self.canvas.width())
            .field("height", &self.canvas.height())
            .field("failed", &self.failure.is_some())
            .finish_non_exhaustive()
    }
}

impl CanvasSurface {
    /// Wraps `canvas`, acquiring its 2D context.
    ///
    /// Returns `None` if the canvas cannot provide a 2D context (for example
    /// because another context type was already requested).
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let context = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            canvas,
            context,
            failure: None,
        })
    }

    /// The canvas element.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// The 2D context, for drawing done by the host outside the render pass.
    #[must_use]
    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.context
    }

    /// Takes the first draw failure recorded since the last call.
    ///
    /// [`RafDriver`](crate::RafDriver) rethrows it once the engine is no
    /// longer borrowed.
    pub fn take_failure(&mut self) -> Option<JsValue> {
        self.failure.take()
    }
}

impl Surface for CanvasSurface {
    type Source = ImageSource;

    /// The element's laid-out client size.
    fn natural_size(&self) -> SurfaceSize {
        SurfaceSize::new(
            u32::try_from(self.canvas.client_width()).unwrap_or(0),
            u32::try_from(self.canvas.client_height()).unwrap_or(0),
        )
    }

    fn set_pixel_size(&mut self, size: SurfaceSize) {
        self.canvas.set_width(size.width);
        self.canvas.set_height(size.height);
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.context
            .clear_rect(rect.x0, rect.y0, rect.width(), rect.height());
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.context.set_global_alpha(alpha);
    }

    /// Draws `source` with its top-left corner at `origin`.
    ///
    /// A failing `drawImage` (for example a broken image) skips the layer and
    /// is recorded for [`take_failure`](Self::take_failure). Later failures in
    /// the same pass are only logged.
    fn draw_image(&mut self, source: &ImageSource, origin: Point) {
        let result = match source {
            ImageSource::Image(img) => {
                self.context
                    .draw_image_with_html_image_element(img, origin.x, origin.y)
            }
            ImageSource::Canvas(canvas) => {
                self.context
                    .draw_image_with_html_canvas_element(canvas, origin.x, origin.y)
            }
            ImageSource::Video(video) => {
                self.context
                    .draw_image_with_html_video_element(video, origin.x, origin.y)
            }
        };
        if let Err(e) = result {
            log::error!("drawImage failed: {e:?}");
            if self.failure.is_none() {
                self.failure = Some(e);
            }
        }
    }
}
