// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render pass: clear, composite visible layers back to front, reset alpha.

use crate::layer::LayerStack;
use crate::surface::{Surface, SurfaceSize};
use crate::trace::Tracer;

/// Counts produced by one [`render_pass`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Layers drawn.
    pub drawn: u32,
    /// Layers skipped (inactive, transparent or without a source).
    pub skipped: u32,
}

/// Redraws `surface` from `layers`.
///
/// The whole `size` rectangle is cleared, then each visible layer is drawn at
/// its position with its opacity as global alpha. Global alpha is always
/// restored to 1 afterwards, so drawing done by the host after the pass is
/// unaffected. Opacities outside `[0, 1]` are clamped.
///
/// # Panics
///
/// Panics if a layer in the stack is mutably borrowed, or if the surface
/// itself panics while drawing a source.
pub fn render_pass<S: Surface>(
    surface: &mut S,
    size: SurfaceSize,
    layers: &LayerStack<S::Source>,
    frame_index: u64,
    tracer: &mut Tracer<'_>,
) -> RenderStats {
    surface.clear_rect(size.to_rect());

    let mut stats = RenderStats::default();
    for (index, entry) in layers.iter().enumerate() {
        let layer = entry.borrow();
        let Some(source) = layer.source().filter(|_| layer.is_visible()) else {
            stats.skipped += 1;
            continue;
        };

        let alpha = layer.opacity().clamp(0.0, 1.0);
        surface.set_global_alpha(alpha);
        surface.draw_image(source, layer.position());
        stats.drawn += 1;

        #[cfg(feature = "trace-rich")]
        tracer.layer_draw(&crate::trace::LayerDrawEvent {
            frame_index,
            layer_index: u32::try_from(index).unwrap_or(u32::MAX),
            alpha,
            origin: layer.position(),
        });
        #[cfg(not(feature = "trace-rich"))]
        {
            _ = index;
        }
    }

    surface.set_global_alpha(1.0);

    #[cfg(not(feature = "trace-rich"))]
    {
        _ = (frame_index, tracer);
    }
    stats
}
