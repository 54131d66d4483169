// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error kinds for engine configuration, surface binding and layer management.
//!
//! All of these describe expected misuse. The operation that returns one of
//! them leaves the engine exactly as it was, and the failure is also reported
//! through the `log` facade so hosts that ignore return values still see it.

use alloc::string::String;

use thiserror::Error;

/// Invalid or incomplete [`EngineOptions`](crate::engine::EngineOptions).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No target surface or selector was given.
    #[error("the `target` option is required")]
    MissingTarget,
    /// The target selector was an empty string.
    #[error("the `target` selector must not be empty")]
    EmptySelector,
}

/// A target could not be bound as the drawing surface.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BindingError {
    /// A selector target was given but the engine has no resolver.
    #[error("cannot resolve selector `{0}`: no selector resolver installed")]
    NoResolver(String),
    /// The selector did not match anything.
    #[error("selector `{0}` did not match any element")]
    NotFound(String),
    /// The selector matched something that cannot be drawn on.
    #[error("selector `{0}` does not refer to a drawable surface")]
    NotASurface(String),
}

/// A value handed to the layer stack does not satisfy the layer contract.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum LayerError {
    /// Opacity outside `[0, 1]` or NaN.
    #[error("layer opacity {0} is outside [0, 1]")]
    InvalidOpacity(f64),
    /// Position has a NaN or infinite coordinate.
    #[error("layer position must be finite")]
    NonFinitePosition,
    /// Removal by label was requested with an empty label.
    #[error("layer label must not be empty")]
    EmptyLabel,
}

/// Any failure reported by [`Engine`](crate::engine::Engine).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EngineError {
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// See [`BindingError`].
    #[error(transparent)]
    Binding(#[from] BindingError),
    /// See [`LayerError`].
    #[error(transparent)]
    Layer(#[from] LayerError),
    /// The operation needs a bound surface and there is none.
    #[error("no surface is bound")]
    Unbound,
}
