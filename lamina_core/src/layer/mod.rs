// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layers and the ordered layer stack.
//!
//! A *layer* is a positioned, opacity-controlled visual unit that draws one
//! opaque source onto the surface. Each layer has:
//!
//! - A label, used for bulk removal ([`LayerQuery::Label`]).
//! - An activity flag, an opacity in `[0, 1]` and a top-left position.
//! - An optional drawable source, the surface's associated
//!   [`Source`](crate::surface::Surface::Source) type.
//!
//! Layers are shared, not owned: the stack holds [`SharedLayer`] handles and
//! the caller keeps its own clone to animate the layer between ticks. Identity
//! is `Rc` pointer identity.
//!
//! The stack order is the paint order. Later entries draw on top of earlier
//! ones and nothing ever reorders them.

mod model;
mod query;
mod stack;

pub use model::{Layer, SharedLayer};
pub use query::LayerQuery;
pub use stack::LayerStack;
