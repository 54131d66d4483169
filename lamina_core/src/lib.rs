// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer stack, render pass and frame scheduler for a layered 2D rendering
//! loop.
//!
//! `lamina_core` composites an ordered stack of image layers onto a single
//! 2D drawing surface, once per display frame. It is `no_std` compatible
//! (with `alloc`) and knows nothing about any particular host: surfaces and
//! frame clocks are traits that backends implement.
//!
//! # Architecture
//!
//! ```text
//!   FrameClock (host)
//!       │ on_frame(now)
//!       ▼
//!   Scheduler::begin_tick() ──► TickEvent { offset, now }
//!       │
//!       ├──► step_start hook
//!       ├──► render_pass(surface, LayerStack)
//!       ├──► step_end hook
//!       ▼
//!   Scheduler::end_tick() ──► TickOutcome ──► FrameClock::request_frame()
//! ```
//!
//! **[`layer`]**: [`Layer`](layer::Layer) records shared between the stack
//! and the application, and the ordered [`LayerStack`](layer::LayerStack).
//!
//! **[`surface`]**: The [`Surface`](surface::Surface) trait, target
//! resolution and the size captured when a surface is bound.
//!
//! **[`render`]**: One clear-and-composite pass over the stack.
//!
//! **[`scheduler`]**: The Idle/Running/Stopped state machine and the
//! [`FrameClock`](scheduler::FrameClock) trait.
//!
//! **[`engine`]**: [`Engine`](engine::Engine) ties the above together
//! behind configure, bind, start and stop.
//!
//! **[`harness`]**: A manual clock and a recording surface for tests and
//! headless runs.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! tick-loop instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies.
//! - `trace-rich` (disabled by default, implies `trace`): Adds per-layer draw
//!   events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod engine;
pub mod error;
pub mod harness;
pub mod layer;
pub mod render;
pub mod scheduler;
pub mod surface;
pub mod time;
pub mod trace;
