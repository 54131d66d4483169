// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and Chrome trace export for lamina tick-loop diagnostics.
//!
//! This crate provides [`TraceSink`](lamina_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`chrome::ChromeTraceSink`]: collects Chrome Trace Event Format objects,
//!   read back and written out through a [`chrome::ChromeTrace`] handle.
//! - [`tee::Tee`]: forwards every event to two sinks.

pub mod chrome;
pub mod pretty;
pub mod tee;
