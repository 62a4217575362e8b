// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON snapshots for stratum diagnostics.
//!
//! This crate provides [`TraceSink`](stratum_core::trace::TraceSink)
//! implementations for development and post-mortem analysis, plus a scene
//! dump:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: in-memory event log for tests and playback.
//! - [`snapshot::export`]: writes the element tree and its computed geometry
//!   as JSON.

pub mod pretty;
pub mod recorder;
pub mod snapshot;
