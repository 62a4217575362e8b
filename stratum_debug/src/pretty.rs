// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use stratum_core::trace::{
    ChildrenReplacedEvent, ElementUpdateEvent, PassBeginEvent, PassEndEvent, TraceSink,
    WarningEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    /// Per-element lines are noisy on large scenes.
    verbose: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            verbose: false,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            verbose: false,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            verbose: false,
        }
    }

    /// Also prints per-element update and child-replacement lines.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let _ = writeln!(self.writer, "[pass:begin] pass={}", e.pass);
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:end] pass={} spaces={} elements={} warnings={}",
            e.pass, e.spaces, e.elements, e.warnings,
        );
    }

    fn on_warning(&mut self, e: &WarningEvent) {
        let _ = writeln!(self.writer, "[warn] pass={} {}", e.pass, e.warning);
    }

    fn on_element_update(&mut self, e: &ElementUpdateEvent) {
        if self.verbose {
            let _ = writeln!(
                self.writer,
                "[element] pass={} {:?} {}",
                e.pass, e.element, e.kind,
            );
        }
    }

    fn on_children_replaced(&mut self, e: &ChildrenReplacedEvent) {
        if self.verbose {
            let _ = writeln!(
                self.writer,
                "[children] pass={} {:?} count={}",
                e.pass, e.parent, e.count,
            );
        }
    }
}
