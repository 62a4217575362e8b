// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the update pass.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! update pass calls at each stage. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Problems the update pass recovers from are reported as [`Warning`]s. They
//! are dispatched here and also collected in
//! [`SceneChanges::warnings`](crate::scene::SceneChanges::warnings), so they
//! are observable without the `trace` feature.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`ElementUpdateEvent`] and
//!   [`ChildrenReplacedEvent`] plus the corresponding `TraceSink` methods.

use core::fmt;

use crate::edge::EdgeEnd;
use crate::element::ElementId;
use crate::space::SpaceId;

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// A recoverable problem found during an update pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Warning {
    /// An element was updated but has no render target.
    Detached(ElementId),
    /// The root-finder found no boundary crossing at one end of an edge; that
    /// end was left at the shape centre.
    NoCrossing {
        /// The edge.
        edge: ElementId,
        /// Which end.
        end: EdgeEnd,
    },
    /// An edge endpoint is unset, destroyed, or has no outline.
    MissingEndpoint {
        /// The edge.
        edge: ElementId,
        /// Which end.
        end: EdgeEnd,
    },
    /// A space's local transform has zero or non-finite determinant.
    DegenerateSpace(SpaceId),
    /// A dependency was rejected because it would close a cycle.
    DependencyCycle {
        /// The dependent element.
        element: ElementId,
        /// The element it tried to depend on.
        on: ElementId,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached(id) => write!(f, "{id:?} has no render target"),
            Self::NoCrossing { edge, end } => {
                write!(f, "{edge:?}: no boundary crossing at {end:?} end")
            }
            Self::MissingEndpoint { edge, end } => {
                write!(f, "{edge:?}: {end:?} endpoint has no outline")
            }
            Self::DegenerateSpace(id) => write!(f, "{id:?} has a degenerate transform"),
            Self::DependencyCycle { element, on } => {
                write!(f, "{element:?} cannot depend on {on:?}: cycle")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the beginning of an update pass.
#[derive(Clone, Copy, Debug)]
pub struct PassBeginEvent {
    /// Monotonic pass counter, starting at 1.
    pub pass: u64,
}

/// Marks the end of an update pass.
#[derive(Clone, Copy, Debug)]
pub struct PassEndEvent {
    /// Pass counter.
    pub pass: u64,
    /// Spaces whose cached transforms were recomputed.
    pub spaces: usize,
    /// Elements whose geometry was recomputed.
    pub elements: usize,
    /// Warnings raised during the pass.
    pub warnings: usize,
}

/// Emitted for every [`Warning`].
#[derive(Clone, Copy, Debug)]
pub struct WarningEvent {
    /// Pass counter.
    pub pass: u64,
    /// What went wrong.
    pub warning: Warning,
}

/// Emitted after an element's geometry is recomputed.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct ElementUpdateEvent {
    /// Pass counter.
    pub pass: u64,
    /// The element.
    pub element: ElementId,
    /// Kind name, as returned by [`ElementKind::name`](crate::element::ElementKind::name).
    pub kind: &'static str,
}

/// Emitted when an element's rendered children are replaced.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct ChildrenReplacedEvent {
    /// Pass counter.
    pub pass: u64,
    /// The parent element.
    pub parent: ElementId,
    /// Length of the new child list.
    pub count: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the update pass.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the beginning of an update pass.
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        _ = e;
    }

    /// Called at the end of an update pass.
    fn on_pass_end(&mut self, e: &PassEndEvent) {
        _ = e;
    }

    /// Called for every warning.
    fn on_warning(&mut self, e: &WarningEvent) {
        _ = e;
    }

    /// Called per recomputed element (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_element_update(&mut self, e: &ElementUpdateEvent) {
        _ = e;
    }

    /// Called per child list replacement (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_children_replaced(&mut self, e: &ChildrenReplacedEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PassBeginEvent`].
    #[inline]
    pub fn pass_begin(&mut self, e: &PassBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PassEndEvent`].
    #[inline]
    pub fn pass_end(&mut self, e: &PassEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`WarningEvent`].
    #[inline]
    pub fn warning(&mut self, e: &WarningEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_warning(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`ElementUpdateEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn element_update(&mut self, e: &ElementUpdateEvent) {
        if let Some(s) = &mut self.sink {
            s.on_element_update(e);
        }
    }

    /// Emits a [`ChildrenReplacedEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn children_replaced(&mut self, e: &ChildrenReplacedEvent) {
        if let Some(s) = &mut self.sink {
            s.on_children_replaced(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_pass_begin(&PassBeginEvent { pass: 1 });
        sink.on_warning(&WarningEvent {
            pass: 1,
            warning: Warning::Detached(ElementId(0)),
        });
        sink.on_pass_end(&PassEndEvent {
            pass: 1,
            spaces: 0,
            elements: 0,
            warnings: 1,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.pass_begin(&PassBeginEvent { pass: 3 });
        tracer.pass_end(&PassEndEvent {
            pass: 3,
            spaces: 0,
            elements: 0,
            warnings: 0,
        });
    }

    #[test]
    fn warnings_display() {
        let w = Warning::NoCrossing {
            edge: ElementId(4),
            end: EdgeEnd::To,
        };
        assert_eq!(w.to_string(), "ElementId(4): no boundary crossing at To end");
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            warnings: Vec<Warning>,
        }
        impl TraceSink for RecordingSink {
            fn on_warning(&mut self, e: &WarningEvent) {
                self.warnings.push(e.warning);
            }
        }

        let mut sink = RecordingSink {
            warnings: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.warning(&WarningEvent {
            pass: 1,
            warning: Warning::Detached(ElementId(9)),
        });
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.warnings, &[Warning::Detached(ElementId(9))]);
    }
}
