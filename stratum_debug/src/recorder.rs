// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and appends every event it
//! receives to a `Vec<RecordedEvent>`, in dispatch order. Events are small
//! `Copy` structs, so a recording is cheap to keep around for assertions or
//! post-mortem inspection.

use stratum_core::trace::{
    ChildrenReplacedEvent, ElementUpdateEvent, PassBeginEvent, PassEndEvent, TraceSink, Warning,
    WarningEvent,
};

/// A recorded event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`PassBeginEvent`].
    PassBegin(PassBeginEvent),
    /// A [`PassEndEvent`].
    PassEnd(PassEndEvent),
    /// A [`WarningEvent`].
    Warning(WarningEvent),
    /// An [`ElementUpdateEvent`].
    ElementUpdate(ElementUpdateEvent),
    /// A [`ChildrenReplacedEvent`].
    ChildrenReplaced(ChildrenReplacedEvent),
}

impl RecordedEvent {
    /// Returns the pass the event belongs to.
    #[must_use]
    pub fn pass(&self) -> u64 {
        match self {
            Self::PassBegin(e) => e.pass,
            Self::PassEnd(e) => e.pass,
            Self::Warning(e) => e.pass,
            Self::ElementUpdate(e) => e.pass,
            Self::ChildrenReplaced(e) => e.pass,
        }
    }
}

/// A [`TraceSink`] that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Returns every recorded warning, in order.
    pub fn warnings(&self) -> impl Iterator<Item = Warning> + '_ {
        self.events.iter().filter_map(|e| match e {
            RecordedEvent::Warning(w) => Some(w.warning),
            _ => None,
        })
    }

    /// Returns the events of one pass.
    pub fn pass(&self, pass: u64) -> impl Iterator<Item = &RecordedEvent> + '_ {
        self.events.iter().filter(move |e| e.pass() == pass)
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Consumes the recorder and returns the events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }
}

impl TraceSink for RecorderSink {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.events.push(RecordedEvent::PassBegin(*e));
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        self.events.push(RecordedEvent::PassEnd(*e));
    }

    fn on_warning(&mut self, e: &WarningEvent) {
        self.events.push(RecordedEvent::Warning(*e));
    }

    fn on_element_update(&mut self, e: &ElementUpdateEvent) {
        self.events.push(RecordedEvent::ElementUpdate(*e));
    }

    fn on_children_replaced(&mut self, e: &ChildrenReplacedEvent) {
        self.events.push(RecordedEvent::ChildrenReplaced(*e));
    }
}
