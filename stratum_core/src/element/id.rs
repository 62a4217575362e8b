// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element identity.

use core::fmt;

/// A handle to an element in an [`ElementStore`](super::ElementStore).
///
/// Ids are assigned from a per-store counter that only grows, so they are
/// unique for the lifetime of the store and never reused. Ordering by id is
/// ordering by creation time, which is the tie-break for child ordering.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({})", self.0)
    }
}

/// An opaque handle to the renderer's object for an element.
///
/// Assigned by the renderer via
/// [`Scene::set_render_target`](crate::scene::Scene::set_render_target).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetId(pub u64);
