// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Space identity.

use core::fmt;

/// Sentinel value indicating "no space" in index fields.
pub(crate) const INVALID: u32 = u32::MAX;

/// A handle to a space in a [`SpaceStore`](super::SpaceStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a space is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpaceId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl SpaceId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpaceId({}@gen{})", self.idx, self.generation)
    }
}
