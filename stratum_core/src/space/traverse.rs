// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Space tree traversal.

use super::id::{INVALID, SpaceId};
use super::store::SpaceStore;

/// An iterator over the direct child spaces of a space.
///
/// Created by [`SpaceStore::children`].
#[derive(Debug)]
pub struct SpaceChildren<'a> {
    store: &'a SpaceStore,
    current: u32,
}

impl<'a> SpaceChildren<'a> {
    pub(crate) fn new(store: &'a SpaceStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for SpaceChildren<'_> {
    type Item = SpaceId;

    fn next(&mut self) -> Option<SpaceId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(SpaceId {
            idx,
            generation: self.store.generation[idx as usize],
        })
    }
}
