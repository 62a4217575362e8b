// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays space storage with allocation, topology, and lazy
//! transform caching.

use alloc::vec::Vec;
use core::fmt;

use kurbo::Affine;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use understory_dirty::{CycleHandling, DirtyTracker};

use super::id::{INVALID, SpaceId};
use super::traverse::SpaceChildren;
use crate::dirty;
use crate::value::{Invalidations, Owner, Value};

/// Errors returned by [`SpaceStore::set_parent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpaceError {
    /// A space cannot be its own parent.
    SelfParent(SpaceId),
    /// The requested parent is a descendant of the space.
    Cycle {
        /// The space being re-parented.
        space: SpaceId,
        /// The rejected parent.
        parent: SpaceId,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfParent(space) => write!(f, "{space:?} cannot be its own parent"),
            Self::Cycle { space, parent } => {
                write!(f, "parenting {space:?} under {parent:?} would create a cycle")
            }
        }
    }
}

impl core::error::Error for SpaceError {}

/// Struct-of-arrays storage for all coordinate spaces.
///
/// Spaces are addressed by [`SpaceId`] handles. Slot 0 always holds the
/// world space, which has no parent and cannot be destroyed. Destroyed
/// spaces are recycled via a free list, and generation counters prevent
/// stale handle access.
#[derive(Debug)]
pub struct SpaceStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) local: Vec<Value<Affine>>,

    // -- Cached properties (written by update) --
    pub(crate) parent_to_space: Vec<Affine>,
    pub(crate) local_scale: Vec<f64>,
    pub(crate) space_to_world: Vec<Affine>,
    pub(crate) world_to_space: Vec<Affine>,
    pub(crate) scale_to_world: Vec<f64>,
    pub(crate) dirty: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) graph: DirtyTracker<u32>,
    invalidated: Invalidations,
}

impl Default for SpaceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SpaceStore {
    /// Creates a store holding only the world space.
    #[must_use]
    pub fn new() -> Self {
        let mut store = Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            local: Vec::new(),
            parent_to_space: Vec::new(),
            local_scale: Vec::new(),
            space_to_world: Vec::new(),
            world_to_space: Vec::new(),
            scale_to_world: Vec::new(),
            dirty: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            graph: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            invalidated: Invalidations::new(),
        };
        let world = store.alloc_slot();
        store.mark_dirty_idx(world);
        store
    }

    /// Returns the world space, root of every attached space.
    #[must_use]
    pub fn world(&self) -> SpaceId {
        SpaceId {
            idx: 0,
            generation: self.generation[0],
        }
    }

    // -- Allocation API --

    /// Creates a new space as the last child of `parent`.
    ///
    /// The space starts with an identity local transform.
    pub fn create_space(&mut self, parent: SpaceId) -> SpaceId {
        self.validate(parent);
        let idx = self.alloc_slot();
        let p = parent.idx;

        // A fresh slot has no dependents, so this edge can never close a cycle.
        let _ = self.graph.add_dependency(idx, p, dirty::SPACE);
        self.link_last_child(p, idx);
        self.mark_dirty_idx(idx);

        SpaceId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a space, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, if the space still has children, or if
    /// it is the world space.
    pub fn destroy_space(&mut self, id: SpaceId) {
        self.validate(id);
        let idx = id.idx;
        assert!(idx != 0, "cannot destroy the world space");
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy space with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }
        self.graph.remove_key(idx);

        self.generation[idx as usize] += 1;
        self.dirty[idx as usize] = false;
        self.free_list.push(idx);
    }

    /// Returns whether the given handle refers to a live space.
    #[must_use]
    pub fn is_alive(&self, id: SpaceId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live spaces, the world included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Always `false`: the world space cannot be destroyed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    // -- Topology API --

    /// Moves `id` under `parent`, or detaches it into its own root when
    /// `parent` is `None`.
    ///
    /// The moved space and its descendants are marked dirty.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::SelfParent`] if `parent` is `id`, and
    /// [`SpaceError::Cycle`] if `parent` is a descendant of `id`. The tree is
    /// left unchanged in both cases.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn set_parent(&mut self, id: SpaceId, parent: Option<SpaceId>) -> Result<(), SpaceError> {
        self.validate(id);
        let c = id.idx;
        let new_p = match parent {
            Some(p) => {
                self.validate(p);
                if p.idx == c {
                    return Err(SpaceError::SelfParent(id));
                }
                p.idx
            }
            None => INVALID,
        };

        let old_p = self.parent[c as usize];
        if old_p == new_p {
            return Ok(());
        }

        if old_p != INVALID {
            self.graph.remove_dependency(c, old_p, dirty::SPACE);
        }
        if let Some(p) = parent
            && self.graph.add_dependency(c, p.idx, dirty::SPACE).is_err()
        {
            if old_p != INVALID {
                let _ = self.graph.add_dependency(c, old_p, dirty::SPACE);
            }
            return Err(SpaceError::Cycle { space: id, parent: p });
        }

        if old_p != INVALID {
            self.unlink_from_parent(c);
        }
        if new_p != INVALID {
            self.link_last_child(new_p, c);
        }
        self.mark_dirty_idx(c);
        Ok(())
    }

    /// Returns the parent of a space, if any.
    #[must_use]
    pub fn parent(&self, id: SpaceId) -> Option<SpaceId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.handle(p))
    }

    /// Returns an iterator over the direct children of a space.
    #[must_use]
    pub fn children(&self, id: SpaceId) -> SpaceChildren<'_> {
        self.validate(id);
        SpaceChildren::new(self, self.first_child[id.idx as usize])
    }

    // -- Local transform API (auto-marks dirty) --

    /// Returns the local space-to-parent transform.
    #[must_use]
    pub fn local_transform(&self, id: SpaceId) -> Affine {
        self.validate(id);
        *self.local[id.idx as usize].get()
    }

    /// Sets the local space-to-parent transform.
    ///
    /// Marks the space and its descendants dirty if the transform changed.
    pub fn set_local_transform(&mut self, id: SpaceId, transform: Affine) {
        self.validate(id);
        self.local[id.idx as usize].set(transform, &mut self.invalidated);
        self.apply_invalidations();
    }

    /// Sets the local transform of `id` so that it coincides with `source`.
    ///
    /// After the call, converting between `id` and `source` is the identity
    /// (as long as neither moves). When `source` is a descendant of `id`,
    /// `source` moves along with it and the two no longer coincide.
    pub fn set_from_space(&mut self, id: SpaceId, source: SpaceId) {
        self.validate(id);
        self.validate(source);
        self.update_idx(source.idx);
        let source_world = self.space_to_world[source.idx as usize];

        let p = self.parent[id.idx as usize];
        let parent_inverse = if p == INVALID {
            Affine::IDENTITY
        } else {
            self.update_idx(p);
            self.world_to_space[p as usize]
        };
        self.set_local_transform(id, parent_inverse * source_world);
    }

    // -- Dirty tracking --

    /// Marks a space and all of its descendants dirty.
    pub fn mark_dirty(&mut self, id: SpaceId) {
        self.validate(id);
        self.mark_dirty_idx(id.idx);
    }

    /// Returns whether the cached transforms of a space are stale.
    #[must_use]
    pub fn is_dirty(&self, id: SpaceId) -> bool {
        self.validate(id);
        self.dirty[id.idx as usize]
    }

    /// Recomputes the cached transforms of `id` (and, first, of any dirty
    /// ancestor).
    ///
    /// Returns `false` without doing anything if the space is clean.
    pub fn update(&mut self, id: SpaceId) -> bool {
        self.validate(id);
        self.update_idx(id.idx)
    }

    /// Updates every space invalidated since the previous call, parents
    /// before children.
    ///
    /// Returns the invalidated spaces, including ones a conversion already
    /// refreshed lazily in the meantime.
    pub fn evaluate(&mut self) -> Vec<SpaceId> {
        let affected: Vec<u32> = self
            .graph
            .drain(dirty::SPACE)
            .affected()
            .deterministic()
            .run()
            .collect();

        let mut changed = Vec::with_capacity(affected.len());
        for idx in affected {
            if idx >= self.len || self.free_list.contains(&idx) {
                continue;
            }
            self.update_idx(idx);
            changed.push(self.handle(idx));
        }
        changed
    }

    // -- Cached property getters --
    //
    // These read the cache as-is. They are only valid once the space has
    // been updated (directly, through a conversion, or by `evaluate`).

    /// Returns the cached space-to-world transform.
    #[must_use]
    pub fn space_to_world(&self, id: SpaceId) -> Affine {
        self.validate(id);
        self.space_to_world[id.idx as usize]
    }

    /// Returns the cached world-to-space transform.
    #[must_use]
    pub fn world_to_space(&self, id: SpaceId) -> Affine {
        self.validate(id);
        self.world_to_space[id.idx as usize]
    }

    /// Returns the cached uniform scale of the local transform.
    #[must_use]
    pub fn local_scale(&self, id: SpaceId) -> f64 {
        self.validate(id);
        self.local_scale[id.idx as usize]
    }

    /// Returns the cached product of local scales from this space to world.
    #[must_use]
    pub fn scale_to_world(&self, id: SpaceId) -> f64 {
        self.validate(id);
        self.scale_to_world[id.idx as usize]
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: SpaceId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale SpaceId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn handle(&self, idx: u32) -> SpaceId {
        SpaceId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Takes a slot from the free list or grows the arrays, resetting it to an
    /// unattached identity space.
    fn alloc_slot(&mut self) -> u32 {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.parent_to_space[i] = Affine::IDENTITY;
            self.local_scale[i] = 1.0;
            self.space_to_world[i] = Affine::IDENTITY;
            self.world_to_space[i] = Affine::IDENTITY;
            self.scale_to_world[i] = 1.0;
            self.dirty[i] = false;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.local.push(Value::new(Affine::IDENTITY));
            self.parent_to_space.push(Affine::IDENTITY);
            self.local_scale.push(1.0);
            self.space_to_world.push(Affine::IDENTITY);
            self.world_to_space.push(Affine::IDENTITY);
            self.scale_to_world.push(1.0);
            self.dirty.push(false);
            self.generation.push(0);
            idx
        };
        let owner = Owner::Space(self.handle(idx));
        self.local[idx as usize] = Value::with_owner(Affine::IDENTITY, owner);
        idx
    }

    /// Applies queued owner notifications from local transform values.
    fn apply_invalidations(&mut self) {
        let pending: Vec<Owner> = self.invalidated.drain().collect();
        for owner in pending {
            if let Owner::Space(id) = owner
                && self.is_alive(id)
            {
                self.mark_dirty_idx(id.idx);
            }
        }
    }

    /// Marks `idx` and its descendants dirty.
    ///
    /// Stops at an already dirty space: a dirty space never has a clean
    /// descendant, because updating a space updates its ancestors first.
    /// The walk visits each descendant once, so the graph mark is local.
    pub(crate) fn mark_dirty_idx(&mut self, idx: u32) {
        if self.dirty[idx as usize] {
            return;
        }
        self.dirty[idx as usize] = true;
        self.graph.mark(idx, dirty::SPACE);

        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.mark_dirty_idx(child);
            child = self.next_sibling[child as usize];
        }
    }

    /// Recomputes the cached transforms at `idx`, parent first.
    pub(crate) fn update_idx(&mut self, idx: u32) -> bool {
        let i = idx as usize;
        if !self.dirty[i] {
            return false;
        }

        let local = *self.local[i].get();
        self.parent_to_space[i] = local.inverse();
        self.local_scale[i] = local.determinant().abs().sqrt();

        let p = self.parent[i];
        let (parent_to_world, world_to_parent, parent_scale) = if p == INVALID {
            (Affine::IDENTITY, Affine::IDENTITY, 1.0)
        } else {
            self.update_idx(p);
            let p = p as usize;
            (
                self.space_to_world[p],
                self.world_to_space[p],
                self.scale_to_world[p],
            )
        };

        self.space_to_world[i] = parent_to_world * local;
        self.world_to_space[i] = self.parent_to_space[i] * world_to_parent;
        self.scale_to_world[i] = self.local_scale[i] * parent_scale;

        self.local[i].clear_dirty();
        self.dirty[i] = false;
        true
    }

    /// Appends `c` to the child list of `p` without touching dirty state.
    fn link_last_child(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Point;

    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_affine_near(a: Affine, b: Affine) {
        let (a, b) = (a.as_coeffs(), b.as_coeffs());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < EPS, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn world_exists_and_is_root() {
        let store = SpaceStore::new();
        let world = store.world();
        assert!(store.is_alive(world));
        assert_eq!(store.parent(world), None);
        assert!(store.is_dirty(world));
    }

    #[test]
    fn create_and_destroy() {
        let mut store = SpaceStore::new();
        let id = store.create_space(store.world());
        assert!(store.is_alive(id));
        assert_eq!(store.parent(id), Some(store.world()));
        assert_eq!(store.len(), 2);
        store.destroy_space(id);
        assert!(!store.is_alive(id));
        assert_eq!(store.len(), 1);
        assert!(store.children(store.world()).next().is_none());
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = SpaceStore::new();
        let world = store.world();
        let a = store.create_space(world);
        store.destroy_space(a);
        let b = store.create_space(world);
        assert!(!store.is_alive(a));
        assert!(store.is_alive(b));
        assert_eq!(a.idx, b.idx);
        assert_ne!(a.generation, b.generation);
    }

    #[test]
    #[should_panic(expected = "stale SpaceId")]
    fn destroyed_handle_panics() {
        let mut store = SpaceStore::new();
        let a = store.create_space(store.world());
        store.destroy_space(a);
        store.set_local_transform(a, Affine::scale(2.0));
    }

    #[test]
    #[should_panic(expected = "cannot destroy the world space")]
    fn world_cannot_be_destroyed() {
        let mut store = SpaceStore::new();
        let world = store.world();
        store.destroy_space(world);
    }

    #[test]
    #[should_panic(expected = "cannot destroy space with children")]
    fn destroy_with_children_panics() {
        let mut store = SpaceStore::new();
        let a = store.create_space(store.world());
        let _b = store.create_space(a);
        store.destroy_space(a);
    }

    #[test]
    fn children_in_creation_order() {
        let mut store = SpaceStore::new();
        let world = store.world();
        let a = store.create_space(world);
        let b = store.create_space(world);
        let kids: Vec<_> = store.children(world).collect();
        assert_eq!(kids, vec![a, b]);
    }

    #[test]
    fn set_parent_rejects_self() {
        let mut store = SpaceStore::new();
        let a = store.create_space(store.world());
        assert_eq!(store.set_parent(a, Some(a)), Err(SpaceError::SelfParent(a)));
    }

    #[test]
    fn set_parent_rejects_cycle() {
        let mut store = SpaceStore::new();
        let world = store.world();
        let a = store.create_space(world);
        let b = store.create_space(a);
        let c = store.create_space(b);

        assert_eq!(
            store.set_parent(a, Some(c)),
            Err(SpaceError::Cycle {
                space: a,
                parent: c
            })
        );
        // Tree unchanged.
        assert_eq!(store.parent(a), Some(world));
        assert_eq!(store.parent(c), Some(b));
    }

    #[test]
    fn set_parent_moves_and_detaches() {
        let mut store = SpaceStore::new();
        let world = store.world();
        let a = store.create_space(world);
        let b = store.create_space(world);

        store.set_parent(b, Some(a)).unwrap();
        assert_eq!(store.parent(b), Some(a));
        assert_eq!(store.children(world).collect::<Vec<_>>(), vec![a]);

        store.set_parent(b, None).unwrap();
        assert_eq!(store.parent(b), None);
        assert!(store.children(a).next().is_none());
    }

    #[test]
    fn update_composes_parent_first() {
        let mut store = SpaceStore::new();
        let world = store.world();
        let parent = store.create_space(world);
        let child = store.create_space(parent);

        let parent_xf = Affine::translate((10.0, 0.0));
        let child_xf = Affine::scale(2.0);
        store.set_local_transform(parent, parent_xf);
        store.set_local_transform(child, child_xf);

        assert!(store.update(child));
        assert!(!store.is_dirty(parent), "parent updated first");
        assert_affine_near(store.space_to_world(child), parent_xf * child_xf);
        assert_affine_near(
            store.world_to_space(child),
            (parent_xf * child_xf).inverse(),
        );
    }

    #[test]
    fn scale_composes_multiplicatively() {
        let mut store = SpaceStore::new();
        let parent = store.create_space(store.world());
        let child = store.create_space(parent);
        store.set_local_transform(parent, Affine::scale(3.0));
        store.set_local_transform(child, Affine::rotate(0.7) * Affine::scale(5.0));

        store.update(child);
        assert!((store.local_scale(child) - 5.0).abs() < EPS);
        assert!(
            (store.scale_to_world(child) - store.local_scale(child) * store.scale_to_world(parent))
                .abs()
                < EPS
        );
        assert!((store.scale_to_world(child) - 15.0).abs() < EPS);
    }

    #[test]
    fn second_update_is_noop() {
        let mut store = SpaceStore::new();
        let a = store.create_space(store.world());
        store.set_local_transform(a, Affine::translate((1.0, 2.0)));

        assert!(store.update(a));
        let cached = store.space_to_world(a);
        assert!(!store.update(a));
        assert_eq!(store.space_to_world(a), cached);
    }

    #[test]
    fn setting_same_transform_stays_clean() {
        let mut store = SpaceStore::new();
        let a = store.create_space(store.world());
        store.set_local_transform(a, Affine::scale(2.0));
        store.update(a);
        store.set_local_transform(a, Affine::scale(2.0));
        assert!(!store.is_dirty(a));
    }

    #[test]
    fn parent_change_dirties_descendants() {
        let mut store = SpaceStore::new();
        let a = store.create_space(store.world());
        let b = store.create_space(a);
        let c = store.create_space(b);
        store.update(c);
        assert!(!store.is_dirty(a) && !store.is_dirty(b) && !store.is_dirty(c));

        store.set_local_transform(a, Affine::translate((0.0, 4.0)));
        assert!(store.is_dirty(b));
        assert!(store.is_dirty(c));

        store.update(c);
        let p = store.space_to_world(c) * Point::ZERO;
        assert!((p.y - 4.0).abs() < EPS);
    }

    #[test]
    fn evaluate_reports_affected_spaces_once() {
        let mut store = SpaceStore::new();
        let world = store.world();
        let a = store.create_space(world);
        let b = store.create_space(a);
        let other = store.create_space(world);
        let _ = store.evaluate();

        store.set_local_transform(a, Affine::scale(2.0));
        let changed = store.evaluate();
        assert!(changed.contains(&a));
        assert!(changed.contains(&b));
        assert!(!changed.contains(&other));
        assert!(!store.is_dirty(b));

        assert!(store.evaluate().is_empty());
    }

    #[test]
    fn deep_chain_is_marked_and_reported_once() {
        let mut store = SpaceStore::new();
        let mut chain = Vec::from([store.world()]);
        for _ in 0..32 {
            let parent = chain[chain.len() - 1];
            chain.push(store.create_space(parent));
        }
        let _ = store.evaluate();

        store.set_local_transform(chain[1], Affine::scale(2.0));
        assert!(chain[1..].iter().all(|&s| store.is_dirty(s)));
        assert!(!store.is_dirty(chain[0]));

        let changed = store.evaluate();
        assert_eq!(changed, chain[1..]);
        assert!((store.scale_to_world(chain[32]) - 2.0).abs() < EPS);
    }

    #[test]
    fn set_from_space_coincides_with_source() {
        let mut store = SpaceStore::new();
        let world = store.world();
        let a = store.create_space(world);
        let b = store.create_space(a);
        let target = store.create_space(world);
        store.set_local_transform(a, Affine::translate((3.0, -1.0)) * Affine::scale(2.0));
        store.set_local_transform(b, Affine::rotate(0.3));

        store.set_from_space(target, b);
        store.update(target);
        store.update(b);
        assert_affine_near(store.space_to_world(target), store.space_to_world(b));
    }
}
