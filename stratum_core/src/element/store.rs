// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index-addressed element storage and the element tree.

use alloc::vec::Vec;

use kurbo::{Affine, Rect};

use super::id::{ElementId, TargetId};
use super::kind::ElementData;
use crate::curve::Curve;
use crate::edge::Marker;
use crate::space::SpaceId;
use crate::value::Owner;

/// Geometry derived for an element by the update pass.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementGeometry {
    /// Maps the element's space to world coordinates.
    pub world_transform: Affine,
    /// Box of a shape or label, in the element's space.
    pub bounds: Option<Rect>,
    /// Trimmed connector of an edge, in the element's space.
    pub curve: Option<Curve>,
    /// Decorations along `curve`.
    pub markers: Vec<Marker>,
}

impl Default for ElementGeometry {
    fn default() -> Self {
        Self {
            world_transform: Affine::IDENTITY,
            bounds: None,
            curve: None,
            markers: Vec::new(),
        }
    }
}

/// Storage for all elements of a scene.
///
/// Slot `n` holds [`ElementId`] `n`. Removed elements leave an empty slot
/// behind, since ids are never reused. The columns therefore grow with the
/// number of elements ever created, not the number alive: a scene that keeps
/// creating and destroying elements keeps one tombstone per destroyed id.
#[derive(Debug, Default)]
pub struct ElementStore {
    // -- Topology --
    pub(crate) parent: Vec<Option<ElementId>>,
    /// Children in attachment order.
    pub(crate) children: Vec<Vec<ElementId>>,
    /// Children as last handed to the renderer.
    pub(crate) rendered: Vec<Vec<ElementId>>,
    /// Roots as last handed to the renderer.
    pub(crate) rendered_roots: Vec<ElementId>,

    // -- Data --
    pub(crate) data: Vec<Option<ElementData>>,
    pub(crate) frame: Vec<SpaceId>,
    pub(crate) target: Vec<Option<TargetId>>,

    // -- Derived --
    pub(crate) geometry: Vec<ElementGeometry>,
    pub(crate) dirty: Vec<bool>,
    pub(crate) order_dirty: Vec<bool>,
    /// Attached since the style last inherited from the parent.
    pub(crate) needs_inherit: Vec<bool>,

    live: usize,
}

impl ElementStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parentless element positioned in `frame`.
    ///
    /// Every value in `data` is attached to the new element, and the element
    /// starts dirty.
    pub fn insert(&mut self, mut data: ElementData, frame: SpaceId) -> ElementId {
        let raw = u32::try_from(self.data.len()).unwrap_or(u32::MAX);
        assert!(raw != u32::MAX, "element ids exhausted");
        let id = ElementId(raw);
        data.attach(Owner::Element(id));

        self.parent.push(None);
        self.children.push(Vec::new());
        self.rendered.push(Vec::new());
        self.data.push(Some(data));
        self.frame.push(frame);
        self.target.push(None);
        self.geometry.push(ElementGeometry::default());
        self.dirty.push(true);
        self.order_dirty.push(false);
        self.needs_inherit.push(false);
        self.live += 1;
        id
    }

    /// Removes a childless element and returns its data.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the element still has children.
    pub fn remove(&mut self, id: ElementId) -> ElementData {
        self.validate(id);
        let i = id.0 as usize;
        assert!(
            self.children[i].is_empty(),
            "cannot remove element with children"
        );
        self.detach(id);

        self.rendered[i].clear();
        self.target[i] = None;
        self.geometry[i] = ElementGeometry::default();
        self.dirty[i] = false;
        self.order_dirty[i] = false;
        self.needs_inherit[i] = false;
        self.live -= 1;
        match self.data[i].take() {
            Some(data) => data,
            None => unreachable!("validated above"),
        }
    }

    /// Returns whether `id` names a live element.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.data.get(id.0 as usize).is_some_and(Option::is_some)
    }

    /// Returns the number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if there are no live elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Returns all live element ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_some())
            .map(|(i, _)| ElementId(i as u32))
    }

    /// Returns the parentless live elements in ascending id order.
    #[must_use]
    pub fn roots(&self) -> Vec<ElementId> {
        self.ids()
            .filter(|id| self.parent[id.0 as usize].is_none())
            .collect()
    }

    // -- Topology --

    /// Returns the parent of an element.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.validate(id);
        self.parent[id.0 as usize]
    }

    /// Returns the children in attachment order.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.validate(id);
        &self.children[id.0 as usize]
    }

    /// Returns the children as last reconciled: active only, sorted by
    /// `(layer, id)`.
    #[must_use]
    pub fn rendered_children(&self, id: ElementId) -> &[ElementId] {
        self.validate(id);
        &self.rendered[id.0 as usize]
    }

    /// Returns the roots as last reconciled: active only, sorted by
    /// `(layer, id)`.
    #[must_use]
    pub fn rendered_roots(&self) -> &[ElementId] {
        &self.rendered_roots
    }

    /// Returns `true` if `ancestor` is `id` or one of its ancestors.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.parent[c.0 as usize];
        }
        false
    }

    /// Moves `id` under `parent`, or makes it a root when `parent` is `None`.
    ///
    /// Both the old and the new parent get their child order re-checked on
    /// the next update. The moved subtree and the new parent are marked
    /// dirty, and the moved element inherits the new parent's style.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale, or if `parent` is `id` itself or one of
    /// its descendants.
    pub fn set_parent(&mut self, id: ElementId, parent: Option<ElementId>) {
        self.validate(id);
        if let Some(p) = parent {
            self.validate(p);
            assert!(
                !self.is_ancestor_or_self(id, p),
                "cannot parent {id:?} under itself or a descendant"
            );
        }
        if self.parent[id.0 as usize] == parent {
            return;
        }

        self.detach(id);
        if let Some(p) = parent {
            self.parent[id.0 as usize] = Some(p);
            self.children[p.0 as usize].push(id);
            self.order_dirty[p.0 as usize] = true;
            self.needs_inherit[id.0 as usize] = true;
        }
        self.mark_subtree_dirty(id);
    }

    // -- Data --

    /// Returns an element's values.
    #[must_use]
    pub fn data(&self, id: ElementId) -> &ElementData {
        self.validate(id);
        match &self.data[id.0 as usize] {
            Some(data) => data,
            None => unreachable!("validated above"),
        }
    }

    /// Returns an element's values for mutation.
    ///
    /// Changes made through [`Value`](crate::value::Value) setters report to
    /// the sink passed to them; nothing is marked here.
    pub fn data_mut(&mut self, id: ElementId) -> &mut ElementData {
        self.validate(id);
        match &mut self.data[id.0 as usize] {
            Some(data) => data,
            None => unreachable!("validated above"),
        }
    }

    /// Returns the space an element's values are expressed in.
    #[must_use]
    pub fn frame(&self, id: ElementId) -> SpaceId {
        self.validate(id);
        self.frame[id.0 as usize]
    }

    pub(crate) fn set_frame(&mut self, id: ElementId, frame: SpaceId) {
        self.frame[id.0 as usize] = frame;
    }

    /// Returns the geometry computed by the last update.
    #[must_use]
    pub fn geometry(&self, id: ElementId) -> &ElementGeometry {
        self.validate(id);
        &self.geometry[id.0 as usize]
    }

    pub(crate) fn geometry_mut(&mut self, id: ElementId) -> &mut ElementGeometry {
        &mut self.geometry[id.0 as usize]
    }

    /// Returns the renderer object bound to an element.
    #[must_use]
    pub fn target(&self, id: ElementId) -> Option<TargetId> {
        self.validate(id);
        self.target[id.0 as usize]
    }

    /// Binds or unbinds the renderer object of an element.
    pub fn set_target(&mut self, id: ElementId, target: Option<TargetId>) {
        self.validate(id);
        self.target[id.0 as usize] = target;
    }

    // -- Dirty tracking --

    /// Returns whether an element awaits the update pass.
    #[must_use]
    pub fn is_dirty(&self, id: ElementId) -> bool {
        self.validate(id);
        self.dirty[id.0 as usize]
    }

    /// Returns whether an element's child list changed since it was last
    /// reconciled.
    #[must_use]
    pub fn is_order_dirty(&self, id: ElementId) -> bool {
        self.validate(id);
        self.order_dirty[id.0 as usize]
    }

    /// Marks an element dirty and bubbles to its ancestors.
    ///
    /// Stops at the first element that is already dirty: every ancestor of a
    /// dirty element is dirty.
    pub fn mark_dirty(&mut self, id: ElementId) {
        self.validate(id);
        let mut cur = Some(id);
        while let Some(c) = cur {
            let i = c.0 as usize;
            if self.dirty[i] {
                break;
            }
            self.dirty[i] = true;
            cur = self.parent[i];
        }
    }

    /// Marks an element and every descendant dirty, then bubbles upward.
    pub fn mark_subtree_dirty(&mut self, id: ElementId) {
        self.validate(id);
        let mut stack = Vec::from([id]);
        while let Some(c) = stack.pop() {
            self.dirty[c.0 as usize] = true;
            stack.extend_from_slice(&self.children[c.0 as usize]);
        }
        if let Some(p) = self.parent[id.0 as usize] {
            self.mark_dirty(p);
        }
    }

    /// Returns whether an element was attached to a parent and has not yet
    /// inherited its style.
    #[must_use]
    pub fn needs_inherit(&self, id: ElementId) -> bool {
        self.validate(id);
        self.needs_inherit[id.0 as usize]
    }

    pub(crate) fn clear_needs_inherit(&mut self, id: ElementId) {
        self.needs_inherit[id.0 as usize] = false;
    }

    pub(crate) fn clear_dirty(&mut self, id: ElementId) {
        self.dirty[id.0 as usize] = false;
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: ElementId) {
        assert!(self.contains(id), "stale ElementId: {id:?}");
    }

    /// Unlinks `id` from its parent, flagging the parent for reconciliation.
    fn detach(&mut self, id: ElementId) {
        let Some(old) = self.parent[id.0 as usize].take() else {
            return;
        };
        let o = old.0 as usize;
        self.children[o].retain(|&c| c != id);
        self.order_dirty[o] = true;
        self.mark_dirty(old);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Point;

    use super::*;
    use crate::element::{ElementKind, LabelData};
    use crate::space::SpaceStore;

    fn label(store: &mut ElementStore) -> ElementId {
        let world = SpaceStore::new().world();
        store.insert(
            ElementData::new(ElementKind::Label(LabelData::new("x", Point::ZERO))),
            world,
        )
    }

    fn clean_all(store: &mut ElementStore) {
        for d in &mut store.dirty {
            *d = false;
        }
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut store = ElementStore::new();
        let a = label(&mut store);
        let b = label(&mut store);
        store.remove(a);
        let c = label(&mut store);
        assert!(a < b && b < c);
        assert!(!store.contains(a));
        assert_eq!(store.len(), 2);
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![b, c]);
    }

    #[test]
    fn new_elements_start_dirty() {
        let mut store = ElementStore::new();
        let a = label(&mut store);
        assert!(store.is_dirty(a));
    }

    #[test]
    fn mark_dirty_bubbles_to_root() {
        let mut store = ElementStore::new();
        let root = label(&mut store);
        let mid = label(&mut store);
        let leaf = label(&mut store);
        store.set_parent(mid, Some(root));
        store.set_parent(leaf, Some(mid));
        clean_all(&mut store);

        store.mark_dirty(leaf);
        assert!(store.is_dirty(leaf));
        assert!(store.is_dirty(mid));
        assert!(store.is_dirty(root));
    }

    #[test]
    fn mark_dirty_short_circuits() {
        let mut store = ElementStore::new();
        let root = label(&mut store);
        let leaf = label(&mut store);
        store.set_parent(leaf, Some(root));
        clean_all(&mut store);

        // A dirty element with a clean parent can only be produced by hand;
        // marking stops at it.
        store.dirty[leaf.0 as usize] = true;
        store.mark_dirty(leaf);
        assert!(!store.is_dirty(root));
    }

    #[test]
    fn set_parent_moves_and_flags_both_parents() {
        let mut store = ElementStore::new();
        let a = label(&mut store);
        let b = label(&mut store);
        let child = label(&mut store);
        store.set_parent(child, Some(a));
        store.order_dirty.fill(false);
        clean_all(&mut store);

        store.set_parent(child, Some(b));
        assert!(store.children(a).is_empty());
        assert_eq!(store.children(b), [child]);
        assert!(store.is_order_dirty(a) && store.is_order_dirty(b));
        assert!(store.is_dirty(a) && store.is_dirty(b) && store.is_dirty(child));
        assert_eq!(store.roots(), vec![a, b]);
    }

    #[test]
    fn set_parent_marks_new_parent_even_if_child_was_dirty() {
        let mut store = ElementStore::new();
        let p = label(&mut store);
        let child = label(&mut store);
        store.dirty[p.0 as usize] = false;
        assert!(store.is_dirty(child));

        store.set_parent(child, Some(p));
        assert!(store.is_dirty(p));
    }

    #[test]
    fn set_parent_dirties_whole_subtree() {
        let mut store = ElementStore::new();
        let p = label(&mut store);
        let a = label(&mut store);
        let a1 = label(&mut store);
        store.set_parent(a1, Some(a));
        clean_all(&mut store);

        store.set_parent(a, Some(p));
        assert!(store.is_dirty(a1));
    }

    #[test]
    #[should_panic(expected = "under itself or a descendant")]
    fn set_parent_rejects_descendant() {
        let mut store = ElementStore::new();
        let a = label(&mut store);
        let b = label(&mut store);
        store.set_parent(b, Some(a));
        store.set_parent(a, Some(b));
    }

    #[test]
    #[should_panic(expected = "cannot remove element with children")]
    fn remove_with_children_panics() {
        let mut store = ElementStore::new();
        let a = label(&mut store);
        let b = label(&mut store);
        store.set_parent(b, Some(a));
        store.remove(a);
    }

    #[test]
    #[should_panic(expected = "stale ElementId")]
    fn removed_handle_panics() {
        let mut store = ElementStore::new();
        let a = label(&mut store);
        store.remove(a);
        let _ = store.data(a);
    }

    #[test]
    fn attaching_requests_inheritance() {
        let mut store = ElementStore::new();
        let p = label(&mut store);
        let c = label(&mut store);
        assert!(!store.needs_inherit(c));

        store.set_parent(c, Some(p));
        assert!(store.needs_inherit(c));
        store.clear_needs_inherit(c);

        store.set_parent(c, None);
        assert!(!store.needs_inherit(c));
    }

    #[test]
    fn removed_slots_stay_allocated() {
        let mut store = ElementStore::new();
        let ids: Vec<_> = (0..4).map(|_| label(&mut store)).collect();
        for &id in &ids[..3] {
            store.remove(id);
        }
        let fresh = label(&mut store);

        assert_eq!(store.len(), 2);
        assert_eq!(store.data.len(), 5);
        assert_eq!(fresh, ElementId(4));
        assert_eq!(store.roots(), vec![ids[3], fresh]);
    }

    #[test]
    fn remove_detaches_from_parent() {
        let mut store = ElementStore::new();
        let p = label(&mut store);
        let c = label(&mut store);
        store.set_parent(c, Some(p));
        store.remove(c);
        assert!(store.children(p).is_empty());
        assert!(store.is_order_dirty(p));
    }
}
