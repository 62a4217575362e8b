// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child reconciliation.
//!
//! The renderer holds, per element, an ordered list of child render targets.
//! Reconciliation recomputes that list (active children only, stable-sorted
//! by `(layer, id)`) and reports it only when it differs from what the
//! renderer last received, in order or membership. The parentless elements
//! form one more list, reconciled the same way.

use alloc::vec::Vec;

use super::id::ElementId;
use super::store::ElementStore;

impl ElementStore {
    /// Returns whether the rendered children of `id` may be out of date:
    /// its child list changed, or a child's layer or active flag did.
    #[must_use]
    pub fn needs_reconcile(&self, id: ElementId) -> bool {
        self.validate(id);
        self.order_dirty[id.0 as usize]
            || self.children[id.0 as usize]
                .iter()
                .any(|&c| self.data(c).order_changed())
    }

    /// Recomputes the rendered children of `id`.
    ///
    /// Returns the new list if it differs from the previous one, and `None`
    /// if the renderer is already up to date.
    pub fn reconcile_children(&mut self, id: ElementId) -> Option<&[ElementId]> {
        self.validate(id);
        let i = id.0 as usize;

        let mut order: Vec<ElementId> = self.children[i]
            .iter()
            .copied()
            .filter(|&c| *self.data(c).active.get())
            .collect();
        order.sort_by_key(|&c| (*self.data(c).layer.get(), c));
        self.order_dirty[i] = false;

        if order == self.rendered[i] {
            return None;
        }
        self.rendered[i] = order;
        Some(&self.rendered[i])
    }

    /// Recomputes the rendered order of the parentless elements, with the
    /// same filtering and sort as [`reconcile_children`](Self::reconcile_children).
    ///
    /// Returns the new list if it differs from the previous one.
    pub fn reconcile_roots(&mut self) -> Option<&[ElementId]> {
        let mut order: Vec<ElementId> = self
            .roots()
            .into_iter()
            .filter(|&r| *self.data(r).active.get())
            .collect();
        order.sort_by_key(|&r| (*self.data(r).layer.get(), r));

        if order == self.rendered_roots {
            return None;
        }
        self.rendered_roots = order;
        Some(&self.rendered_roots)
    }
}
