// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reactive values.
//!
//! A [`Value`] holds one semantic quantity (a position, a length, an enum, a
//! string, a transform, ...) together with:
//!
//! - a **dirty** flag, set whenever the quantity changes and cleared only by
//!   the owner's update pass via [`Value::clear_dirty`];
//! - a **locked** flag, which makes [`Value::copy_if_unlocked`] a no-op so a
//!   child can opt out of a cascade from its parent;
//! - an optional [`Owner`], a non-owning handle to the element or space that
//!   must hear about every change.
//!
//! Values do not hold a reference to their owner's storage. Instead, every
//! mutating call takes an [`Invalidate`] sink and reports the owner handle to
//! it; the [`Scene`](crate::scene::Scene) queues those reports in
//! [`Invalidations`] and applies them once the mutation closure returns.
//! This keeps values, elements, and the element's parent free of reference
//! cycles.
//!
//! # Notification policy
//!
//! [`Value::mark_dirty`] notifies the owner on *every* call, even when the
//! value was already dirty. Short-circuiting happens one level up, in
//! [`ElementStore::mark_dirty`](crate::element::ElementStore::mark_dirty).

use alloc::vec::Vec;

use crate::element::ElementId;
use crate::space::SpaceId;

/// The node a [`Value`] reports its changes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    /// An element in the element tree.
    Element(ElementId),
    /// A coordinate space.
    Space(SpaceId),
}

/// Receives owner notifications from [`Value`] mutations.
pub trait Invalidate {
    /// Called when a value owned by `owner` was marked dirty.
    fn invalidate(&mut self, owner: Owner);
}

/// A queue of pending owner notifications.
///
/// Collected while values are being mutated and drained afterwards by the
/// store that owns them.
#[derive(Clone, Debug, Default)]
pub struct Invalidations {
    pending: Vec<Owner>,
}

impl Invalidations {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no notification is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns the number of pending notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Removes and returns all pending notifications in arrival order.
    pub fn drain(&mut self) -> alloc::vec::Drain<'_, Owner> {
        self.pending.drain(..)
    }
}

impl Invalidate for Invalidations {
    fn invalidate(&mut self, owner: Owner) {
        self.pending.push(owner);
    }
}

/// An [`Invalidate`] sink that discards every notification.
///
/// Useful for values that are not (yet) attached to a store.
#[derive(Clone, Copy, Debug, Default)]
pub struct Detached;

impl Invalidate for Detached {
    fn invalidate(&mut self, owner: Owner) {
        _ = owner;
    }
}

/// A typed quantity with staleness tracking.
///
/// New values start dirty so the first update pass picks them up.
#[derive(Clone, Debug, PartialEq)]
pub struct Value<T> {
    value: T,
    dirty: bool,
    locked: bool,
    owner: Option<Owner>,
}

impl<T: Default> Default for Value<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Value<T> {
    /// Creates an unowned, unlocked, dirty value.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            value,
            dirty: true,
            locked: false,
            owner: None,
        }
    }

    /// Creates a dirty value already attached to `owner`.
    #[must_use]
    pub const fn with_owner(value: T, owner: Owner) -> Self {
        Self {
            value,
            dirty: true,
            locked: false,
            owner: Some(owner),
        }
    }

    /// Returns the current quantity.
    #[inline]
    #[must_use]
    pub const fn get(&self) -> &T {
        &self.value
    }

    /// Returns the owner handle, if attached.
    #[inline]
    #[must_use]
    pub const fn owner(&self) -> Option<Owner> {
        self.owner
    }

    /// Attaches the value to `owner`, replacing any previous owner.
    pub fn attach(&mut self, owner: Owner) {
        self.owner = Some(owner);
    }

    /// Returns whether the value changed since the owner last cleared it.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether cascaded overwrites are ignored.
    #[inline]
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Makes [`copy_if_unlocked`](Self::copy_if_unlocked) a no-op.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Lets cascaded overwrites through again.
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Sets the dirty flag and notifies the owner.
    ///
    /// The owner is notified even if the value was already dirty.
    pub fn mark_dirty(&mut self, sink: &mut impl Invalidate) {
        self.dirty = true;
        if let Some(owner) = self.owner {
            sink.invalidate(owner);
        }
    }

    /// Clears the local dirty flag only.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

impl<T: PartialEq> Value<T> {
    /// Replaces the quantity, marking the value dirty if it changed.
    ///
    /// Returns `true` if the quantity changed.
    pub fn set(&mut self, value: T, sink: &mut impl Invalidate) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.mark_dirty(sink);
        true
    }

    /// Sets the quantity and locks the value against cascaded overwrites.
    pub fn override_with(&mut self, value: T, sink: &mut impl Invalidate) -> bool {
        self.locked = true;
        self.set(value, sink)
    }
}

impl<T: PartialEq + Clone> Value<T> {
    /// Adopts `other`'s quantity regardless of the lock flag.
    pub fn copy(&mut self, other: &Self, sink: &mut impl Invalidate) -> bool {
        self.set(other.value.clone(), sink)
    }

    /// Adopts `other`'s quantity unless this value is locked.
    pub fn copy_if_unlocked(&mut self, other: &Self, sink: &mut impl Invalidate) -> bool {
        if self.locked {
            return false;
        }
        self.copy(other, sink)
    }
}

/// Presentation attributes that cascade from parent to child elements.
///
/// A composite of independent values; [`clear_dirty`](Self::clear_dirty)
/// clears each of them.
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    /// Opacity in `[0, 1]`.
    pub opacity: Value<f64>,
    /// Outline width, in the element's space.
    pub stroke_width: Value<f64>,
    /// Font size for labels, in the element's space.
    pub font_size: Value<f64>,
    /// Whether the element draws at all.
    pub visible: Value<bool>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            opacity: Value::new(1.0),
            stroke_width: Value::new(1.0),
            font_size: Value::new(12.0),
            visible: Value::new(true),
        }
    }
}

impl Style {
    /// Attaches every sub-value to `owner`.
    pub fn attach(&mut self, owner: Owner) {
        self.opacity.attach(owner);
        self.stroke_width.attach(owner);
        self.font_size.attach(owner);
        self.visible.attach(owner);
    }

    /// Copies every unlocked sub-value from `parent`.
    ///
    /// Returns `true` if anything changed.
    pub fn inherit_from(&mut self, parent: &Self, sink: &mut impl Invalidate) -> bool {
        // Non-short-circuiting: every field must be visited.
        let mut changed = self.opacity.copy_if_unlocked(&parent.opacity, sink);
        changed |= self
            .stroke_width
            .copy_if_unlocked(&parent.stroke_width, sink);
        changed |= self.font_size.copy_if_unlocked(&parent.font_size, sink);
        changed |= self.visible.copy_if_unlocked(&parent.visible, sink);
        changed
    }

    /// Returns `true` if any sub-value is dirty.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.opacity.is_dirty()
            || self.stroke_width.is_dirty()
            || self.font_size.is_dirty()
            || self.visible.is_dirty()
    }

    /// Clears the dirty flag of every sub-value.
    pub fn clear_dirty(&mut self) {
        self.opacity.clear_dirty();
        self.stroke_width.clear_dirty();
        self.font_size.clear_dirty();
        self.visible.clear_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Owner {
        Owner::Element(ElementId(7))
    }

    fn clean<T>(mut v: Value<T>) -> Value<T> {
        v.clear_dirty();
        v
    }

    #[test]
    fn new_values_start_dirty() {
        let v = Value::new(3.0_f64);
        assert!(v.is_dirty());
        assert!(!v.is_locked());
        assert_eq!(v.owner(), None);
    }

    #[test]
    fn set_same_value_is_noop() {
        let mut v = clean(Value::with_owner(1_i32, owner()));
        let mut sink = Invalidations::new();
        assert!(!v.set(1, &mut sink));
        assert!(!v.is_dirty());
        assert!(sink.is_empty());
    }

    #[test]
    fn set_new_value_marks_and_notifies() {
        let mut v = clean(Value::with_owner(1_i32, owner()));
        let mut sink = Invalidations::new();
        assert!(v.set(2, &mut sink));
        assert!(v.is_dirty());
        assert_eq!(*v.get(), 2);
        assert_eq!(sink.drain().collect::<Vec<_>>(), [owner()]);
    }

    #[test]
    fn mark_dirty_always_notifies_owner() {
        let mut v = Value::with_owner(0_u8, owner());
        let mut sink = Invalidations::new();
        assert!(v.is_dirty());
        v.mark_dirty(&mut sink);
        v.mark_dirty(&mut sink);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn unowned_value_notifies_nobody() {
        let mut v = Value::new(false);
        let mut sink = Invalidations::new();
        v.set(true, &mut sink);
        assert!(v.is_dirty());
        assert!(sink.is_empty());
    }

    #[test]
    fn clear_dirty_resets_flag_only() {
        let mut v = Value::with_owner(5_i32, owner());
        v.lock();
        v.clear_dirty();
        assert!(!v.is_dirty());
        assert!(v.is_locked());
        assert_eq!(*v.get(), 5);
    }

    #[test]
    fn copy_ignores_lock() {
        let mut child = clean(Value::new(1.0_f64));
        child.lock();
        let parent = Value::new(2.0_f64);
        assert!(child.copy(&parent, &mut Detached));
        assert_eq!(*child.get(), 2.0);
    }

    #[test]
    fn copy_if_unlocked_respects_lock() {
        let parent = Value::new(2.0_f64);

        let mut locked = clean(Value::new(1.0_f64));
        locked.lock();
        assert!(!locked.copy_if_unlocked(&parent, &mut Detached));
        assert_eq!(*locked.get(), 1.0);
        assert!(!locked.is_dirty());

        let mut unlocked = clean(Value::new(1.0_f64));
        assert!(unlocked.copy_if_unlocked(&parent, &mut Detached));
        assert_eq!(*unlocked.get(), 2.0);
        assert!(unlocked.is_dirty());
    }

    #[test]
    fn override_with_locks() {
        let mut v = Value::new(1_i32);
        v.override_with(4, &mut Detached);
        assert!(v.is_locked());
        assert!(!v.copy_if_unlocked(&Value::new(9), &mut Detached));
        assert_eq!(*v.get(), 4);
    }

    #[test]
    fn style_cascade_skips_overridden_fields() {
        let mut parent = Style::default();
        let mut sink = Invalidations::new();
        parent.opacity.set(0.5, &mut sink);
        parent.font_size.set(20.0, &mut sink);

        let mut child = Style::default();
        child.attach(owner());
        child.clear_dirty();
        child.font_size.override_with(9.0, &mut sink);
        let _ = sink.drain().count();

        assert!(child.inherit_from(&parent, &mut sink));
        assert_eq!(*child.opacity.get(), 0.5);
        assert_eq!(*child.font_size.get(), 9.0);
        assert_eq!(sink.len(), 1, "only opacity changed");
    }

    #[test]
    fn style_clear_dirty_clears_all_fields() {
        let mut style = Style::default();
        assert!(style.is_dirty());
        style.clear_dirty();
        assert!(!style.is_dirty());
        style.visible.set(false, &mut Detached);
        assert!(style.is_dirty());
    }
}
