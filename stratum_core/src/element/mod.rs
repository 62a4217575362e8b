// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element tree data model.
//!
//! An *element* is a node in the scene tree. Each element has:
//!
//! - An identity ([`ElementId`]), assigned from a monotonic counter and never
//!   reused.
//! - Topology: an optional parent and a list of children in attachment
//!   order, plus the child order last handed to the renderer.
//! - A bundle of [`Value`](crate::value::Value)s ([`ElementData`]): layer,
//!   active flag, cascading [`Style`](crate::value::Style), and the
//!   kind-specific values of a group, shape, label, or edge.
//! - The space its values are expressed in (its *frame*) and the
//!   [`ElementGeometry`] derived from them during the update pass.
//!
//! # Dirty propagation
//!
//! Marking an element dirty bubbles to the root and stops at the first
//! element that is already dirty. An element is `Clean` or `Dirty`; a
//! mutation moves it to `Dirty` and the update pass moves it back.
//!
//! # Child reconciliation
//!
//! See [`ElementStore::reconcile_children`].

mod id;
mod kind;
mod reconcile;
mod store;

pub use id::{ElementId, TargetId};
pub use kind::{EdgeData, ElementData, ElementKind, GroupData, LabelData, ShapeData, ShapeKind};
pub use store::{ElementGeometry, ElementStore};
