// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for a retained-mode 2D scene.
//!
//! `stratum_core` keeps a tree of geometric elements (shapes, labels, groups,
//! and edges that connect them) positioned in a hierarchy of affine
//! coordinate spaces, and recomputes derived geometry incrementally through a
//! dirty-propagation update pass. It is `no_std` compatible (with `alloc`) and
//! stores nodes in index-addressed arrays with lightweight handles.
//!
//! # Architecture
//!
//! Mutations accumulate dirty marks; one [`Scene::update`](scene::Scene::update)
//! per frame recomputes everything that is stale and reports what changed:
//!
//! ```text
//!   Scene::edit ──► Value::set ──► Invalidations ──► ElementStore::mark_dirty
//!                                                         │ (bubbles to root)
//!   SpaceStore::set_local_transform ──► SpaceStore::mark_dirty
//!                                                         │ (descends to children)
//!                 ┌───────────────────────────────────────┘
//!                 ▼
//!   Scene::update ──► SceneChanges ──► Renderer::apply
//! ```
//!
//! **[`value`]**: Reactive values: a typed quantity with a dirty flag, a
//! lock flag that blocks cascaded overwrites, and a non-owning handle to the
//! node that must be notified when it changes.
//!
//! **[`space`]**: Tree of 2D affine frames with lazily cached
//! space-to-world and world-to-space transforms and uniform scale, and the
//! point/offset/length/extents conversions built on them.
//!
//! **[`element`]**: Element tree: ordered children, upward dirty bubbling,
//! and child reconciliation against the last rendered order.
//!
//! **[`curve`]**, **[`sdf`]**, **[`root`]**, **[`arclen`]**: Curve
//! evaluation and subdivision, signed distance functions for primitive
//! shapes, bisection of a curve against an SDF level set, and arc-length
//! reparametrization.
//!
//! **[`edge`]**: Connector routing that trims a curve to the visual
//! boundaries of its endpoint shapes and places evenly spaced markers.
//!
//! **[`scene`]**: The root update pass tying values, spaces, and elements
//! together.
//!
//! **[`dirty`]**: Channel constants for the dependency graphs.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! update-pass instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! **[`backend`]**: The [`Renderer`](backend::Renderer) trait implemented by
//! whatever draws the scene.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-element
//!   update and child-replacement events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod arclen;
pub mod backend;
pub mod curve;
pub mod dirty;
pub mod edge;
pub mod element;
pub mod root;
pub mod scene;
pub mod sdf;
pub mod space;
pub mod trace;
pub mod value;
