// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Stratum keeps two dependency graphs (via [`understory_dirty`]), each on
//! its own channel.
//!
//! # Propagation semantics
//!
//! - **[`SPACE`]** lives in the [`SpaceStore`](crate::space::SpaceStore).
//!   Every space has a dependency edge to its parent. The store walks the
//!   descendants of a changed space itself and marks each one once, since
//!   their cached world transforms are composed from the parent's.
//!   The graph is built with cycle rejection, which is how re-parenting a
//!   space under its own descendant is detected.
//!
//! - **[`GEOMETRY`]** lives in the [`Scene`](crate::scene::Scene). Elements
//!   depend on the space they are positioned in, and edges depend on the
//!   elements they connect. Draining the channel with its affected set yields
//!   every element whose derived geometry went stale because something it
//!   references moved, even when the element itself was never touched.
//!
//! # Consumption
//!
//! Callers never need to query these channels directly. Each
//! [`Scene::update`](crate::scene::Scene::update) drains both and surfaces
//! the results as [`SceneChanges`](crate::scene::SceneChanges).

use understory_dirty::Channel;

/// A space's local transform or parent changed; its cached world transforms
/// and those of its descendants must be recomposed.
pub const SPACE: Channel = Channel::new(0);

/// Something an element's derived geometry reads from changed.
pub const GEOMETRY: Channel = Channel::new(1);
