// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinate space hierarchy.
//!
//! A *space* is a 2D affine frame of reference. Each space has:
//!
//! - An identity: a generational [`SpaceId`] handle that becomes stale when
//!   the space is destroyed.
//! - Topology: a parent link and an ordered child list. The parent graph is a
//!   tree rooted at the *world* space created with the store; detached spaces
//!   form additional roots whose world is their own frame.
//! - A **local transform** set by the caller, mapping space coordinates to
//!   parent coordinates.
//! - **Cached properties** recomputed lazily by [`SpaceStore::update`]: the
//!   inverse local transform, the local uniform scale
//!   `sqrt(|det(local)|)`, the composed space-to-world and world-to-space
//!   transforms, and the accumulated scale to world.
//!
//! Conversions between two spaces pivot through world coordinates and are
//! the identity when both handles name the same space.
//!
//! # Uniform scale
//!
//! Lengths are converted with a single scalar per space. That is exact for
//! similarity transforms (rotation, translation, uniform scale) and only an
//! area-preserving estimate under shear or non-uniform scale.

mod convert;
mod id;
mod store;
mod traverse;

pub use id::SpaceId;
pub use store::{SpaceError, SpaceStore};
pub use traverse::SpaceChildren;
