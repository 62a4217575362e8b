// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Signed distance functions.
//!
//! Distances are negative inside a shape, zero on its boundary and positive
//! outside. Every primitive here is centred on the origin of its own space.

use kurbo::{Point, Vec2};

/// A continuous signed distance field.
pub trait Sdf {
    /// Returns the signed distance from `p` to the boundary.
    fn distance(&self, p: Point) -> f64;
}

impl<F: Fn(Point) -> f64> Sdf for F {
    fn distance(&self, p: Point) -> f64 {
        self(p)
    }
}

/// A circle of the given radius around the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleSdf {
    /// Circle radius.
    pub radius: f64,
}

impl Sdf for CircleSdf {
    fn distance(&self, p: Point) -> f64 {
        p.to_vec2().hypot() - self.radius
    }
}

/// An axis-aligned rectangle around the origin with rounded corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundedRectSdf {
    /// Half the width and half the height.
    pub half_extents: Vec2,
    /// Corner radius, clamped to `[0, min(half_extents)]` when evaluated.
    pub radius: f64,
}

impl Sdf for RoundedRectSdf {
    fn distance(&self, p: Point) -> f64 {
        let hx = self.half_extents.x.abs();
        let hy = self.half_extents.y.abs();
        let r = self.radius.max(0.0).min(hx.min(hy));

        let qx = p.x.abs() - hx + r;
        let qy = p.y.abs() - hy + r;
        let outside = Vec2::new(qx.max(0.0), qy.max(0.0)).hypot();
        let inside = qx.max(qy).min(0.0);
        outside + inside - r
    }
}

/// The SDF of a shape element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeSdf {
    /// See [`CircleSdf`].
    Circle(CircleSdf),
    /// See [`RoundedRectSdf`].
    RoundedRect(RoundedRectSdf),
}

impl Sdf for ShapeSdf {
    fn distance(&self, p: Point) -> f64 {
        match self {
            Self::Circle(c) => c.distance(p),
            Self::RoundedRect(r) => r.distance(p),
        }
    }
}
