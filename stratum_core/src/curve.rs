// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parametric curves.
//!
//! [`Curve`] is a closed set of segment types over `t ∈ [0, 1]`. Curves are
//! values: when the defining points move, the curve is rebuilt wholesale
//! (usually via [`subdivide_into`](Curve::subdivide_into) from a full-length
//! template) rather than patched.
//!
//! Evaluating outside `[0, 1]` extrapolates: linearly for a line, along the
//! cubic polynomial for a cubic.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::{
    Affine, BezPath, CubicBez, Line, ParamCurve, ParamCurveArclen, ParamCurveDeriv, Point, Vec2,
};

/// Accuracy passed to kurbo's arc-length integration.
const ARCLEN_ACCURACY: f64 = 1e-6;

/// Derivatives shorter than this are treated as zero.
const DEGENERATE: f64 = 1e-12;

/// A line segment or cubic Bézier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Curve {
    /// A straight segment.
    Line(Line),
    /// A cubic Bézier segment.
    Cubic(CubicBez),
}

impl Curve {
    /// Creates a straight segment.
    #[must_use]
    pub fn line(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        Self::Line(Line::new(p0, p1))
    }

    /// Creates a cubic segment.
    #[must_use]
    pub fn cubic(
        p0: impl Into<Point>,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        p3: impl Into<Point>,
    ) -> Self {
        Self::Cubic(CubicBez::new(p0, p1, p2, p3))
    }

    /// Returns the point at parameter `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point {
        match self {
            Self::Line(l) => l.eval(t),
            Self::Cubic(c) => c.eval(t),
        }
    }

    /// Returns the unit direction of travel at `t`.
    ///
    /// Where the derivative vanishes (coincident control points) this falls
    /// back to the chord direction, and to zero for a curve collapsed to a
    /// point.
    #[must_use]
    pub fn tangent_at(&self, t: f64) -> Vec2 {
        let d = match self {
            Self::Line(l) => l.p1 - l.p0,
            Self::Cubic(c) => c.deriv().eval(t).to_vec2(),
        };
        let d = if d.hypot() > DEGENERATE {
            d
        } else {
            self.end() - self.start()
        };
        let len = d.hypot();
        if len > DEGENERATE { d / len } else { Vec2::ZERO }
    }

    /// Returns the part of the curve over `t0..t1`, reparametrized to
    /// `[0, 1]`.
    #[must_use]
    pub fn subsegment(&self, t0: f64, t1: f64) -> Self {
        match self {
            Self::Line(l) => Self::Line(l.subsegment(t0..t1)),
            Self::Cubic(c) => Self::Cubic(c.subsegment(t0..t1)),
        }
    }

    /// Writes the part of the curve over `t0..t1` into `dst`.
    pub fn subdivide_into(&self, dst: &mut Self, t0: f64, t1: f64) {
        *dst = self.subsegment(t0, t1);
    }

    /// Returns the arc length.
    #[must_use]
    pub fn length(&self) -> f64 {
        match self {
            Self::Line(l) => l.arclen(ARCLEN_ACCURACY),
            Self::Cubic(c) => c.arclen(ARCLEN_ACCURACY),
        }
    }

    /// Returns the point at `t = 0`.
    #[must_use]
    pub fn start(&self) -> Point {
        match self {
            Self::Line(l) => l.p0,
            Self::Cubic(c) => c.p0,
        }
    }

    /// Returns the point at `t = 1`.
    #[must_use]
    pub fn end(&self) -> Point {
        match self {
            Self::Line(l) => l.p1,
            Self::Cubic(c) => c.p3,
        }
    }

    /// Returns the control points: two for a line, four for a cubic.
    #[must_use]
    pub fn control_points(&self) -> Vec<Point> {
        match self {
            Self::Line(l) => vec![l.p0, l.p1],
            Self::Cubic(c) => vec![c.p0, c.p1, c.p2, c.p3],
        }
    }

    /// Returns the curve with every control point mapped through `xf`.
    #[must_use]
    pub fn transform(&self, xf: Affine) -> Self {
        match self {
            Self::Line(l) => Self::Line(Line::new(xf * l.p0, xf * l.p1)),
            Self::Cubic(c) => {
                Self::Cubic(CubicBez::new(xf * c.p0, xf * c.p1, xf * c.p2, xf * c.p3))
            }
        }
    }

    /// Converts the curve to a single-segment path for rendering.
    #[must_use]
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start());
        match self {
            Self::Line(l) => path.line_to(l.p1),
            Self::Cubic(c) => path.curve_to(c.p1, c.p2, c.p3),
        }
        path
    }
}
