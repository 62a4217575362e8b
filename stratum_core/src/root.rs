// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bisection of a curve against an SDF level set.
//!
//! [`RootFinder::find_point_at_distance`] searches `[t_min, t_max]` for the
//! parameter where
//!
//! ```text
//! f(t) = sdf(curve_to_sdf * curve.point_at(t)) - target
//! ```
//!
//! changes sign. A bracket whose ends have the same sign yields `None`: the
//! target distance is never crossed in that range. That is an ordinary
//! outcome (the shape is too small, or the curve never reaches it), not an
//! error.
//!
//! The answer is unique only when `f` is monotonic on the bracket. With
//! several crossings the search still terminates but may return any one of
//! them.

use kurbo::Affine;

use crate::curve::Curve;
use crate::sdf::Sdf;

/// Flat sentinel for "no crossing", for callers that store parameters as
/// plain `f64`s: `finder.find_point_at_distance(..).unwrap_or(NO_CROSSING)`.
pub const NO_CROSSING: f64 = -1.0;

/// Bisection settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootFinder {
    /// Stop as soon as `|f(t)|` drops below this.
    pub tolerance: f64,
    /// Upper bound on midpoint evaluations.
    pub max_iterations: u32,
}

impl Default for RootFinder {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl RootFinder {
    /// `tolerance = 1e-2`, `max_iterations = 30`.
    pub const DEFAULT: Self = Self {
        tolerance: 1e-2,
        max_iterations: 30,
    };

    /// Returns the parameter in `[t_min, t_max]` at which the curve sits
    /// `target` away from the SDF boundary, or `None` if `f` has the same
    /// sign at both ends of the bracket.
    ///
    /// If the tolerance is not reached within `max_iterations`, the last
    /// midpoint is returned.
    pub fn find_point_at_distance(
        &self,
        sdf: &(impl Sdf + ?Sized),
        curve: &Curve,
        curve_to_sdf: Affine,
        target: f64,
        t_min: f64,
        t_max: f64,
    ) -> Option<f64> {
        let f = |t: f64| sdf.distance(curve_to_sdf * curve.point_at(t)) - target;

        let mut lo = t_min;
        let mut hi = t_max;
        let mut f_lo = f(lo);
        let f_hi = f(hi);
        let product = f_lo * f_hi;
        if product > 0.0 || product.is_nan() {
            return None;
        }

        let mut mid = 0.5 * (lo + hi);
        for _ in 0..self.max_iterations {
            mid = 0.5 * (lo + hi);
            let f_mid = f(mid);
            if f_mid.abs() < self.tolerance {
                return Some(mid);
            }
            if f_lo * f_mid <= 0.0 {
                hi = mid;
            } else {
                lo = mid;
                f_lo = f_mid;
            }
        }
        Some(mid)
    }
}

/// [`RootFinder::find_point_at_distance`] with [`RootFinder::DEFAULT`].
pub fn find_point_at_distance(
    sdf: &(impl Sdf + ?Sized),
    curve: &Curve,
    curve_to_sdf: Affine,
    target: f64,
    t_min: f64,
    t_max: f64,
) -> Option<f64> {
    RootFinder::DEFAULT.find_point_at_distance(sdf, curve, curve_to_sdf, target, t_min, t_max)
}
