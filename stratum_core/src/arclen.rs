// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arc-length reparametrization.
//!
//! An [`ArcLengthMapper`] samples a curve into a table of
//! `(cumulative chord length, t)` pairs and answers "which `t` lies at this
//! fraction of the total length". The table is a snapshot: after the curve
//! changes, [`update`](ArcLengthMapper::update) must be called again or
//! lookups silently answer for the old curve.

use alloc::vec::Vec;

use crate::curve::Curve;

/// Sampled arc-length table for one curve.
#[derive(Clone, Debug, PartialEq)]
pub struct ArcLengthMapper {
    resolution: usize,
    /// `(cumulative length, t)`, both non-decreasing.
    samples: Vec<(f64, f64)>,
}

impl Default for ArcLengthMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ArcLengthMapper {
    /// Number of chords used by [`new`](Self::new).
    pub const DEFAULT_RESOLUTION: usize = 64;

    /// Creates an empty mapper with the default resolution.
    #[must_use]
    pub fn new() -> Self {
        Self::with_resolution(Self::DEFAULT_RESOLUTION)
    }

    /// Creates an empty mapper sampling `resolution` chords (at least one).
    #[must_use]
    pub fn with_resolution(resolution: usize) -> Self {
        Self {
            resolution: resolution.max(1),
            samples: Vec::new(),
        }
    }

    /// Creates a mapper and samples `curve` into it.
    #[must_use]
    pub fn from_curve(curve: &Curve, resolution: usize) -> Self {
        let mut mapper = Self::with_resolution(resolution);
        mapper.update(curve);
        mapper
    }

    /// Returns the number of chords sampled per update.
    #[must_use]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Rebuilds the table from `curve`.
    pub fn update(&mut self, curve: &Curve) {
        self.samples.clear();
        self.samples.reserve(self.resolution + 1);

        let mut prev = curve.point_at(0.0);
        let mut length = 0.0;
        self.samples.push((0.0, 0.0));
        for i in 1..=self.resolution {
            let t = i as f64 / self.resolution as f64;
            let p = curve.point_at(t);
            length += (p - prev).hypot();
            self.samples.push((length, t));
            prev = p;
        }
    }

    /// Returns the total sampled length, or zero before the first update.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.samples.last().map_or(0.0, |&(len, _)| len)
    }

    /// Returns the parameter at fraction `u` of the total length.
    ///
    /// `u` is clamped to `[0, 1]`. With no table, or a curve of zero length,
    /// the clamped `u` is returned unchanged.
    #[must_use]
    pub fn t_from_u(&self, u: f64) -> f64 {
        let u = u.clamp(0.0, 1.0);
        let total = self.length();
        if self.samples.len() < 2 || total <= 0.0 {
            return u;
        }

        let target = u * total;
        let i = self.samples.partition_point(|&(len, _)| len < target);
        if i == 0 {
            return self.samples[0].1;
        }
        let Some(&(l1, t1)) = self.samples.get(i) else {
            return 1.0;
        };
        let (l0, t0) = self.samples[i - 1];
        let span = l1 - l0;
        if span <= 0.0 {
            return t1;
        }
        t0 + (target - l0) / span * (t1 - t0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_is_already_uniform() {
        let line = Curve::line((0.0, 0.0), (10.0, 0.0));
        let m = ArcLengthMapper::from_curve(&line, 8);
        assert!((m.length() - 10.0).abs() < 1e-9);
        for u in [0.0, 0.1, 0.33, 0.5, 0.9, 1.0] {
            assert!((m.t_from_u(u) - u).abs() < 1e-9, "u = {u}");
        }
    }

    #[test]
    fn cubic_fraction_matches_length() {
        // Control points bunched at the start: t is far from uniform.
        let c = Curve::cubic((0.0, 0.0), (0.5, 0.0), (1.0, 0.0), (20.0, 0.0));
        let m = ArcLengthMapper::from_curve(&c, ArcLengthMapper::DEFAULT_RESOLUTION);
        assert!((m.length() - c.length()).abs() < 1e-6);

        let t = m.t_from_u(0.5);
        assert!((t - 0.5).abs() > 0.05, "parametrization should be non-uniform");
        let half = c.subsegment(0.0, t).length();
        assert!((half / c.length() - 0.5).abs() < 0.01, "{half}");
    }

    #[test]
    fn u_is_clamped() {
        let line = Curve::line((0.0, 0.0), (4.0, 3.0));
        let m = ArcLengthMapper::from_curve(&line, 4);
        assert_eq!(m.t_from_u(-1.0), 0.0);
        assert!((m.t_from_u(2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_and_degenerate_pass_u_through() {
        let m = ArcLengthMapper::new();
        assert_eq!(m.length(), 0.0);
        assert_eq!(m.t_from_u(0.3), 0.3);

        let dot = Curve::line((1.0, 1.0), (1.0, 1.0));
        let m = ArcLengthMapper::from_curve(&dot, 16);
        assert_eq!(m.t_from_u(0.7), 0.7);
    }

    #[test]
    fn update_replaces_table() {
        let mut m = ArcLengthMapper::with_resolution(0);
        assert_eq!(m.resolution(), 1);
        m.update(&Curve::line((0.0, 0.0), (1.0, 0.0)));
        m.update(&Curve::line((0.0, 0.0), (0.0, 7.0)));
        assert!((m.length() - 7.0).abs() < 1e-12);
    }
}
