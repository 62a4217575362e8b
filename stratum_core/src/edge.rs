// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connector routing.
//!
//! [`route_edge`] draws a curve between the centres of two endpoint shapes,
//! then trims each end back to where the curve sits `padding` away from the
//! shape's boundary, so the connector touches the drawn outline instead of
//! overlapping it.
//!
//! The start crossing is searched on `[0, 0.5]` and the end crossing on
//! `[0.5, 1]`. Keeping each search on its own half stops a bent connector
//! from reporting the far side of the opposite shape. An end without an SDF,
//! or whose search finds no crossing, stays at the shape centre.

use alloc::vec::Vec;

use kurbo::{Affine, Point, Vec2};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::arclen::ArcLengthMapper;
use crate::curve::Curve;
use crate::root::RootFinder;
use crate::sdf::ShapeSdf;

/// Connector shape between the two endpoint centres.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Routing {
    /// A line segment.
    #[default]
    Straight,
    /// A symmetric cubic bowed sideways by `bend` chord lengths.
    ///
    /// Positive values bow to the left of the direction of travel.
    Arc {
        /// Sideways offset of both inner control points, as a fraction of the
        /// chord length.
        bend: f64,
    },
}

/// Names one end of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeEnd {
    /// The start, at the `from` element.
    From,
    /// The end, at the `to` element.
    To,
}

/// One end of a connector, expressed in the connector's space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Endpoint {
    /// The shape's distance field, if it has one.
    pub sdf: Option<ShapeSdf>,
    /// Maps connector-space points into the SDF's local space.
    pub curve_to_sdf: Affine,
    /// Where the untrimmed connector starts or ends.
    pub center: Point,
}

/// Connector settings, all lengths in the connector's space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeParams {
    /// Curve family.
    pub routing: Routing,
    /// Gap left between each shape boundary and the connector.
    pub padding: f64,
    /// Start of the drawn part, as a fraction of the trimmed range.
    pub path_from: f64,
    /// End of the drawn part, as a fraction of the trimmed range.
    pub path_to: f64,
    /// Number of evenly spaced decorations.
    pub markers: u32,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            routing: Routing::Straight,
            padding: 0.0,
            path_from: 0.0,
            path_to: 1.0,
            markers: 0,
        }
    }
}

/// A decoration placed along a connector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    /// Position on the curve.
    pub point: Point,
    /// Unit direction of travel at `point`.
    pub tangent: Vec2,
}

/// Output of [`route_edge`].
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRoute {
    /// The drawn curve.
    pub curve: Curve,
    /// Parameter on the untrimmed curve where the start boundary was found.
    pub start_crossing: Option<f64>,
    /// Parameter on the untrimmed curve where the end boundary was found.
    pub end_crossing: Option<f64>,
    /// Evenly spaced decorations.
    pub markers: Vec<Marker>,
}

/// Builds the untrimmed connector from `p0` to `p3`.
#[must_use]
pub fn template(routing: Routing, p0: Point, p3: Point) -> Curve {
    match routing {
        Routing::Straight => Curve::line(p0, p3),
        Routing::Arc { bend } => {
            let chord = p3 - p0;
            let normal = Vec2::new(-chord.y, chord.x) * bend;
            Curve::cubic(
                p0,
                p0 + chord / 3.0 + normal,
                p0 + chord * (2.0 / 3.0) + normal,
                p3,
            )
        }
    }
}

/// Routes a connector between two endpoints.
#[must_use]
pub fn route_edge(
    from: &Endpoint,
    to: &Endpoint,
    params: &EdgeParams,
    finder: &RootFinder,
    arc_resolution: usize,
) -> EdgeRoute {
    let full = template(params.routing, from.center, to.center);

    let start_crossing = crossing(from, &full, params.padding, finder, 0.0, 0.5);
    let end_crossing = crossing(to, &full, params.padding, finder, 0.5, 1.0);

    let t0 = start_crossing.unwrap_or(0.0);
    let t1 = end_crossing.unwrap_or(1.0);
    let a = lerp(t0, t1, params.path_from);
    let b = lerp(t0, t1, params.path_to);

    let mut curve = full;
    full.subdivide_into(&mut curve, a, b);

    let markers = place_markers(&curve, params.markers, arc_resolution);

    EdgeRoute {
        curve,
        start_crossing,
        end_crossing,
        markers,
    }
}

/// Places `count` markers at arc-length fractions `(i + 1) / (count + 1)`.
#[must_use]
pub fn place_markers(curve: &Curve, count: u32, arc_resolution: usize) -> Vec<Marker> {
    if count == 0 {
        return Vec::new();
    }
    let mapper = ArcLengthMapper::from_curve(curve, arc_resolution);
    (0..count)
        .map(|i| {
            let u = f64::from(i + 1) / f64::from(count + 1);
            let t = mapper.t_from_u(u);
            Marker {
                point: curve.point_at(t),
                tangent: curve.tangent_at(t),
            }
        })
        .collect()
}

/// Exact at both ends, so an untrimmed end stays exactly on its centre.
fn lerp(a: f64, b: f64, f: f64) -> f64 {
    a * (1.0 - f) + b * f
}

fn crossing(
    end: &Endpoint,
    curve: &Curve,
    padding: f64,
    finder: &RootFinder,
    t_min: f64,
    t_max: f64,
) -> Option<f64> {
    let sdf = end.sdf?;
    // Padding is measured in connector space; the SDF wants its own units.
    let scale = end.curve_to_sdf.determinant().abs().sqrt();
    finder.find_point_at_distance(&sdf, curve, end.curve_to_sdf, padding * scale, t_min, t_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdf::{CircleSdf, RoundedRectSdf, Sdf};

    const TOL: f64 = 1e-2;

    fn circle_at(x: f64, radius: f64) -> Endpoint {
        Endpoint {
            sdf: Some(ShapeSdf::Circle(CircleSdf { radius })),
            curve_to_sdf: Affine::translate((-x, 0.0)),
            center: Point::new(x, 0.0),
        }
    }

    fn route(from: &Endpoint, to: &Endpoint, params: EdgeParams) -> EdgeRoute {
        route_edge(from, to, &params, &RootFinder::default(), 64)
    }

    #[test]
    fn straight_edge_touches_both_circles() {
        let r = route(&circle_at(0.0, 1.0), &circle_at(10.0, 1.0), EdgeParams::default());
        assert!((r.curve.start().x - 1.0).abs() < TOL);
        assert!((r.curve.end().x - 9.0).abs() < TOL);
        assert!(r.start_crossing.is_some() && r.end_crossing.is_some());
    }

    #[test]
    fn padding_leaves_a_gap() {
        let params = EdgeParams {
            padding: 1.0,
            ..EdgeParams::default()
        };
        let r = route(&circle_at(0.0, 1.0), &circle_at(10.0, 1.0), params);
        assert!((r.curve.start().x - 2.0).abs() < TOL);
        assert!((r.curve.end().x - 8.0).abs() < TOL);
    }

    #[test]
    fn padding_is_converted_into_sdf_units() {
        // SDF space is half the size of connector space: a radius-1 circle
        // there is radius 2 here.
        let mut from = circle_at(0.0, 1.0);
        from.curve_to_sdf = Affine::scale(0.5);
        let params = EdgeParams {
            padding: 1.0,
            ..EdgeParams::default()
        };
        let r = route(&from, &circle_at(20.0, 1.0), params);
        assert!((r.curve.start().x - 3.0).abs() < 2.0 * TOL);
    }

    #[test]
    fn overlapping_shapes_fall_back_to_centres() {
        let r = route(&circle_at(0.0, 6.0), &circle_at(10.0, 6.0), EdgeParams::default());
        assert_eq!(r.start_crossing, None);
        assert_eq!(r.end_crossing, None);
        assert_eq!(r.curve.start(), Point::new(0.0, 0.0));
        assert_eq!(r.curve.end(), Point::new(10.0, 0.0));
    }

    #[test]
    fn missing_sdf_is_untrimmed() {
        let mut to = circle_at(10.0, 1.0);
        to.sdf = None;
        let r = route(&circle_at(0.0, 1.0), &to, EdgeParams::default());
        assert!(r.start_crossing.is_some());
        assert_eq!(r.end_crossing, None);
        assert_eq!(r.curve.end(), Point::new(10.0, 0.0));
    }

    #[test]
    fn path_range_is_proportional_to_trimmed_range() {
        let params = EdgeParams {
            path_from: 0.25,
            path_to: 0.75,
            ..EdgeParams::default()
        };
        let r = route(&circle_at(0.0, 1.0), &circle_at(10.0, 1.0), params);
        assert!((r.curve.start().x - 3.0).abs() < TOL);
        assert!((r.curve.end().x - 7.0).abs() < TOL);
    }

    #[test]
    fn markers_are_evenly_spaced() {
        let params = EdgeParams {
            markers: 3,
            ..EdgeParams::default()
        };
        let r = route(&circle_at(0.0, 1.0), &circle_at(10.0, 1.0), params);
        let xs: Vec<f64> = r.markers.iter().map(|m| m.point.x).collect();
        assert_eq!(xs.len(), 3);
        for (x, want) in xs.iter().zip([3.0, 5.0, 7.0]) {
            assert!((x - want).abs() < 2.0 * TOL, "{xs:?}");
        }
        for m in &r.markers {
            assert!((m.tangent - Vec2::new(1.0, 0.0)).hypot() < 1e-9);
        }
    }

    #[test]
    fn arc_bows_and_still_touches_boundaries() {
        let from = Endpoint {
            sdf: Some(ShapeSdf::RoundedRect(RoundedRectSdf {
                half_extents: Vec2::new(1.0, 1.0),
                radius: 0.2,
            })),
            curve_to_sdf: Affine::IDENTITY,
            center: Point::ZERO,
        };
        let to = circle_at(10.0, 1.0);
        let params = EdgeParams {
            routing: Routing::Arc { bend: 0.3 },
            ..EdgeParams::default()
        };
        let r = route(&from, &to, params);
        assert!(matches!(r.curve, Curve::Cubic(_)));
        assert!(r.curve.point_at(0.5).y > 1.0, "bows to the left");

        let (Some(from_sdf), Some(to_sdf)) = (from.sdf, to.sdf) else {
            unreachable!()
        };
        assert!(from_sdf.distance(r.curve.start()).abs() < TOL);
        assert!(to_sdf.distance(to.curve_to_sdf * r.curve.end()).abs() < TOL);
    }
}
