// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between spaces.
//!
//! Every conversion pivots through world coordinates and refreshes the two
//! spaces involved first, so callers never observe a stale cache.

use kurbo::{Affine, Point, Size, Vec2};

use super::id::SpaceId;
use super::store::SpaceStore;

impl SpaceStore {
    /// Returns the transform mapping coordinates in `from` to coordinates in
    /// `to`.
    pub fn transform_between(&mut self, from: SpaceId, to: SpaceId) -> Affine {
        self.validate(from);
        self.validate(to);
        if from == to {
            return Affine::IDENTITY;
        }
        self.update_idx(from.idx);
        self.update_idx(to.idx);
        self.world_to_space[to.idx as usize] * self.space_to_world[from.idx as usize]
    }

    /// Converts a point from `from` coordinates to `to` coordinates.
    pub fn convert_point(&mut self, point: Point, from: SpaceId, to: SpaceId) -> Point {
        if from == to {
            return point;
        }
        self.transform_between(from, to) * point
    }

    /// Converts a displacement, ignoring translation.
    pub fn convert_offset(&mut self, offset: Vec2, from: SpaceId, to: SpaceId) -> Vec2 {
        if from == to {
            return offset;
        }
        let [a, b, c, d, _, _] = self.transform_between(from, to).as_coeffs();
        Vec2::new(a * offset.x + c * offset.y, b * offset.x + d * offset.y)
    }

    /// Converts a scalar length using the accumulated uniform scales.
    pub fn convert_length(&mut self, length: f64, from: SpaceId, to: SpaceId) -> f64 {
        self.validate(from);
        self.validate(to);
        if from == to {
            return length;
        }
        self.update_idx(from.idx);
        self.update_idx(to.idx);
        length * self.scale_to_world[from.idx as usize] / self.scale_to_world[to.idx as usize]
    }

    /// Converts a box size component-wise, as an offset, then takes the
    /// absolute value of each component.
    pub fn convert_extents(&mut self, extents: Size, from: SpaceId, to: SpaceId) -> Size {
        let v = self.convert_offset(extents.to_vec2(), from, to);
        Size::new(v.x.abs(), v.y.abs())
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Affine, Point, Size, Vec2};

    use crate::space::SpaceStore;

    const EPS: f64 = 1e-9;

    #[test]
    fn same_space_is_identity() {
        let mut store = SpaceStore::new();
        let a = store.create_space(store.world());
        store.set_local_transform(a, Affine::scale(7.0));
        let p = Point::new(1.5, -2.0);
        assert_eq!(store.convert_point(p, a, a), p);
        assert_eq!(store.convert_length(3.0, a, a), 3.0);
        assert_eq!(store.transform_between(a, a), Affine::IDENTITY);
        assert!(store.is_dirty(a), "identity short-circuit does not update");
    }

    #[test]
    fn point_round_trip() {
        let mut store = SpaceStore::new();
        let world = store.world();
        let a = store.create_space(world);
        let a2 = store.create_space(a);
        let b = store.create_space(world);
        store.set_local_transform(a, Affine::translate((4.0, 1.0)) * Affine::rotate(0.5));
        store.set_local_transform(a2, Affine::scale(3.0));
        store.set_local_transform(b, Affine::rotate(-1.2) * Affine::scale_non_uniform(2.0, 0.5));

        for p in [
            Point::ZERO,
            Point::new(1.0, 2.0),
            Point::new(-30.5, 12.25),
            Point::new(1e3, -1e3),
        ] {
            let q = store.convert_point(p, a2, b);
            let r = store.convert_point(q, b, a2);
            assert!((r - p).hypot() < EPS, "{p:?} -> {q:?} -> {r:?}");
        }
    }

    #[test]
    fn offset_ignores_translation() {
        let mut store = SpaceStore::new();
        let world = store.world();
        let a = store.create_space(world);
        store.set_local_transform(a, Affine::translate((100.0, 50.0)) * Affine::scale(2.0));

        let v = store.convert_offset(Vec2::new(1.0, -1.0), a, world);
        assert!((v - Vec2::new(2.0, -2.0)).hypot() < EPS);
    }

    #[test]
    fn extents_are_non_negative() {
        let mut store = SpaceStore::new();
        let world = store.world();
        let a = store.create_space(world);
        store.set_local_transform(a, Affine::FLIP_X * Affine::scale(2.0));

        let s = store.convert_extents(Size::new(3.0, 4.0), a, world);
        assert!((s.width - 6.0).abs() < EPS);
        assert!((s.height - 8.0).abs() < EPS);
    }

    #[test]
    fn length_through_uniform_scale() {
        let mut store = SpaceStore::new();
        let parent = store.create_space(store.world());
        let child = store.create_space(parent);
        store.set_local_transform(child, Affine::scale(100.0));

        assert!((store.convert_length(1.0, child, parent) - 100.0).abs() < EPS);
        assert!((store.convert_length(100.0, parent, child) - 1.0).abs() < EPS);
    }

    #[test]
    fn conversion_sees_later_mutation() {
        let mut store = SpaceStore::new();
        let world = store.world();
        let a = store.create_space(world);
        store.set_local_transform(a, Affine::translate((1.0, 0.0)));
        let p = store.convert_point(Point::ZERO, a, world);
        assert!((p.x - 1.0).abs() < EPS);

        store.set_local_transform(a, Affine::translate((5.0, 0.0)));
        let p = store.convert_point(Point::ZERO, a, world);
        assert!((p.x - 5.0).abs() < EPS);
    }
}
