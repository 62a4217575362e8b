// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer contract.
//!
//! Stratum computes geometry; drawing it is someone else's job. A renderer
//! keeps one native object per element (a GPU batch entry, an SVG node, a
//! canvas display-list item) and is responsible for:
//!
//! - **Binding**: assigning a [`TargetId`] to each element it creates a native
//!   object for, via [`Scene::set_render_target`]. Elements updated without
//!   one are reported as [`Warning::Detached`].
//!
//! - **Applying**: implementing [`Renderer::apply`] to patch its native tree
//!   from a [`SceneChanges`], reading current values from the [`Scene`].
//!   Child lists and the top-level order arrive already sorted and filtered.
//!
//! - **Measuring**: feeding text extents back into label values with
//!   [`Scene::edit`] when it lays text out.
//!
//! [`TargetId`]: crate::element::TargetId
//! [`Warning::Detached`]: crate::trace::Warning::Detached
//! [`Scene::set_render_target`]: crate::scene::Scene::set_render_target
//! [`Scene::edit`]: crate::scene::Scene::edit

use crate::scene::{Scene, SceneChanges};

/// Applies an update pass's changes to a native presentation tree.
///
/// Retained renderers and test doubles implement this trait, enabling
/// generic frame loops.
///
/// # Frame loop pseudocode
///
/// ```rust,ignore
/// fn on_frame(scene: &mut Scene, renderer: &mut impl Renderer) {
///     // Mutate: input handling and animation edit values.
///     scene.edit(node, |data, sink| {
///         if let ElementKind::Shape(s) = &mut data.kind {
///             s.position.set(pointer, sink);
///         }
///     });
///
///     // Update: recompute spaces, edges, child order, style.
///     let changes = scene.update();
///
///     // Present: create, patch, and drop native objects.
///     renderer.apply(scene, &changes);
/// }
/// ```
pub trait Renderer {
    /// Applies the given [`SceneChanges`], reading current values from
    /// `scene` as needed.
    fn apply(&mut self, scene: &Scene, changes: &SceneChanges);
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::{Affine, Point, Size};

    use super::*;
    use crate::element::{ElementId, ShapeKind, TargetId};

    /// Mirrors world transforms of live elements.
    #[derive(Default)]
    struct MirrorRenderer {
        live: Vec<(ElementId, Affine)>,
        top: Vec<ElementId>,
        applied: u32,
    }

    impl Renderer for MirrorRenderer {
        fn apply(&mut self, scene: &Scene, changes: &SceneChanges) {
            self.applied += 1;
            self.live.retain(|(id, _)| !changes.removed.contains(id));
            if let Some(roots) = &changes.roots {
                self.top.clone_from(roots);
            }
            for &id in &changes.geometry {
                let xf = scene.geometry(id).world_transform;
                match self.live.iter_mut().find(|(e, _)| *e == id) {
                    Some(slot) => slot.1 = xf,
                    None => self.live.push((id, xf)),
                }
            }
        }
    }

    #[test]
    fn renderer_follows_changes() {
        let mut scene = Scene::new();
        let g = scene.create_group(None);
        let s = scene.create_shape(Some(g), ShapeKind::Circle, Point::ZERO, Size::new(1.0, 1.0));
        scene.set_render_target(g, Some(TargetId(1)));
        scene.set_render_target(s, Some(TargetId(2)));

        let mut renderer = MirrorRenderer::default();
        let changes = scene.update();
        renderer.apply(&scene, &changes);
        assert_eq!(renderer.live.len(), 2);
        assert_eq!(renderer.top, [g]);

        scene.set_transform(g, Affine::translate((4.0, 0.0)));
        let changes = scene.update();
        renderer.apply(&scene, &changes);
        assert_eq!(renderer.live[1], (s, Affine::translate((4.0, 0.0))));

        scene.destroy(s);
        let changes = scene.update();
        renderer.apply(&scene, &changes);
        assert_eq!(renderer.live.len(), 1);
        assert_eq!(renderer.applied, 3);
    }
}
