// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene and its update pass.
//!
//! A [`Scene`] owns a [`SpaceStore`] and an [`ElementStore`] and keeps them
//! consistent:
//!
//! - every group element owns a space, parented under the space of the
//!   group's own parent, so the space tree mirrors the group structure;
//! - a dependency graph on the [`GEOMETRY`](crate::dirty::GEOMETRY) channel
//!   records which space each element is positioned in and which elements
//!   each edge connects.
//!
//! Mutations go through [`Scene::edit`] (values), [`Scene::set_transform`]
//! (group spaces) and the structural methods. They only mark things dirty.
//! [`Scene::update`] then runs once per frame:
//!
//! 1. **Spaces**: recompute every invalidated space, parents first, and
//!    invalidate the elements positioned in them.
//! 2. **Dependents**: drain the geometry graph and mark every element whose
//!    inputs moved, such as an edge whose endpoint shape was dragged.
//! 3. **Elements**: reconcile the top-level order, then walk the dirty part
//!    of the element tree depth-first, reconciling child order, recomputing
//!    geometry, and cascading style into changed or newly attached children.
//!
//! The returned [`SceneChanges`] is what a [`Renderer`](crate::backend::Renderer)
//! applies. A second update without intervening mutation returns an empty
//! change set.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Affine, Point, Size};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::arclen::ArcLengthMapper;
use crate::dirty;
use crate::edge::{self, EdgeEnd, EdgeParams, Endpoint};
use crate::element::{
    EdgeData, ElementData, ElementGeometry, ElementId, ElementKind, ElementStore, GroupData,
    LabelData, ShapeData, ShapeKind, TargetId,
};
use crate::root::RootFinder;
use crate::space::{SpaceId, SpaceStore};
#[cfg(feature = "trace-rich")]
use crate::trace::{ChildrenReplacedEvent, ElementUpdateEvent};
use crate::trace::{PassBeginEvent, PassEndEvent, Tracer, Warning, WarningEvent};
use crate::value::{Invalidations, Owner};

/// High bit set on space keys in the geometry graph; element keys are raw ids.
const SPACE_KEY: u32 = 1 << 31;

fn element_key(id: ElementId) -> u32 {
    id.0
}

fn space_key(id: SpaceId) -> u32 {
    id.idx | SPACE_KEY
}

/// Tunables for the update pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    /// Bisection settings used to trim edges.
    pub root_finder: RootFinder,
    /// Chords sampled when placing edge markers.
    pub arc_length_resolution: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            root_finder: RootFinder::DEFAULT,
            arc_length_resolution: ArcLengthMapper::DEFAULT_RESOLUTION,
        }
    }
}

/// A new rendered child list for one element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildrenChange {
    /// The element whose children changed.
    pub parent: ElementId,
    /// Active children in draw order.
    pub children: Vec<ElementId>,
}

/// Everything one [`Scene::update`] call changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneChanges {
    /// Pass counter, starting at 1.
    pub pass: u64,
    /// Spaces whose cached transforms were recomputed.
    pub spaces: Vec<SpaceId>,
    /// Elements whose geometry was recomputed, parents before children.
    pub geometry: Vec<ElementId>,
    /// Elements whose rendered child list was replaced.
    pub children: Vec<ChildrenChange>,
    /// New rendered order of the parentless elements, if it changed.
    pub roots: Option<Vec<ElementId>>,
    /// Elements created since the previous update.
    pub added: Vec<ElementId>,
    /// Elements destroyed since the previous update.
    pub removed: Vec<ElementId>,
    /// Problems recovered from during the pass.
    pub warnings: Vec<Warning>,
}

impl SceneChanges {
    /// Returns `true` if the pass changed nothing and raised no warning.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
            && self.geometry.is_empty()
            && self.children.is_empty()
            && self.roots.is_none()
            && self.added.is_empty()
            && self.removed.is_empty()
            && self.warnings.is_empty()
    }
}

/// A retained 2D scene.
#[derive(Debug)]
pub struct Scene {
    spaces: SpaceStore,
    elements: ElementStore,
    graph: DirtyTracker<u32>,
    invalidated: Invalidations,
    /// Endpoints each edge currently holds a graph dependency on.
    edge_links: BTreeMap<ElementId, [Option<ElementId>; 2]>,
    config: SceneConfig,
    pass: u64,
    pending_added: Vec<ElementId>,
    pending_removed: Vec<ElementId>,
    pending_warnings: Vec<Warning>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates an empty scene with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Creates an empty scene.
    #[must_use]
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            spaces: SpaceStore::new(),
            elements: ElementStore::new(),
            graph: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            invalidated: Invalidations::new(),
            edge_links: BTreeMap::new(),
            config,
            pass: 0,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            pending_warnings: Vec::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Returns the number of completed update passes.
    #[must_use]
    pub fn pass(&self) -> u64 {
        self.pass
    }

    /// Returns the world space.
    #[must_use]
    pub fn world(&self) -> SpaceId {
        self.spaces.world()
    }

    /// Returns the space store.
    #[must_use]
    pub fn spaces(&self) -> &SpaceStore {
        &self.spaces
    }

    /// Returns the space store for conversions and free-standing spaces.
    pub fn spaces_mut(&mut self) -> &mut SpaceStore {
        &mut self.spaces
    }

    /// Returns the element store.
    #[must_use]
    pub fn elements(&self) -> &ElementStore {
        &self.elements
    }

    /// Returns an element's values.
    #[must_use]
    pub fn data(&self, id: ElementId) -> &ElementData {
        self.elements.data(id)
    }

    /// Returns the geometry computed by the last update.
    #[must_use]
    pub fn geometry(&self, id: ElementId) -> &ElementGeometry {
        self.elements.geometry(id)
    }

    /// Returns the space owned by a group element.
    #[must_use]
    pub fn group_space(&self, id: ElementId) -> Option<SpaceId> {
        match &self.elements.data(id).kind {
            ElementKind::Group(g) => Some(g.space),
            _ => None,
        }
    }

    // -- Creation and destruction --

    /// Creates a group with a fresh identity-transformed space.
    pub fn create_group(&mut self, parent: Option<ElementId>) -> ElementId {
        let frame = self.frame_for_parent(parent);
        let space = self.spaces.create_space(frame);
        self.insert(parent, ElementKind::Group(GroupData { space }))
    }

    /// Creates a shape centred on `position`.
    pub fn create_shape(
        &mut self,
        parent: Option<ElementId>,
        shape: ShapeKind,
        position: Point,
        extents: Size,
    ) -> ElementId {
        self.insert(
            parent,
            ElementKind::Shape(ShapeData::new(shape, position, extents)),
        )
    }

    /// Creates a label centred on `position`, with zero extents until the
    /// text is measured.
    pub fn create_label(
        &mut self,
        parent: Option<ElementId>,
        text: impl Into<String>,
        position: Point,
    ) -> ElementId {
        self.insert(parent, ElementKind::Label(LabelData::new(text, position)))
    }

    /// Creates a straight connector from `from` to `to`.
    pub fn create_edge(
        &mut self,
        parent: Option<ElementId>,
        from: ElementId,
        to: ElementId,
    ) -> ElementId {
        self.elements.validate(from);
        self.elements.validate(to);
        let id = self.insert(parent, ElementKind::Edge(EdgeData::new(from, to)));
        self.sync_edge_links(id);
        id
    }

    /// Destroys a childless element. A group's space is destroyed with it.
    ///
    /// Edges attached to it are re-routed on the next update and report a
    /// missing endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the element has children.
    pub fn destroy(&mut self, id: ElementId) {
        assert!(
            self.elements.children(id).is_empty(),
            "cannot destroy element with children"
        );

        let dependents: Vec<ElementId> = self
            .edge_links
            .iter()
            .filter(|(edge, ends)| **edge != id && ends.contains(&Some(id)))
            .map(|(&edge, _)| edge)
            .collect();
        for edge in dependents {
            self.elements.mark_dirty(edge);
        }

        if let Some(ends) = self.edge_links.remove(&id) {
            for end in ends.into_iter().flatten() {
                self.graph
                    .remove_dependency(element_key(id), element_key(end), dirty::GEOMETRY);
            }
        }
        self.graph.remove_key(element_key(id));

        let data = self.elements.remove(id);
        if let ElementKind::Group(g) = data.kind {
            self.graph.remove_key(space_key(g.space));
            self.spaces.destroy_space(g.space);
        }
        self.pending_removed.push(id);
    }

    // -- Mutation --

    /// Mutates an element's values.
    ///
    /// `f` receives the data bundle and the sink its
    /// [`Value`](crate::value::Value) setters report to. Once it returns, every
    /// reported owner is marked dirty, together with whatever depends on it.
    pub fn edit<R>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut ElementData, &mut Invalidations) -> R,
    ) -> R {
        let data = self.elements.data_mut(id);
        let result = f(data, &mut self.invalidated);
        // Values replaced wholesale inside `f` lost their owner.
        data.attach(Owner::Element(id));

        self.flush_edits();
        self.sync_edge_links(id);
        result
    }

    /// Sets the local transform of a group's space.
    ///
    /// # Panics
    ///
    /// Panics if `group` is not a group.
    pub fn set_transform(&mut self, group: ElementId, transform: Affine) {
        let Some(space) = self.group_space(group) else {
            panic!("set_transform needs a group, got {group:?}");
        };
        self.spaces.set_local_transform(space, transform);
    }

    /// Moves an element under `parent`, or makes it a root.
    ///
    /// The element is re-expressed in the space of its new parent: its values
    /// keep their numbers, so it moves on screen if the spaces differ.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale, or if `parent` is `id` or one of its
    /// descendants.
    pub fn set_parent(&mut self, id: ElementId, parent: Option<ElementId>) {
        self.elements.set_parent(id, parent);
        self.refresh_frame(id);
    }

    /// Binds or unbinds the renderer object of an element.
    pub fn set_render_target(&mut self, id: ElementId, target: Option<TargetId>) {
        self.elements.set_target(id, target);
    }

    // -- Update pass --

    /// Brings every derived quantity up to date and reports what changed.
    pub fn update(&mut self) -> SceneChanges {
        self.update_traced(&mut Tracer::none())
    }

    /// Like [`update`](Self::update), reporting progress to `tracer`.
    pub fn update_traced(&mut self, tracer: &mut Tracer<'_>) -> SceneChanges {
        self.pass += 1;
        let pass = self.pass;
        tracer.pass_begin(&PassBeginEvent { pass });

        let mut changes = SceneChanges {
            pass,
            ..SceneChanges::default()
        };
        for warning in core::mem::take(&mut self.pending_warnings) {
            warn(&mut changes, tracer, warning);
        }

        // 1. Spaces, parents first.
        let spaces = self.spaces.evaluate();
        for &space in &spaces {
            self.graph
                .mark_with(space_key(space), dirty::GEOMETRY, &EagerPolicy);
            let scale = self.spaces.local_scale(space);
            if scale == 0.0 || !scale.is_finite() {
                warn(&mut changes, tracer, Warning::DegenerateSpace(space));
            }
        }
        changes.spaces = spaces;

        // 2. Elements whose inputs moved.
        let affected: Vec<u32> = self
            .graph
            .drain(dirty::GEOMETRY)
            .affected()
            .deterministic()
            .run()
            .collect();
        for key in affected {
            if key & SPACE_KEY == 0 {
                let id = ElementId(key);
                if self.elements.contains(id) {
                    self.elements.mark_dirty(id);
                }
            }
        }

        // 3. Top-level order, then the element tree walk.
        changes.roots = self.elements.reconcile_roots().map(<[_]>::to_vec);
        for root in self.elements.roots() {
            if self.elements.is_dirty(root) {
                self.visit(root, &mut changes, tracer);
            }
        }

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);

        tracer.pass_end(&PassEndEvent {
            pass,
            spaces: changes.spaces.len(),
            elements: changes.geometry.len(),
            warnings: changes.warnings.len(),
        });
        changes
    }

    fn visit(&mut self, id: ElementId, changes: &mut SceneChanges, tracer: &mut Tracer<'_>) {
        if self.elements.needs_reconcile(id)
            && let Some(order) = self.elements.reconcile_children(id)
        {
            let children = order.to_vec();
            #[cfg(feature = "trace-rich")]
            tracer.children_replaced(&ChildrenReplacedEvent {
                pass: changes.pass,
                parent: id,
                count: children.len(),
            });
            changes.children.push(ChildrenChange {
                parent: id,
                children,
            });
        }

        self.recompute_geometry(id, changes, tracer);
        changes.geometry.push(id);
        if self.elements.target(id).is_none() {
            warn(changes, tracer, Warning::Detached(id));
        }
        #[cfg(feature = "trace-rich")]
        tracer.element_update(&ElementUpdateEvent {
            pass: changes.pass,
            element: id,
            kind: self.elements.data(id).kind.name(),
        });

        let style = self.elements.data(id).style.clone();
        let cascade = style.is_dirty();
        let children = self.elements.children(id).to_vec();
        for child in children {
            // A freshly attached child inherits even from a clean parent.
            let attached = self.elements.needs_inherit(child);
            if (cascade || attached)
                && self
                    .elements
                    .data_mut(child)
                    .style
                    .inherit_from(&style, &mut self.invalidated)
            {
                self.flush_cascade();
            }
            if attached {
                self.elements.clear_needs_inherit(child);
            }
            if self.elements.is_dirty(child) {
                self.visit(child, changes, tracer);
            }
        }

        self.elements.data_mut(id).clear_dirty();
        self.elements.clear_dirty(id);
    }

    fn recompute_geometry(
        &mut self,
        id: ElementId,
        changes: &mut SceneChanges,
        tracer: &mut Tracer<'_>,
    ) {
        let frame = self.elements.frame(id);
        self.spaces.update(frame);
        let world_transform = self.spaces.space_to_world(frame);

        let data = self.elements.data(id);
        let bounds = data.bounds();
        let edge = match &data.kind {
            ElementKind::Edge(e) => Some((
                e.endpoints(),
                EdgeParams {
                    routing: *e.routing.get(),
                    padding: *e.padding.get(),
                    path_from: *e.path_from.get(),
                    path_to: *e.path_to.get(),
                    markers: *e.markers.get(),
                },
            )),
            _ => None,
        };

        let (curve, markers) = match edge {
            Some(([from, to], params)) => {
                let start = self.endpoint(id, from, EdgeEnd::From, frame, changes, tracer);
                let end = self.endpoint(id, to, EdgeEnd::To, frame, changes, tracer);
                let route = edge::route_edge(
                    &start,
                    &end,
                    &params,
                    &self.config.root_finder,
                    self.config.arc_length_resolution,
                );
                for (endpoint, crossing, which) in [
                    (&start, route.start_crossing, EdgeEnd::From),
                    (&end, route.end_crossing, EdgeEnd::To),
                ] {
                    if endpoint.sdf.is_some() && crossing.is_none() {
                        warn(
                            changes,
                            tracer,
                            Warning::NoCrossing {
                                edge: id,
                                end: which,
                            },
                        );
                    }
                }
                (Some(route.curve), route.markers)
            }
            None => (None, Vec::new()),
        };

        *self.elements.geometry_mut(id) = ElementGeometry {
            world_transform,
            bounds,
            curve,
            markers,
        };
    }

    /// Expresses one end of an edge in the edge's space.
    fn endpoint(
        &mut self,
        edge: ElementId,
        end: Option<ElementId>,
        which: EdgeEnd,
        edge_frame: SpaceId,
        changes: &mut SceneChanges,
        tracer: &mut Tracer<'_>,
    ) -> Endpoint {
        let end = end.filter(|&e| self.elements.contains(e));
        let outline = end.and_then(|e| self.elements.data(e).outline());

        let (Some(e), Some((sdf, center))) = (end, outline) else {
            warn(
                changes,
                tracer,
                Warning::MissingEndpoint { edge, end: which },
            );
            // Fall back to the origin of whatever space the end lives in.
            let origin_space = match end {
                Some(e) => self
                    .group_space(e)
                    .unwrap_or_else(|| self.elements.frame(e)),
                None => edge_frame,
            };
            return Endpoint {
                sdf: None,
                curve_to_sdf: Affine::IDENTITY,
                center: self
                    .spaces
                    .convert_point(Point::ZERO, origin_space, edge_frame),
            };
        };

        let end_frame = self.elements.frame(e);
        let edge_to_end = self.spaces.transform_between(edge_frame, end_frame);
        Endpoint {
            sdf: Some(sdf),
            curve_to_sdf: Affine::translate(-center.to_vec2()) * edge_to_end,
            center: self.spaces.convert_point(center, end_frame, edge_frame),
        }
    }

    // -- Internal helpers --

    fn insert(&mut self, parent: Option<ElementId>, kind: ElementKind) -> ElementId {
        let frame = self.frame_for_parent(parent);
        let id = self.elements.insert(ElementData::new(kind), frame);
        assert!(id.0 < SPACE_KEY, "element ids exhausted");

        // Spaces depend on nothing in this graph, so this cannot close a cycle.
        let _ = self
            .graph
            .add_dependency(element_key(id), space_key(frame), dirty::GEOMETRY);
        if parent.is_some() {
            self.elements.set_parent(id, parent);
        }
        self.pending_added.push(id);
        id
    }

    /// The space children of `parent` are expressed in.
    fn frame_for_parent(&self, parent: Option<ElementId>) -> SpaceId {
        match parent {
            None => self.spaces.world(),
            Some(p) => self
                .group_space(p)
                .unwrap_or_else(|| self.elements.frame(p)),
        }
    }

    /// Re-derives the frame of `id` and its descendants after a move.
    fn refresh_frame(&mut self, id: ElementId) {
        let frame = self.frame_for_parent(self.elements.parent(id));
        let old = self.elements.frame(id);
        if old != frame {
            let key = element_key(id);
            self.graph
                .remove_dependency(key, space_key(old), dirty::GEOMETRY);
            let _ = self
                .graph
                .add_dependency(key, space_key(frame), dirty::GEOMETRY);
            self.elements.set_frame(id, frame);
            self.graph.mark_with(key, dirty::GEOMETRY, &EagerPolicy);
        }

        if let Some(inner) = self.group_space(id) {
            if self.spaces.parent(inner) != Some(frame) {
                // The element tree is acyclic and the space tree mirrors it.
                let result = self.spaces.set_parent(inner, Some(frame));
                debug_assert!(result.is_ok(), "space tree diverged: {result:?}");
            }
        } else {
            let children = self.elements.children(id).to_vec();
            for child in children {
                self.refresh_frame(child);
            }
        }
    }

    /// Keeps the graph dependencies of an edge in line with its endpoints.
    fn sync_edge_links(&mut self, id: ElementId) {
        let ElementKind::Edge(edge) = &self.elements.data(id).kind else {
            return;
        };
        let ends = edge.endpoints();
        let old = self.edge_links.get(&id).copied().unwrap_or([None, None]);
        if old == ends {
            return;
        }

        let key = element_key(id);
        for end in old.into_iter().flatten() {
            self.graph
                .remove_dependency(key, element_key(end), dirty::GEOMETRY);
        }
        let mut linked = [None, None];
        for (slot, end) in ends.into_iter().enumerate() {
            let Some(end) = end else { continue };
            if !self.elements.contains(end) || linked.contains(&Some(end)) {
                continue;
            }
            if self
                .graph
                .add_dependency(key, element_key(end), dirty::GEOMETRY)
                .is_ok()
            {
                linked[slot] = Some(end);
            } else {
                self.pending_warnings.push(Warning::DependencyCycle {
                    element: id,
                    on: end,
                });
            }
        }
        self.edge_links.insert(id, linked);
        self.graph.mark_with(key, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Applies owner notifications queued by [`edit`](Self::edit).
    fn flush_edits(&mut self) {
        let pending: Vec<Owner> = self.invalidated.drain().collect();
        for owner in pending {
            match owner {
                Owner::Element(e) if self.elements.contains(e) => {
                    self.elements.mark_dirty(e);
                    self.graph
                        .mark_with(element_key(e), dirty::GEOMETRY, &EagerPolicy);
                }
                Owner::Space(s) if self.spaces.is_alive(s) => self.spaces.mark_dirty(s),
                _ => {}
            }
        }
    }

    /// Applies owner notifications queued by the style cascade.
    ///
    /// Style never feeds geometry, so the graph is left alone.
    fn flush_cascade(&mut self) {
        let pending: Vec<Owner> = self.invalidated.drain().collect();
        for owner in pending {
            if let Owner::Element(e) = owner
                && self.elements.contains(e)
            {
                self.elements.mark_dirty(e);
            }
        }
    }
}

fn warn(changes: &mut SceneChanges, tracer: &mut Tracer<'_>, warning: Warning) {
    tracer.warning(&WarningEvent {
        pass: changes.pass,
        warning,
    });
    changes.warnings.push(warning);
}
