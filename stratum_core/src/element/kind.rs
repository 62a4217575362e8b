// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element data bundles.

use alloc::string::String;

use kurbo::{Point, Rect, Size, Vec2};

use super::id::ElementId;
use crate::edge::Routing;
use crate::sdf::{CircleSdf, RoundedRectSdf, ShapeSdf};
use crate::space::SpaceId;
use crate::value::{Owner, Style, Value};

/// Outline family of a [`ShapeData`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// The largest circle that fits the extents.
    #[default]
    Circle,
    /// A rectangle filling the extents, with rounded corners.
    RoundedRect,
}

/// A container that positions its children in a space of its own.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupData {
    /// The space children of this group are expressed in.
    pub space: SpaceId,
}

/// A filled primitive that edges can attach to.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeData {
    /// Centre of the shape.
    pub position: Value<Point>,
    /// Full width and height.
    pub extents: Value<Size>,
    /// Outline family.
    pub shape: Value<ShapeKind>,
    /// Corner radius for [`ShapeKind::RoundedRect`].
    pub corner_radius: Value<f64>,
}

impl ShapeData {
    /// Creates shape data, dirty and unowned.
    #[must_use]
    pub fn new(shape: ShapeKind, position: Point, extents: Size) -> Self {
        Self {
            position: Value::new(position),
            extents: Value::new(extents),
            shape: Value::new(shape),
            corner_radius: Value::new(0.0),
        }
    }

    /// Returns the distance field of the outline, centred on the origin.
    #[must_use]
    pub fn sdf(&self) -> ShapeSdf {
        let extents = *self.extents.get();
        match self.shape.get() {
            ShapeKind::Circle => ShapeSdf::Circle(CircleSdf {
                radius: 0.5 * extents.width.abs().min(extents.height.abs()),
            }),
            ShapeKind::RoundedRect => ShapeSdf::RoundedRect(RoundedRectSdf {
                half_extents: extents.to_vec2() * 0.5,
                radius: *self.corner_radius.get(),
            }),
        }
    }
}

/// A run of text. Its extents come from an external text-metrics source.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelData {
    /// Centre of the text box.
    pub position: Value<Point>,
    /// The text.
    pub text: Value<String>,
    /// Measured box size.
    pub extents: Value<Size>,
}

impl LabelData {
    /// Creates label data with zero extents.
    #[must_use]
    pub fn new(text: impl Into<String>, position: Point) -> Self {
        Self {
            position: Value::new(position),
            text: Value::new(text.into()),
            extents: Value::new(Size::ZERO),
        }
    }

    /// Returns the distance field of the text box, centred on the origin.
    #[must_use]
    pub fn sdf(&self) -> ShapeSdf {
        ShapeSdf::RoundedRect(RoundedRectSdf {
            half_extents: self.extents.get().to_vec2() * 0.5,
            radius: 0.0,
        })
    }
}

/// A connector between two other elements.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeData {
    /// Element the connector starts at.
    pub from: Value<Option<ElementId>>,
    /// Element the connector ends at.
    pub to: Value<Option<ElementId>>,
    /// Curve family.
    pub routing: Value<Routing>,
    /// Gap between each endpoint's outline and the connector.
    pub padding: Value<f64>,
    /// Start of the drawn part, as a fraction of the trimmed range.
    pub path_from: Value<f64>,
    /// End of the drawn part, as a fraction of the trimmed range.
    pub path_to: Value<f64>,
    /// Number of evenly spaced decorations.
    pub markers: Value<u32>,
}

impl EdgeData {
    /// Creates a straight, unpadded, fully drawn connector.
    #[must_use]
    pub fn new(from: ElementId, to: ElementId) -> Self {
        Self {
            from: Value::new(Some(from)),
            to: Value::new(Some(to)),
            routing: Value::new(Routing::Straight),
            padding: Value::new(0.0),
            path_from: Value::new(0.0),
            path_to: Value::new(1.0),
            markers: Value::new(0),
        }
    }

    /// Returns both endpoint handles.
    #[must_use]
    pub fn endpoints(&self) -> [Option<ElementId>; 2] {
        [*self.from.get(), *self.to.get()]
    }
}

/// The kind-specific part of an element.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    /// See [`GroupData`].
    Group(GroupData),
    /// See [`ShapeData`].
    Shape(ShapeData),
    /// See [`LabelData`].
    Label(LabelData),
    /// See [`EdgeData`].
    Edge(EdgeData),
}

impl ElementKind {
    /// Returns a lowercase name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Group(_) => "group",
            Self::Shape(_) => "shape",
            Self::Label(_) => "label",
            Self::Edge(_) => "edge",
        }
    }
}

/// Everything an element owns: shared attributes plus its kind.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementData {
    /// Draw order among siblings; lower draws first.
    pub layer: Value<i32>,
    /// Inactive elements are left out of their parent's rendered children.
    pub active: Value<bool>,
    /// Cascading presentation attributes.
    pub style: Style,
    /// Kind-specific values.
    pub kind: ElementKind,
}

impl ElementData {
    /// Wraps `kind` with layer 0, active, and a default style.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            layer: Value::new(0),
            active: Value::new(true),
            style: Style::default(),
            kind,
        }
    }

    /// Attaches every value to `owner`.
    pub fn attach(&mut self, owner: Owner) {
        self.layer.attach(owner);
        self.active.attach(owner);
        self.style.attach(owner);
        match &mut self.kind {
            ElementKind::Group(_) => {}
            ElementKind::Shape(s) => {
                s.position.attach(owner);
                s.extents.attach(owner);
                s.shape.attach(owner);
                s.corner_radius.attach(owner);
            }
            ElementKind::Label(l) => {
                l.position.attach(owner);
                l.text.attach(owner);
                l.extents.attach(owner);
            }
            ElementKind::Edge(e) => {
                e.from.attach(owner);
                e.to.attach(owner);
                e.routing.attach(owner);
                e.padding.attach(owner);
                e.path_from.attach(owner);
                e.path_to.attach(owner);
                e.markers.attach(owner);
            }
        }
    }

    /// Clears the dirty flag of every value.
    pub fn clear_dirty(&mut self) {
        self.layer.clear_dirty();
        self.active.clear_dirty();
        self.style.clear_dirty();
        match &mut self.kind {
            ElementKind::Group(_) => {}
            ElementKind::Shape(s) => {
                s.position.clear_dirty();
                s.extents.clear_dirty();
                s.shape.clear_dirty();
                s.corner_radius.clear_dirty();
            }
            ElementKind::Label(l) => {
                l.position.clear_dirty();
                l.text.clear_dirty();
                l.extents.clear_dirty();
            }
            ElementKind::Edge(e) => {
                e.from.clear_dirty();
                e.to.clear_dirty();
                e.routing.clear_dirty();
                e.padding.clear_dirty();
                e.path_from.clear_dirty();
                e.path_to.clear_dirty();
                e.markers.clear_dirty();
            }
        }
    }

    /// Returns whether the sibling order depends on a changed value.
    #[must_use]
    pub fn order_changed(&self) -> bool {
        self.layer.is_dirty() || self.active.is_dirty()
    }

    /// Returns the outline an edge can attach to, with its centre.
    ///
    /// Groups and edges have none.
    #[must_use]
    pub fn outline(&self) -> Option<(ShapeSdf, Point)> {
        match &self.kind {
            ElementKind::Shape(s) => Some((s.sdf(), *s.position.get())),
            ElementKind::Label(l) => Some((l.sdf(), *l.position.get())),
            ElementKind::Group(_) | ElementKind::Edge(_) => None,
        }
    }

    /// Returns the axis-aligned box of a shape or label, in its own space.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let (center, extents) = match &self.kind {
            ElementKind::Shape(s) => (*s.position.get(), *s.extents.get()),
            ElementKind::Label(l) => (*l.position.get(), *l.extents.get()),
            ElementKind::Group(_) | ElementKind::Edge(_) => return None,
        };
        let half = Vec2::new(extents.width.abs(), extents.height.abs()) * 0.5;
        Some(Rect::from_points(center - half, center + half))
    }
}
