// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON scene snapshots.
//!
//! [`export`] walks the element tree of a [`Scene`] and writes it as a JSON
//! object, depth-first from the roots, using the geometry computed by the
//! last [`Scene::update`]. Diffing two snapshots is a quick way to see what an
//! update pass changed.
//!
//! ```text
//! {
//!   "pass": 3,
//!   "spaces": 2,
//!   "rendered_roots": [0],
//!   "roots": [
//!     { "id": 0, "kind": "group", "layer": 0, "active": true,
//!       "world_transform": [1, 0, 0, 1, 0, 0],
//!       "rendered_children": [1, 2], "children": [ ... ] },
//!     ...
//!   ]
//! }
//! ```

use std::io::{self, Write};

use kurbo::{Affine, Point, Rect};
use serde_json::{Map, Value, json};

use stratum_core::element::{ElementId, ElementKind};
use stratum_core::scene::Scene;

/// Writes a pretty-printed JSON snapshot of `scene`.
pub fn export(scene: &Scene, writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(writer, &to_json(scene))?;
    Ok(())
}

/// Builds the snapshot as a [`Value`].
#[must_use]
pub fn to_json(scene: &Scene) -> Value {
    let roots: Vec<Value> = scene
        .elements()
        .roots()
        .into_iter()
        .map(|id| element(scene, id))
        .collect();
    let rendered: Vec<u32> = scene
        .elements()
        .rendered_roots()
        .iter()
        .map(|r| r.get())
        .collect();
    json!({
        "pass": scene.pass(),
        "spaces": scene.spaces().len(),
        "rendered_roots": rendered,
        "roots": roots,
    })
}

fn element(scene: &Scene, id: ElementId) -> Value {
    let elements = scene.elements();
    let data = elements.data(id);
    let geometry = elements.geometry(id);

    let mut obj = Map::new();
    obj.insert("id".into(), json!(id.get()));
    obj.insert("kind".into(), json!(data.kind.name()));
    obj.insert("layer".into(), json!(*data.layer.get()));
    obj.insert("active".into(), json!(*data.active.get()));
    obj.insert("opacity".into(), json!(*data.style.opacity.get()));
    obj.insert(
        "target".into(),
        json!(elements.target(id).map(|t| t.0)),
    );
    obj.insert(
        "world_transform".into(),
        affine(geometry.world_transform),
    );
    if let Some(bounds) = geometry.bounds {
        obj.insert("bounds".into(), rect(bounds));
    }

    match &data.kind {
        ElementKind::Group(g) => {
            obj.insert("space".into(), json!(g.space.index()));
        }
        ElementKind::Label(l) => {
            obj.insert("text".into(), json!(l.text.get()));
        }
        ElementKind::Edge(e) => {
            let ends: Vec<Value> = e
                .endpoints()
                .into_iter()
                .map(|end| json!(end.map(ElementId::get)))
                .collect();
            obj.insert("endpoints".into(), Value::Array(ends));
            if let Some(curve) = &geometry.curve {
                let points: Vec<Value> = curve.control_points().into_iter().map(point).collect();
                obj.insert("control_points".into(), Value::Array(points));
            }
            let markers: Vec<Value> = geometry
                .markers
                .iter()
                .map(|m| json!({ "point": point(m.point), "tangent": [m.tangent.x, m.tangent.y] }))
                .collect();
            obj.insert("markers".into(), Value::Array(markers));
        }
        ElementKind::Shape(_) => {}
    }

    let rendered: Vec<u32> = elements
        .rendered_children(id)
        .iter()
        .map(|c| c.get())
        .collect();
    obj.insert("rendered_children".into(), json!(rendered));
    let children: Vec<Value> = elements
        .children(id)
        .iter()
        .map(|&c| element(scene, c))
        .collect();
    obj.insert("children".into(), Value::Array(children));

    Value::Object(obj)
}

fn point(p: Point) -> Value {
    json!([p.x, p.y])
}

fn rect(r: Rect) -> Value {
    json!([r.x0, r.y0, r.x1, r.y1])
}

fn affine(a: Affine) -> Value {
    json!(a.as_coeffs())
}
