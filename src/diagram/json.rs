// Canvas interchange codec.
//
// The canvas serializes its graph as `{ "cells": [...] }` where every cell is
// a loosely typed record:
//
//   { "type": "standard.Rectangle", "id": "...", "position": {x, y},
//     "size": {width, height}, "attrs": { "body": {...}, "label": {...} },
//     "data": { "type": "group", "groups": [...], "noneConnectable": true } }
//
//   { "type": "standard.Link", "id": "...", "source": {"id"}, "target": {"id"} }
//
// `RawCell` mirrors that record. Classification into `DiagramCell` happens
// exactly once here; the attributes that become typed fields are taken out
// of `attrs`, the rest ride along in `passthrough_attrs`.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};

use super::{
    DiagramCell, DiagramLink, ElementCore, ElementId, GroupContainer, ImageElement, ShapeElement,
    ShapeKind,
};
use crate::error::{Error, Result};
use crate::geometry::{Point, Size};

const GROUP_TAG: &str = "group";
const LINK_TYPE: &str = "standard.Link";
const IMAGE_TYPE: &str = "standard.Image";

/// Payload ids may be strings or numbers (timestamps).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for ElementId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => ElementId(s),
            RawId::Number(n) => ElementId(n.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct RawEnd {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<RawId>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawData {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    none_connectable: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize)]
struct RawCell {
    #[serde(rename = "type")]
    cell_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<RawId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<RawEnd>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<RawEnd>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    attrs: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<RawData>,
}

/// Remove `attrs[outer][inner]`, dropping `outer` once it is empty.
fn take_attr(attrs: &mut Map<String, Value>, outer: &str, inner: &str) -> Option<Value> {
    let obj = attrs.get_mut(outer)?.as_object_mut()?;
    let value = obj.remove(inner);
    if obj.is_empty() {
        attrs.remove(outer);
    }
    value
}

fn take_str(attrs: &mut Map<String, Value>, outer: &str, inner: &str) -> Option<String> {
    match take_attr(attrs, outer, inner)? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn has_attr(attrs: &Map<String, Value>, outer: &str, inner: &str) -> bool {
    attrs.get(outer).and_then(|o| o.get(inner)).is_some()
}

fn put_attr(attrs: &mut Map<String, Value>, outer: &str, inner: &str, value: Value) {
    let entry = attrs.entry(outer.to_string()).or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(obj) = entry {
        obj.insert(inner.to_string(), value);
    }
}

impl RawCell {
    /// Classify into a typed cell. `Ok(None)` for links that point at bare
    /// coordinates instead of elements: the model has no place for them.
    fn into_cell(self) -> Result<Option<DiagramCell>> {
        let id = self.id.map(ElementId::from).unwrap_or_else(ElementId::generate);

        if self.cell_type == LINK_TYPE || self.source.is_some() || self.target.is_some() {
            let end = |e: Option<RawEnd>| e.and_then(|e| e.id).map(ElementId::from);
            return match (end(self.source), end(self.target)) {
                (Some(source), Some(target)) => {
                    Ok(Some(DiagramCell::Link(DiagramLink { id, source, target })))
                }
                _ => {
                    tracing::debug!(link = %id, "dropping link without element endpoints");
                    Ok(None)
                }
            };
        }

        let data = self.data.unwrap_or_default();
        let mut attrs = self.attrs;
        let label = take_str(&mut attrs, "label", "text").unwrap_or_default();
        let is_image = self.cell_type == IMAGE_TYPE || has_attr(&attrs, "image", "xlinkHref");
        let shape = ShapeKind::from_type_name(&self.cell_type);
        let is_group = data.kind.as_deref() == Some(GROUP_TAG);

        let core = |attrs: Map<String, Value>| {
            ElementCore {
                id: id.clone(),
                position: self.position.unwrap_or_default(),
                size: self.size.unwrap_or_default(),
                label: label.clone(),
                groups: Vec::new(),
                passthrough_attrs: attrs,
            }
            .with_groups(data.groups.iter().cloned())
        };

        if is_group {
            take_attr(&mut attrs, "body", "fill");
            let stroke = take_str(&mut attrs, "body", "stroke").unwrap_or_else(|| "#000000".to_string());
            let dash = take_str(&mut attrs, "body", "strokeDasharray").unwrap_or_else(|| "5,5".to_string());
            return Ok(Some(DiagramCell::Group(GroupContainer { core: core(attrs), stroke, dash })));
        }

        if is_image {
            let href = take_str(&mut attrs, "image", "xlinkHref").unwrap_or_default();
            return Ok(Some(DiagramCell::Image(ImageElement { core: core(attrs), href })));
        }

        let Some(shape) = shape else {
            return Err(Error::UnsupportedCell { cell_type: self.cell_type });
        };
        let fill = take_str(&mut attrs, "body", "fill").unwrap_or_default();
        let fill_opacity = take_attr(&mut attrs, "body", "fillOpacity").and_then(|v| v.as_f64());
        let label_color = take_str(&mut attrs, "label", "fill");
        let wrap_label = take_attr(&mut attrs, "label", "textWrap").is_some();
        Ok(Some(DiagramCell::Rectangle(ShapeElement {
            core: core(attrs),
            shape,
            fill,
            fill_opacity,
            label_color,
            wrap_label,
        })))
    }
}

fn element_raw(cell_type: &str, core: &ElementCore, mut attrs: Map<String, Value>, data: RawData) -> RawCell {
    put_attr(&mut attrs, "label", "text", Value::String(core.label.clone()));
    let has_data = data.kind.is_some() || !data.groups.is_empty() || data.none_connectable.is_some();
    RawCell {
        cell_type: cell_type.to_string(),
        id: Some(RawId::Text(core.id.0.clone())),
        position: Some(core.position),
        size: Some(core.size),
        source: None,
        target: None,
        attrs,
        data: has_data.then_some(data),
    }
}

impl From<&DiagramCell> for RawCell {
    fn from(cell: &DiagramCell) -> Self {
        let member_data = |core: &ElementCore| RawData { groups: core.groups.clone(), ..RawData::default() };

        match cell {
            DiagramCell::Rectangle(s) => {
                let mut attrs = s.core.passthrough_attrs.clone();
                put_attr(&mut attrs, "body", "fill", Value::String(s.fill.clone()));
                if let Some(op) = s.fill_opacity {
                    put_attr(&mut attrs, "body", "fillOpacity", json!(op));
                }
                if let Some(color) = &s.label_color {
                    put_attr(&mut attrs, "label", "fill", Value::String(color.clone()));
                }
                if s.wrap_label {
                    put_attr(
                        &mut attrs,
                        "label",
                        "textWrap",
                        json!({ "width": s.core.size.width, "height": s.core.size.height, "ellipsis": true }),
                    );
                }
                element_raw(s.shape.type_name(), &s.core, attrs, member_data(&s.core))
            }
            DiagramCell::Image(i) => {
                let mut attrs = i.core.passthrough_attrs.clone();
                put_attr(&mut attrs, "image", "xlinkHref", Value::String(i.href.clone()));
                element_raw(IMAGE_TYPE, &i.core, attrs, member_data(&i.core))
            }
            DiagramCell::Group(g) => {
                let mut attrs = g.core.passthrough_attrs.clone();
                put_attr(&mut attrs, "body", "fill", Value::String("transparent".to_string()));
                put_attr(&mut attrs, "body", "stroke", Value::String(g.stroke.clone()));
                put_attr(&mut attrs, "body", "strokeDasharray", Value::String(g.dash.clone()));
                let data = RawData {
                    kind: Some(GROUP_TAG.to_string()),
                    groups: g.core.groups.clone(),
                    none_connectable: Some(true),
                };
                element_raw(ShapeKind::Rectangle.type_name(), &g.core, attrs, data)
            }
            DiagramCell::Link(l) => RawCell {
                cell_type: LINK_TYPE.to_string(),
                id: Some(RawId::Text(l.id.0.clone())),
                position: None,
                size: None,
                source: Some(RawEnd { id: Some(RawId::Text(l.source.0.clone())) }),
                target: Some(RawEnd { id: Some(RawId::Text(l.target.0.clone())) }),
                attrs: Map::new(),
                data: None,
            },
        }
    }
}

impl Serialize for DiagramCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        RawCell::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DiagramCell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        RawCell::deserialize(deserializer)?
            .into_cell()
            .map_err(de::Error::custom)?
            .ok_or_else(|| de::Error::custom("link has no element endpoints"))
    }
}

pub(super) fn deserialize_cells<'de, D>(deserializer: D) -> std::result::Result<Vec<DiagramCell>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RawCell>::deserialize(deserializer)?;
    let mut cells = Vec::with_capacity(raw.len());
    for r in raw {
        if let Some(cell) = r.into_cell().map_err(de::Error::custom)? {
            cells.push(cell);
        }
    }
    Ok(cells)
}
