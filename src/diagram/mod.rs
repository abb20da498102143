//! Diagram-native model: the cells the external canvas owns.
//!
//! Cells are classified once, when they are built or parsed, into the
//! tagged union [`DiagramCell`]. Code downstream matches on the variant
//! instead of probing attributes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::geometry::{Placed, Point, Size};

mod identity;
mod json;

pub use identity::{IdentityResolver, TitleResolver};

/// Stable element identifier. Generated ids are UUID v4 strings; ids read
/// from a payload are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// State common to every element variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementCore {
    pub id: ElementId,
    pub position: Point,
    pub size: Size,
    /// Label text. Doubles as the title in the simplified schema.
    pub label: String,
    /// Group tags, in first-seen order, without duplicates.
    pub groups: Vec<String>,
    /// Attributes read from a payload that the typed fields do not cover.
    /// Re-emitted untouched underneath the typed values.
    pub passthrough_attrs: Map<String, Value>,
}

impl ElementCore {
    pub fn new(label: impl Into<String>, position: Point, size: Size) -> Self {
        Self {
            id: ElementId::generate(),
            position,
            size,
            label: label.into(),
            groups: Vec::new(),
            passthrough_attrs: Map::new(),
        }
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for g in groups {
            let g = g.into();
            if !self.groups.contains(&g) {
                self.groups.push(g);
            }
        }
        self
    }

    pub fn in_group(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g == name)
    }
}

impl Placed for ElementCore {
    fn position(&self) -> Point { self.position }
    fn size(&self) -> Size { self.size }
    fn set_position(&mut self, position: Point) { self.position = position; }
}

/// Primitive shapes a rectangle-backed node may be drawn as.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Ellipse,
}

impl ShapeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "standard.Rectangle",
            ShapeKind::Circle => "standard.Circle",
            ShapeKind::Ellipse => "standard.Ellipse",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "standard.Rectangle" => Some(ShapeKind::Rectangle),
            "standard.Circle" => Some(ShapeKind::Circle),
            "standard.Ellipse" => Some(ShapeKind::Ellipse),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeElement {
    pub core: ElementCore,
    pub shape: ShapeKind,
    pub fill: String,
    pub fill_opacity: Option<f64>,
    pub label_color: Option<String>,
    /// Wrap the label inside the element bounds (with ellipsis).
    pub wrap_label: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageElement {
    pub core: ElementCore,
    pub href: String,
}

/// Synthesized container drawn behind the members of a group. Its label is
/// the group name; it is never a link endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupContainer {
    pub core: ElementCore,
    pub stroke: String,
    pub dash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagramLink {
    pub id: ElementId,
    pub source: ElementId,
    pub target: ElementId,
}

impl DiagramLink {
    pub fn new(source: ElementId, target: ElementId) -> Self {
        Self { id: ElementId::generate(), source, target }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagramCell {
    Rectangle(ShapeElement),
    Image(ImageElement),
    Group(GroupContainer),
    Link(DiagramLink),
}

impl DiagramCell {
    pub fn id(&self) -> &ElementId {
        match self {
            DiagramCell::Rectangle(s) => &s.core.id,
            DiagramCell::Image(i) => &i.core.id,
            DiagramCell::Group(g) => &g.core.id,
            DiagramCell::Link(l) => &l.id,
        }
    }

    /// Element state, `None` for links.
    pub fn element(&self) -> Option<&ElementCore> {
        match self {
            DiagramCell::Rectangle(s) => Some(&s.core),
            DiagramCell::Image(i) => Some(&i.core),
            DiagramCell::Group(g) => Some(&g.core),
            DiagramCell::Link(_) => None,
        }
    }

    pub fn element_mut(&mut self) -> Option<&mut ElementCore> {
        match self {
            DiagramCell::Rectangle(s) => Some(&mut s.core),
            DiagramCell::Image(i) => Some(&mut i.core),
            DiagramCell::Group(g) => Some(&mut g.core),
            DiagramCell::Link(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, DiagramCell::Group(_))
    }

    pub fn as_link(&self) -> Option<&DiagramLink> {
        match self {
            DiagramCell::Link(l) => Some(l),
            _ => None,
        }
    }
}

/// The canvas graph contents, `{ "cells": [...] }` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(default, deserialize_with = "json::deserialize_cells")]
    pub cells: Vec<DiagramCell>,
}

impl Diagram {
    pub fn new(cells: Vec<DiagramCell>) -> Self {
        Self { cells }
    }

    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(Error::InvalidDiagram)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(Error::InvalidDiagram)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All element cells (groups included), in graph order.
    pub fn elements(&self) -> impl Iterator<Item = &DiagramCell> {
        self.cells.iter().filter(|c| c.element().is_some())
    }

    pub fn links(&self) -> impl Iterator<Item = &DiagramLink> {
        self.cells.iter().filter_map(DiagramCell::as_link)
    }

    pub fn cell(&self, id: &ElementId) -> Option<&DiagramCell> {
        self.cells.iter().find(|c| c.id() == id)
    }

    pub fn element(&self, id: &ElementId) -> Option<&ElementCore> {
        self.cells.iter().filter_map(DiagramCell::element).find(|e| &e.id == id)
    }

    pub fn element_mut(&mut self, id: &ElementId) -> Option<&mut ElementCore> {
        self.cells.iter_mut().filter_map(DiagramCell::element_mut).find(|e| &e.id == id)
    }

    pub fn push(&mut self, cell: DiagramCell) -> ElementId {
        let id = cell.id().clone();
        self.cells.push(cell);
        id
    }

    /// Add a directed link. Both ends must be existing, connectable elements.
    pub fn connect(&mut self, source: &ElementId, target: &ElementId) -> Option<ElementId> {
        let connectable = |id: &ElementId| {
            matches!(self.cell(id), Some(c) if c.element().is_some() && !c.is_group())
        };
        if !connectable(source) || !connectable(target) {
            return None;
        }
        Some(self.push(DiagramCell::Link(DiagramLink::new(source.clone(), target.clone()))))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn rect(label: &str, x: f64, y: f64) -> DiagramCell {
        DiagramCell::Rectangle(ShapeElement {
            core: ElementCore::new(label, Point::new(x, y), Size { width: 100.0, height: 100.0 }),
            shape: ShapeKind::Rectangle,
            fill: "#2ECC71".to_string(),
            fill_opacity: Some(0.5),
            label_color: None,
            wrap_label: false,
        })
    }

    pub(crate) fn rect_in(label: &str, x: f64, y: f64, groups: &[&str]) -> DiagramCell {
        let mut cell = rect(label, x, y);
        if let DiagramCell::Rectangle(s) = &mut cell {
            s.core = s.core.clone().with_groups(groups.iter().copied());
        }
        cell
    }

    pub(crate) fn group(label: &str, x: f64, y: f64) -> DiagramCell {
        DiagramCell::Group(GroupContainer {
            core: ElementCore::new(label, Point::new(x, y), Size { width: 300.0, height: 300.0 }),
            stroke: "#000000".to_string(),
            dash: "5,5".to_string(),
        })
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ElementId::generate(), ElementId::generate());
    }

    #[test]
    fn test_with_groups_dedupes() {
        let core = ElementCore::new("A", Point::default(), Size::default()).with_groups(["g", "h", "g"]);
        assert_eq!(core.groups, vec!["g".to_string(), "h".to_string()]);
        assert!(core.in_group("h"));
        assert!(!core.in_group("x"));
    }

    #[test]
    fn test_connect_requires_connectable_ends() {
        let mut d = Diagram::default();
        let a = d.push(rect("A", 0.0, 0.0));
        let b = d.push(rect("B", 200.0, 0.0));
        let group = d.push(group("g", 0.0, 0.0));

        assert!(d.connect(&a, &b).is_some());
        assert!(d.connect(&a, &group).is_none());
        assert!(d.connect(&a, &ElementId("missing".to_string())).is_none());
        assert_eq!(d.links().count(), 1);
    }

    #[test]
    fn test_element_lookup_skips_links() {
        let mut d = Diagram::default();
        let a = d.push(rect("A", 0.0, 0.0));
        let b = d.push(rect("B", 0.0, 0.0));
        let link = d.connect(&a, &b).unwrap();
        assert!(d.element(&a).is_some());
        assert!(d.element(&link).is_none());
        assert!(d.cell(&link).is_some());
        assert_eq!(d.elements().count(), 2);
    }
}
