use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// One diagram node as the language model sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedCell {
    /// Unique within a document; the join key for connections.
    pub title: String,
    /// Hex fill. Absent means "use the default".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Top-left corner in diagram units.
    pub position: Point,
    /// Titles of the cells this one links to.
    #[serde(default)]
    pub connections: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl SimplifiedCell {
    pub fn new(title: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            title: title.into(),
            color: None,
            position: Point::new(x, y),
            connections: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn connect(mut self, target: impl Into<String>) -> Self {
        self.connections.push(target.into());
        self
    }

    pub fn group(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.groups.contains(&name) {
            self.groups.push(name);
        }
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedDocument {
    #[serde(default)]
    pub cells: Vec<SimplifiedCell>,
}

impl SimplifiedDocument {
    pub fn new(cells: Vec<SimplifiedCell>) -> Self {
        Self { cells }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// First cell with `title`.
    pub fn find(&self, title: &str) -> Option<&SimplifiedCell> {
        self.cells.iter().find(|c| c.title == title)
    }

    /// All `(source, target)` title pairs, in document order.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.cells
            .iter()
            .flat_map(|c| c.connections.iter().map(move |t| (c.title.as_str(), t.as_str())))
            .collect()
    }
}
