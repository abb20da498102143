//! Hierarchy model and store.
//!
//! The store is the registry the editor UI reads: one entry per diagram
//! element, holding hover/link affordances, plus group entries that keep
//! their members glued to the group origin.

mod events;
mod item;
mod store;

pub use events::{EventBus, EventKind, HierarchyEvent, SubscriptionId};
pub use item::{GroupChild, HierarchyGroupItem, HierarchyItem, HierarchyNode, ToolsViewItem, ToolsViewKind};
pub use store::HierarchyStore;

use crate::diagram::{Diagram, ElementId};
use crate::geometry::Point;

/// Element geometry and labels the store may read and write.
pub trait ElementGraph {
    fn position_of(&self, id: &ElementId) -> Option<Point>;
    /// Returns false when `id` is not an element of the graph.
    fn set_position(&mut self, id: &ElementId, position: Point) -> bool;
    fn set_label(&mut self, id: &ElementId, label: &str) -> bool;
}

impl ElementGraph for Diagram {
    fn position_of(&self, id: &ElementId) -> Option<Point> {
        self.element(id).map(|e| e.position)
    }

    fn set_position(&mut self, id: &ElementId, position: Point) -> bool {
        match self.element_mut(id) {
            Some(e) => {
                e.position = position;
                true
            }
            None => false,
        }
    }

    fn set_label(&mut self, id: &ElementId, label: &str) -> bool {
        match self.element_mut(id) {
            Some(e) => {
                e.label = label.to_string();
                true
            }
            None => false,
        }
    }
}
