// Hierarchy store.
//
// Registry of hierarchy entries keyed by element id, plus the typed event
// bus. Invariants:
// - at most one entry has its hover view visible (`active_item`)
// - `add` never replaces an existing entry
// - `reload` builds the new entries in a staging vector first; a failure
//   leaves the current registry untouched
//
// Group moves are propagated breadth-first with a visited set, so an
// element reachable through several groups is positioned once per move.

use std::collections::{HashSet, VecDeque};

use crate::diagram::{Diagram, DiagramCell, ElementId};
use crate::error::{Error, Result};
use crate::geometry::Point;

use super::{
    ElementGraph, EventBus, EventKind, HierarchyEvent, HierarchyGroupItem, HierarchyItem, HierarchyNode,
    SubscriptionId, ToolsViewKind,
};

#[derive(Debug, Default)]
pub struct HierarchyStore {
    nodes: Vec<HierarchyNode>,
    bus: EventBus,
}

impl HierarchyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &[HierarchyNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, id: &ElementId) -> Option<&HierarchyNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    fn find_mut(&mut self, id: &ElementId) -> Option<&mut HierarchyNode> {
        self.nodes.iter_mut().find(|n| n.id() == id)
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: FnMut(&HierarchyEvent<'_>) + 'static,
    {
        self.bus.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Register `node`. A node whose id is already present is ignored.
    pub fn add(&mut self, node: HierarchyNode) -> bool {
        if self.find(node.id()).is_some() {
            return false;
        }
        self.nodes.push(node);
        if let Some(added) = self.nodes.last() {
            self.bus.emit(&HierarchyEvent::Added(added));
        }
        true
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.bus.emit(&HierarchyEvent::Cleared);
    }

    pub fn blur_all(&mut self) {
        for node in &mut self.nodes {
            node.item_mut().set_tools_visible(ToolsViewKind::Hover, false);
        }
    }

    /// Make `id` the only hover-active entry. `None` or an unknown id
    /// leaves the current state alone.
    pub fn active_item(&mut self, id: Option<&ElementId>) -> bool {
        let Some(index) = id.and_then(|id| self.nodes.iter().position(|n| n.id() == id)) else {
            return false;
        };
        self.blur_all();
        self.nodes[index].item_mut().set_tools_visible(ToolsViewKind::Hover, true);
        true
    }

    /// The hover-active entry, if any.
    pub fn active(&self) -> Option<&HierarchyNode> {
        self.nodes.iter().find(|n| n.item().is_visible(ToolsViewKind::Hover))
    }

    /// Activate `id` and announce the selection.
    pub fn select(&mut self, id: &ElementId) -> bool {
        if !self.active_item(Some(id)) {
            return false;
        }
        if let Some(node) = self.nodes.iter().find(|n| n.id() == id) {
            self.bus.emit(&HierarchyEvent::Selected(node));
        }
        true
    }

    /// Mark every plain element except `source` as a valid link end.
    pub fn show_link_targets(&mut self, source: &ElementId) {
        for node in &mut self.nodes {
            let visible = matches!(node, HierarchyNode::Element(_)) && node.id() != source;
            node.item_mut().set_tools_visible(ToolsViewKind::ValidForLink, visible);
        }
    }

    pub fn hide_link_targets(&mut self) {
        for node in &mut self.nodes {
            node.item_mut().set_tools_visible(ToolsViewKind::ValidForLink, false);
        }
    }

    pub fn change_label<G: ElementGraph + ?Sized>(&mut self, graph: &mut G, id: &ElementId, name: &str) -> bool {
        self.find_mut(id).is_some_and(|node| node.item_mut().change_label(graph, name))
    }

    /// Replace the registry with entries for every element of `diagram`.
    pub fn reload(&mut self, diagram: &Diagram) -> Result<()> {
        let staged = stage(diagram)?;
        self.clear();
        for node in staged {
            self.add(node);
        }
        Ok(())
    }

    /// Register one element already present in `diagram`, joining it to
    /// the registered groups its tags name.
    pub fn register(&mut self, diagram: &Diagram, id: &ElementId) -> bool {
        let Some(cell) = diagram.cell(id) else {
            return false;
        };
        let (Some(node), Some(core)) = (node_for(diagram, cell), cell.element()) else {
            return false;
        };
        if !self.add(node) {
            return false;
        }
        for node in &mut self.nodes {
            let HierarchyNode::Group(group) = node else { continue };
            if group.item.id == core.id || !core.in_group(&group.item.name) {
                continue;
            }
            if let Some(origin) = diagram.position_of(&group.item.id) {
                group.attach(core.id.clone(), core.position, origin);
            }
        }
        true
    }

    /// Move `id` to `position` and carry group members along.
    ///
    /// Members of a moved group are placed at `group + offset`, recursively
    /// for nested groups. Afterwards every group refreshes the offsets of
    /// its members that moved, so dragging a member inside its group is
    /// remembered. Returns the ids that were repositioned, `id` first.
    pub fn element_moved<G: ElementGraph + ?Sized>(
        &mut self,
        graph: &mut G,
        id: &ElementId,
        position: Point,
    ) -> Vec<ElementId> {
        if !graph.set_position(id, position) {
            return Vec::new();
        }
        let mut moved = vec![id.clone()];
        let mut visited: HashSet<ElementId> = HashSet::from([id.clone()]);
        let mut queue = VecDeque::from([(id.clone(), position)]);

        while let Some((current, origin)) = queue.pop_front() {
            let Some(group) = self.find(&current).and_then(HierarchyNode::as_group) else {
                continue;
            };
            for (child, at) in group.child_positions(origin) {
                if !visited.insert(child.clone()) {
                    continue;
                }
                if graph.set_position(&child, at) {
                    moved.push(child.clone());
                    queue.push_back((child, at));
                }
            }
        }

        for node in &mut self.nodes {
            let HierarchyNode::Group(group) = node else { continue };
            let Some(origin) = graph.position_of(&group.item.id) else { continue };
            for child in group.children.iter_mut().filter(|c| moved.contains(&c.element)) {
                if let Some(at) = graph.position_of(&child.element) {
                    child.offset = at.offset_from(origin);
                }
            }
        }
        moved
    }
}

fn node_for(diagram: &Diagram, cell: &DiagramCell) -> Option<HierarchyNode> {
    match cell {
        DiagramCell::Group(g) => {
            let mut group = HierarchyGroupItem::new(HierarchyItem::for_element(&g.core));
            let members = diagram
                .cells
                .iter()
                .filter_map(DiagramCell::element)
                .filter(|e| e.id != g.core.id && e.in_group(&g.core.label));
            for member in members {
                group.attach(member.id.clone(), member.position, g.core.position);
            }
            Some(HierarchyNode::Group(group))
        }
        DiagramCell::Link(_) => None,
        other => other.element().map(|core| HierarchyNode::Element(HierarchyItem::for_element(core))),
    }
}

/// Entries for every element of `diagram`, in graph order.
fn stage(diagram: &Diagram) -> Result<Vec<HierarchyNode>> {
    let mut seen: HashSet<&ElementId> = HashSet::new();
    let mut staged = Vec::new();
    for cell in &diagram.cells {
        let Some(node) = node_for(diagram, cell) else { continue };
        if !seen.insert(cell.id()) {
            return Err(Error::DuplicateElementId { id: cell.id().to_string() });
        }
        staged.push(node);
    }
    Ok(staged)
}
