// Hierarchy entries.
//
// An item pairs an element id with its interactive affordances (tool
// views). It does not own the element; the diagram does. A group entry
// additionally records each member's offset from the group origin at the
// time the member joined, so a group move places members at
// `group_position + offset` instead of accumulating deltas.

use serde::Serialize;

use crate::diagram::{ElementCore, ElementId};
use crate::geometry::{Point, Vector};

use super::ElementGraph;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolsViewKind {
    /// Boundary and resize handles shown while the element is hovered.
    Hover,
    /// Marker on elements that may end a link being drawn.
    ValidForLink,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolsViewItem {
    pub kind: ToolsViewKind,
    pub visible: bool,
}

impl ToolsViewItem {
    pub fn hidden(kind: ToolsViewKind) -> Self {
        Self { kind, visible: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyItem {
    /// Same as the element id.
    pub id: ElementId,
    pub name: String,
    pub tools: Vec<ToolsViewItem>,
}

impl HierarchyItem {
    /// Item with a hidden hover view.
    pub fn new(id: ElementId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), tools: vec![ToolsViewItem::hidden(ToolsViewKind::Hover)] }
    }

    pub fn for_element(core: &ElementCore) -> Self {
        Self::new(core.id.clone(), core.label.clone())
    }

    pub fn tools_view(&self, kind: ToolsViewKind) -> Option<&ToolsViewItem> {
        self.tools.iter().find(|t| t.kind == kind)
    }

    /// Show or hide the view of `kind`, creating it on first show.
    pub fn set_tools_visible(&mut self, kind: ToolsViewKind, visible: bool) {
        match self.tools.iter_mut().find(|t| t.kind == kind) {
            Some(view) => view.visible = visible,
            None if visible => self.tools.push(ToolsViewItem { kind, visible }),
            None => {}
        }
    }

    pub fn is_visible(&self, kind: ToolsViewKind) -> bool {
        self.tools_view(kind).is_some_and(|t| t.visible)
    }

    /// Rename the item and its element's label together.
    pub fn change_label<G: ElementGraph + ?Sized>(&mut self, graph: &mut G, name: &str) -> bool {
        if !graph.set_label(&self.id, name) {
            return false;
        }
        self.name = name.to_string();
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupChild {
    pub element: ElementId,
    pub offset: Vector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyGroupItem {
    #[serde(flatten)]
    pub item: HierarchyItem,
    pub children: Vec<GroupChild>,
}

impl HierarchyGroupItem {
    pub fn new(item: HierarchyItem) -> Self {
        Self { item, children: Vec::new() }
    }

    /// Record `element` as a member sitting at `at` while the group is at
    /// `origin`. Re-attaching refreshes the offset.
    pub fn attach(&mut self, element: ElementId, at: Point, origin: Point) {
        let offset = at.offset_from(origin);
        match self.children.iter_mut().find(|c| c.element == element) {
            Some(child) => child.offset = offset,
            None => self.children.push(GroupChild { element, offset }),
        }
    }

    pub fn contains(&self, element: &ElementId) -> bool {
        self.children.iter().any(|c| &c.element == element)
    }

    /// Where every member belongs when the group sits at `origin`.
    pub fn child_positions(&self, origin: Point) -> Vec<(ElementId, Point)> {
        self.children.iter().map(|c| (c.element.clone(), origin.translate(c.offset))).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HierarchyNode {
    Element(HierarchyItem),
    Group(HierarchyGroupItem),
}

impl HierarchyNode {
    pub fn item(&self) -> &HierarchyItem {
        match self {
            HierarchyNode::Element(item) => item,
            HierarchyNode::Group(group) => &group.item,
        }
    }

    pub fn item_mut(&mut self) -> &mut HierarchyItem {
        match self {
            HierarchyNode::Element(item) => item,
            HierarchyNode::Group(group) => &mut group.item,
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.item().id
    }

    pub fn as_group(&self) -> Option<&HierarchyGroupItem> {
        match self {
            HierarchyNode::Group(g) => Some(g),
            HierarchyNode::Element(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ElementId {
        ElementId(s.to_string())
    }

    #[test]
    fn test_new_item_has_hidden_hover_view() {
        let item = HierarchyItem::new(id("a"), "A");
        assert_eq!(item.tools_view(ToolsViewKind::Hover), Some(&ToolsViewItem::hidden(ToolsViewKind::Hover)));
        assert!(item.tools_view(ToolsViewKind::ValidForLink).is_none());
    }

    #[test]
    fn test_tools_view_created_on_first_show() {
        let mut item = HierarchyItem::new(id("a"), "A");
        item.set_tools_visible(ToolsViewKind::ValidForLink, false);
        assert!(item.tools_view(ToolsViewKind::ValidForLink).is_none());
        item.set_tools_visible(ToolsViewKind::ValidForLink, true);
        assert!(item.is_visible(ToolsViewKind::ValidForLink));
        assert_eq!(item.tools.len(), 2);
    }

    #[test]
    fn test_attach_records_offset() {
        let mut g = HierarchyGroupItem::new(HierarchyItem::new(id("g"), "g"));
        g.attach(id("a"), Point::new(20.0, 20.0), Point::new(0.0, 0.0));
        g.attach(id("b"), Point::new(40.0, 40.0), Point::new(0.0, 0.0));
        g.attach(id("a"), Point::new(25.0, 20.0), Point::new(0.0, 0.0));

        assert_eq!(g.children.len(), 2);
        assert_eq!(
            g.child_positions(Point::new(10.0, 5.0)),
            vec![(id("a"), Point::new(35.0, 25.0)), (id("b"), Point::new(50.0, 45.0))]
        );
    }

    #[test]
    fn test_node_serializes_with_kind_tag() {
        let node = HierarchyNode::Element(HierarchyItem::new(id("a"), "A"));
        let v = serde_json::to_value(&node).unwrap();
        assert_eq!(v["kind"], "element");
        assert_eq!(v["tools"][0]["kind"], "hover");
    }
}
