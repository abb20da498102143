// Flatten: diagram -> simplified document.
//
// Two passes, mirroring how the model reads a diagram:
// 1. every non-group element becomes a cell (title, fill, position, groups)
// 2. every link whose two ends resolve appends the target title to the
//    source cell's connections
//
// Dangling links and ends that do not map back to a cell are skipped.

use crate::diagram::{Diagram, DiagramCell, ElementCore, ElementId, IdentityResolver, TitleResolver};

use super::{SimplifiedCell, SimplifiedDocument};

pub fn flatten(diagram: &Diagram) -> SimplifiedDocument {
    flatten_with(diagram, &TitleResolver)
}

pub fn flatten_with<R: IdentityResolver>(diagram: &Diagram, resolver: &R) -> SimplifiedDocument {
    let mut cells: Vec<SimplifiedCell> = Vec::new();

    for cell in &diagram.cells {
        let (core, color) = match cell {
            DiagramCell::Rectangle(s) => (&s.core, (!s.fill.is_empty()).then(|| s.fill.clone())),
            DiagramCell::Image(i) => (&i.core, None),
            DiagramCell::Group(_) | DiagramCell::Link(_) => continue,
        };
        cells.push(SimplifiedCell {
            title: resolver.key_of(core).to_string(),
            color,
            position: core.position,
            connections: Vec::new(),
            groups: core.groups.clone(),
        });
    }

    for link in diagram.links() {
        let (Some(source), Some(target)) =
            (endpoint(diagram, &link.source), endpoint(diagram, &link.target))
        else {
            tracing::debug!(link = %link.id, "skipping dangling link");
            continue;
        };

        let source_key = resolver.key_of(source);
        let target_key = resolver.key_of(target);
        if !cells.iter().any(|c| c.title == target_key) {
            continue;
        }
        if let Some(cell) = cells.iter_mut().find(|c| c.title == source_key) {
            cell.connections.push(target_key.to_string());
        }
    }

    SimplifiedDocument { cells }
}

/// Element behind a link end, if it is a connectable node.
fn endpoint<'a>(diagram: &'a Diagram, id: &ElementId) -> Option<&'a ElementCore> {
    match diagram.cell(id)? {
        DiagramCell::Group(_) | DiagramCell::Link(_) => None,
        other => other.element(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::tests::{rect, rect_in};
    use crate::diagram::{DiagramLink, GroupContainer, ImageElement};
    use crate::geometry::{Point, Size};

    #[test]
    fn test_flatten_elements_and_links() {
        let mut d = Diagram::default();
        let a = d.push(rect_in("A", 0.0, 0.0, &["g"]));
        let b = d.push(rect("B", 200.0, 0.0));
        d.connect(&a, &b).unwrap();

        let doc = flatten(&d);
        assert_eq!(doc.cells.len(), 2);
        assert_eq!(doc.cells[0].title, "A");
        assert_eq!(doc.cells[0].groups, vec!["g".to_string()]);
        assert_eq!(doc.cells[0].connections, vec!["B".to_string()]);
        assert_eq!(doc.cells[0].color.as_deref(), Some("#2ECC71"));
        assert!(doc.cells[1].connections.is_empty());
        assert_eq!(doc.cells[1].position, Point::new(200.0, 0.0));
    }

    #[test]
    fn test_flatten_skips_group_containers() {
        let mut d = Diagram::default();
        d.push(DiagramCell::Group(GroupContainer {
            core: ElementCore::new("g", Point::default(), Size::default()),
            stroke: "#000000".to_string(),
            dash: "5,5".to_string(),
        }));
        d.push(rect_in("A", 0.0, 0.0, &["g"]));
        let doc = flatten(&d);
        assert_eq!(doc.cells.len(), 1);
        assert_eq!(doc.cells[0].title, "A");
    }

    #[test]
    fn test_flatten_image_has_no_color() {
        let mut d = Diagram::default();
        d.push(DiagramCell::Image(ImageElement {
            core: ElementCore::new("EC2", Point::new(5.0, 5.0), Size { width: 100.0, height: 100.0 }),
            href: "https://icons/ec2.svg".to_string(),
        }));
        let doc = flatten(&d);
        assert_eq!(doc.cells[0].color, None);
        assert_eq!(doc.cells[0].title, "EC2");
    }

    #[test]
    fn test_flatten_skips_dangling_links() {
        let mut d = Diagram::default();
        let a = d.push(rect("A", 0.0, 0.0));
        d.push(DiagramCell::Link(DiagramLink::new(a, ElementId("gone".to_string()))));
        let doc = flatten(&d);
        assert!(doc.cells[0].connections.is_empty());
    }

    #[test]
    fn test_flatten_duplicate_titles_attach_to_first() {
        let mut d = Diagram::default();
        d.push(rect("A", 0.0, 0.0));
        let second_a = d.push(rect("A", 300.0, 0.0));
        let b = d.push(rect("B", 600.0, 0.0));
        d.connect(&second_a, &b).unwrap();

        let doc = flatten(&d);
        assert_eq!(doc.cells[0].connections, vec!["B".to_string()]);
        assert!(doc.cells[1].connections.is_empty());
    }
}
