// Materialize: simplified document -> diagram cells.
//
// 1. one node per cell: image-backed when an icon matches the title,
//    otherwise a rectangle filled with the cell color
// 2. gap normalization over all nodes
// 3. one link per resolvable connection
//
// Output order: nodes first, then links. Group containers are added
// separately by `extract_groups`.

use crate::config::MapperConfig;
use crate::diagram::{
    DiagramCell, DiagramLink, ElementCore, IdentityResolver, ImageElement, ShapeElement, ShapeKind,
    TitleResolver,
};
use crate::geometry::normalize_gap;

use super::icons::IconMatcher;
use super::{SimplifiedCell, SimplifiedDocument};

pub fn materialize(doc: &SimplifiedDocument, cfg: &MapperConfig) -> Vec<DiagramCell> {
    let icons = cfg.auto_select_icons.then(IconMatcher::builtin);
    materialize_with(doc, cfg, icons, &TitleResolver)
}

pub fn materialize_with<R: IdentityResolver>(
    doc: &SimplifiedDocument,
    cfg: &MapperConfig,
    icons: Option<&IconMatcher>,
    resolver: &R,
) -> Vec<DiagramCell> {
    let mut nodes: Vec<DiagramCell> = doc.cells.iter().map(|c| build_node(c, cfg, icons)).collect();

    {
        let mut cores: Vec<&mut ElementCore> = nodes.iter_mut().filter_map(DiagramCell::element_mut).collect();
        normalize_gap(&mut cores, cfg.min_gap);
    }

    let mut links = Vec::new();
    for cell in &doc.cells {
        let Some(source) = resolver.resolve(&nodes, &cell.title) else {
            continue;
        };
        for connection in &cell.connections {
            match resolver.resolve(&nodes, connection) {
                Some(target) => {
                    links.push(DiagramCell::Link(DiagramLink::new(source.id.clone(), target.id.clone())));
                }
                None => {
                    tracing::debug!(source = %cell.title, target = %connection, "dropping unresolved connection");
                }
            }
        }
    }

    nodes.extend(links);
    nodes
}

fn build_node(cell: &SimplifiedCell, cfg: &MapperConfig, icons: Option<&IconMatcher>) -> DiagramCell {
    let core = ElementCore::new(cell.title.clone(), cell.position, cfg.node_size).with_groups(cell.groups.iter().cloned());

    if let Some(icon) = icons.and_then(|m| m.select(&cell.title)) {
        return DiagramCell::Image(ImageElement { core, href: icon.url });
    }

    let fill = match cell.color.as_deref() {
        Some(c) if !c.trim().is_empty() => c.to_string(),
        _ => cfg.default_fill.clone(),
    };
    DiagramCell::Rectangle(ShapeElement {
        core,
        shape: ShapeKind::Rectangle,
        fill,
        fill_opacity: Some(cfg.fill_opacity),
        label_color: Some(cfg.label_color.clone()),
        wrap_label: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Size};
    use crate::schema::icons::IconCatalog;

    fn plain() -> MapperConfig {
        MapperConfig::without_icons()
    }

    fn spread_doc() -> SimplifiedDocument {
        SimplifiedDocument::new(vec![
            SimplifiedCell::new("A", 0.0, 0.0).connect("B").color("#FF0000"),
            SimplifiedCell::new("B", 300.0, 0.0).connect("C").connect("Ghost"),
            SimplifiedCell::new("C", 300.0, 300.0),
        ])
    }

    #[test]
    fn test_nodes_then_links() {
        let cells = materialize(&spread_doc(), &plain());
        assert_eq!(cells.len(), 5);
        assert!(cells[..3].iter().all(|c| c.element().is_some()));
        assert!(cells[3..].iter().all(|c| c.as_link().is_some()));
    }

    #[test]
    fn test_rectangle_attributes() {
        let cells = materialize(&spread_doc(), &plain());
        let DiagramCell::Rectangle(a) = &cells[0] else { panic!("expected rectangle") };
        assert_eq!(a.fill, "#FF0000");
        assert_eq!(a.core.size, Size { width: 100.0, height: 100.0 });
        assert!(a.wrap_label);
        let DiagramCell::Rectangle(b) = &cells[1] else { panic!("expected rectangle") };
        assert_eq!(b.fill, "#2ECC71");
    }

    #[test]
    fn test_unresolved_connection_is_dropped() {
        let cells = materialize(&spread_doc(), &plain());
        let ids: Vec<_> = cells.iter().filter_map(|c| c.element()).map(|e| e.id.clone()).collect();
        let links: Vec<_> = cells.iter().filter_map(DiagramCell::as_link).collect();
        assert_eq!(links.len(), 2);
        assert_eq!((&links[0].source, &links[0].target), (&ids[0], &ids[1]));
        assert_eq!((&links[1].source, &links[1].target), (&ids[1], &ids[2]));
    }

    #[test]
    fn test_spread_positions_are_kept() {
        let cells = materialize(&spread_doc(), &plain());
        assert_eq!(cells[2].element().unwrap().position, Point::new(300.0, 300.0));
    }

    #[test]
    fn test_clustered_positions_are_spread() {
        let doc = SimplifiedDocument::new(vec![
            SimplifiedCell::new("A", 0.0, 0.0),
            SimplifiedCell::new("B", 20.0, 30.0),
        ]);
        let cells = materialize(&doc, &plain());
        assert_eq!(cells[1].element().unwrap().position, Point::new(50.0, 75.0));
    }

    #[test]
    fn test_icon_backed_node() {
        let icons = IconMatcher::new(vec![IconCatalog::new("aws", "cdn/", vec!["aws/ec2/instance.svg".to_string()])]);
        let doc = SimplifiedDocument::new(vec![
            SimplifiedCell::new("EC2 Instance", 0.0, 0.0).group("vpc"),
            SimplifiedCell::new("Billing", 400.0, 400.0),
        ]);
        let cells = materialize_with(&doc, &MapperConfig::default(), Some(&icons), &TitleResolver);
        let DiagramCell::Image(img) = &cells[0] else { panic!("expected image") };
        assert_eq!(img.href, "cdn/aws/ec2/instance.svg");
        assert_eq!(img.core.groups, vec!["vpc".to_string()]);
        assert!(matches!(cells[1], DiagramCell::Rectangle(_)));
    }

    #[test]
    fn test_duplicate_titles_link_first_match() {
        let doc = SimplifiedDocument::new(vec![
            SimplifiedCell::new("A", 0.0, 0.0),
            SimplifiedCell::new("A", 400.0, 0.0),
            SimplifiedCell::new("B", 0.0, 400.0).connect("A"),
        ]);
        let cells = materialize(&doc, &plain());
        let link = cells.iter().find_map(DiagramCell::as_link).unwrap();
        assert_eq!(&link.target, cells[0].id());
    }
}
