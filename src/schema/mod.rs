//! The AI-facing schema and the mappings between it and the diagram model.
//!
//! ```text
//! model text --(csv | extract)--> SimplifiedDocument --materialize--> cells
//!                                         ^                             |
//!                                         |                      extract_groups
//!                                      flatten <------- Diagram <-------+
//! ```

pub mod csv;
pub mod extract;
pub mod flatten;
pub mod groups;
pub mod icons;
pub mod materialize;
pub mod prompt;
mod types;

pub use csv::{extract_csv_document, parse_csv_document};
pub use extract::{extract_json_document, parse_json_document};
pub use flatten::{flatten, flatten_with};
pub use groups::extract_groups;
pub use icons::{select_icon, IconMatch, IconMatcher};
pub use materialize::{materialize, materialize_with};
pub use types::{SimplifiedCell, SimplifiedDocument};

use crate::config::MapperConfig;
use crate::diagram::Diagram;

/// Materialize `doc` and add group containers: the full inbound pipeline.
pub fn build_diagram(doc: &SimplifiedDocument, cfg: &MapperConfig) -> Diagram {
    Diagram::new(extract_groups(materialize(doc, cfg), cfg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::DiagramCell;

    fn sorted_nodes(doc: &SimplifiedDocument) -> Vec<(String, (i64, i64), Vec<String>)> {
        let mut v: Vec<_> = doc
            .cells
            .iter()
            .map(|c| (c.title.clone(), (c.position.x as i64, c.position.y as i64), c.groups.clone()))
            .collect();
        v.sort();
        v
    }

    fn sorted_edges(doc: &SimplifiedDocument) -> Vec<(String, String)> {
        let mut v: Vec<_> = doc.edges().into_iter().map(|(a, b)| (a.to_string(), b.to_string())).collect();
        v.sort();
        v
    }

    #[test]
    fn test_round_trip_keeps_titles_positions_groups_and_edges() {
        let doc = SimplifiedDocument::new(vec![
            SimplifiedCell::new("Gateway", 0.0, 0.0).connect("Orders").connect("Billing"),
            SimplifiedCell::new("Orders", 300.0, 0.0).connect("Billing").group("backend"),
            SimplifiedCell::new("Billing", 300.0, 300.0).group("backend").color("#3498DB"),
        ]);
        let cfg = MapperConfig::without_icons();

        let diagram = build_diagram(&doc, &cfg);
        assert_eq!(diagram.cells.iter().filter(|c| c.is_group()).count(), 1);

        let back = flatten(&diagram);
        assert_eq!(sorted_nodes(&back), sorted_nodes(&doc));
        assert_eq!(sorted_edges(&back), sorted_edges(&doc));
        assert_eq!(back.find("Billing").and_then(|c| c.color.as_deref()), Some("#3498DB"));
        assert_eq!(back.find("Gateway").and_then(|c| c.color.as_deref()), Some(cfg.default_fill.as_str()));
    }

    #[test]
    fn test_csv_pipeline_builds_groups() {
        let text = "```csv\ntitle,color,position.x,position.y,connections,groups\n\
                    Web,,0,0,Api,front\nCdn,,0,200,Web,front\nApi,,300,0,,\n```";
        let diagram = build_diagram(&extract_csv_document(text), &MapperConfig::without_icons());
        let DiagramCell::Group(g) = &diagram.cells[0] else { panic!("container must come first") };
        assert_eq!(g.core.label, "front");
        assert_eq!(diagram.links().count(), 2);
    }

    #[test]
    fn test_empty_document_builds_empty_diagram() {
        assert!(build_diagram(&SimplifiedDocument::default(), &MapperConfig::default()).is_empty());
    }
}
