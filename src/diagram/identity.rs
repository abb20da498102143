// Identity resolution between diagram elements and simplified cells.
//
// The simplified schema has no ids; cells are joined to elements by a key.
// Today that key is the label text (first match wins on duplicates). The
// trait keeps that decision in one place.

use super::{DiagramCell, ElementCore};

pub trait IdentityResolver {
    /// Key written into the simplified schema for `element`.
    fn key_of<'a>(&self, element: &'a ElementCore) -> &'a str;

    /// First connectable element whose key equals `key`.
    fn resolve<'a>(&self, cells: &'a [DiagramCell], key: &str) -> Option<&'a ElementCore> {
        cells
            .iter()
            .filter(|c| !c.is_group())
            .filter_map(DiagramCell::element)
            .find(|e| self.key_of(e) == key)
    }
}

/// Joins on label text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TitleResolver;

impl IdentityResolver for TitleResolver {
    fn key_of<'a>(&self, element: &'a ElementCore) -> &'a str {
        &element.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::tests::rect;

    #[test]
    fn test_first_match_wins_on_duplicate_titles() {
        let cells = vec![rect("A", 0.0, 0.0), rect("A", 500.0, 0.0), rect("B", 0.0, 0.0)];
        let found = TitleResolver.resolve(&cells, "A").unwrap();
        assert_eq!(found.position.x, 0.0);
        assert!(TitleResolver.resolve(&cells, "C").is_none());
    }
}
