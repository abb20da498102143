use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Fill used for cells that come back from the model without a color.
pub const DEFAULT_FILL: &str = "#2ECC71";

#[derive(Debug, Clone)]
pub struct MapperConfig {
    /// Size of every materialized node (rectangle or image).
    pub node_size: Size,
    /// Minimum bounding-box dimension enforced by gap normalization.
    pub min_gap: f64,
    /// Padding around group members when a container is synthesized.
    pub group_padding: f64,
    pub default_fill: String,
    pub fill_opacity: f64,
    pub label_color: String,
    /// Try the icon catalogs before falling back to a rectangle.
    pub auto_select_icons: bool,
    pub group_stroke: String,
    pub group_dash: String,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            node_size: Size { width: 100.0, height: 100.0 },
            min_gap: 150.0,
            group_padding: 20.0,
            default_fill: DEFAULT_FILL.to_string(),
            fill_opacity: 0.5,
            label_color: "#000000".to_string(),
            auto_select_icons: true,
            group_stroke: "#000000".to_string(),
            group_dash: "5,5".to_string(),
        }
    }
}

impl MapperConfig {
    pub fn without_icons() -> Self {
        Self { auto_select_icons: false, ..Self::default() }
    }
}

/// Settings pushed by the host page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Echo the graph back to the host after every change.
    #[serde(default)]
    pub update_per_change: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_wire_format() {
        let s: EditorSettings = serde_json::from_str(r#"{"update_per_change": true}"#).unwrap();
        assert!(s.update_per_change);

        let empty: EditorSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, EditorSettings::default());
    }

    #[test]
    fn test_without_icons_keeps_other_defaults() {
        let cfg = MapperConfig::without_icons();
        assert!(!cfg.auto_select_icons);
        assert_eq!(cfg.min_gap, 150.0);
        assert_eq!(cfg.default_fill, DEFAULT_FILL);
    }
}
