// Icon matcher.
//
// Scores catalog paths against a free-text title by token overlap:
//
//   title  "EC2 Instance"          -> {ec2, instance}
//   path   "aws/ec2/instance.svg"  -> aws, ec2, instance, svg
//   rate   = matches / title_words * 100 = 200 / 2 = 100
//
// Catalogs are consulted in order; the first catalog with any nonzero match
// wins, and within a catalog the strictly highest rate wins (ties keep the
// earlier path).

use std::collections::HashSet;
use std::sync::OnceLock;

use serde::Serialize;

use crate::error::Result;

const CLOUD_ICONS: &str = include_str!("assets/cloud-icons.json");
const GENERAL_ICONS: &str = include_str!("assets/general-icons.json");

/// Bundled icons are served next to the editor bundle.
pub const CLOUD_ICONS_BASE: &str = "icons/cloud/";
pub const GENERAL_ICONS_BASE: &str = "icons/general/";

#[derive(Debug, Clone)]
pub struct IconCatalog {
    pub name: String,
    pub base_url: String,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IconMatch {
    pub catalog: String,
    pub path: String,
    /// `base_url + path`, ready to use as an image href.
    pub url: String,
    pub rate: f64,
}

impl IconCatalog {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, paths: Vec<String>) -> Self {
        Self { name: name.into(), base_url: base_url.into(), paths }
    }

    /// Catalog from a JSON array of paths.
    pub fn from_json(name: &str, base_url: &str, json: &str) -> Result<Self> {
        let paths: Vec<String> = serde_json::from_str(json)?;
        Ok(Self::new(name, base_url, paths))
    }

    fn best_match(&self, title_words: &HashSet<&str>, word_count: usize) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for path in &self.paths {
            let lower = path.to_lowercase();
            let matches = lower
                .split('/')
                .flat_map(|part| part.split(['-', '_', '.']))
                .filter(|w| !w.is_empty() && title_words.contains(w))
                .count();
            let rate = matches as f64 / word_count as f64 * 100.0;
            if rate > best.map_or(0.0, |(_, r)| r) {
                best = Some((path.as_str(), rate));
            }
        }
        best
    }
}

#[derive(Debug, Clone, Default)]
pub struct IconMatcher {
    catalogs: Vec<IconCatalog>,
}

impl IconMatcher {
    pub fn new(catalogs: Vec<IconCatalog>) -> Self {
        Self { catalogs }
    }

    /// Cloud/infra catalog first, then the general one.
    pub fn builtin() -> &'static IconMatcher {
        static BUILTIN: OnceLock<IconMatcher> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let load = |name: &str, base: &str, json: &str| match IconCatalog::from_json(name, base, json) {
                Ok(c) => Some(c),
                Err(e) => {
                    tracing::error!(catalog = name, error = %e, "bundled icon catalog is unreadable");
                    None
                }
            };
            IconMatcher::new(
                [
                    load("cloud", CLOUD_ICONS_BASE, CLOUD_ICONS),
                    load("general", GENERAL_ICONS_BASE, GENERAL_ICONS),
                ]
                .into_iter()
                .flatten()
                .collect(),
            )
        })
    }

    pub fn catalogs(&self) -> &[IconCatalog] {
        &self.catalogs
    }

    pub fn select(&self, title: &str) -> Option<IconMatch> {
        let lower = title.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();
        if words.is_empty() {
            return None;
        }
        let set: HashSet<&str> = words.iter().copied().collect();

        self.catalogs.iter().find_map(|catalog| {
            let (path, rate) = catalog.best_match(&set, words.len())?;
            Some(IconMatch {
                catalog: catalog.name.clone(),
                path: path.to_string(),
                url: format!("{}{}", catalog.base_url, path),
                rate,
            })
        })
    }
}

/// Best icon for `title` from the bundled catalogs.
pub fn select_icon(title: &str) -> Option<IconMatch> {
    IconMatcher::builtin().select(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(name: &str, paths: &[&str]) -> IconCatalog {
        IconCatalog::new(name, format!("{name}/"), paths.iter().map(|p| p.to_string()).collect())
    }

    #[test]
    fn test_token_overlap_match() {
        let m = IconMatcher::new(vec![catalog("aws", &["aws/s3/bucket.svg", "aws/ec2/instance.svg"])]);
        let hit = m.select("ec2 instance").unwrap();
        assert_eq!(hit.path, "aws/ec2/instance.svg");
        assert_eq!(hit.url, "aws/aws/ec2/instance.svg");
        assert_eq!(hit.rate, 100.0);
    }

    #[test]
    fn test_title_is_case_insensitive() {
        let m = IconMatcher::new(vec![catalog("aws", &["aws/ec2/instance.svg"])]);
        assert!(m.select("EC2 Instance").is_some());
    }

    #[test]
    fn test_no_overlap_or_empty_catalog() {
        let m = IconMatcher::new(vec![catalog("aws", &["aws/ec2/instance.svg"])]);
        assert!(m.select("payment ledger").is_none());
        assert!(IconMatcher::default().select("ec2 instance").is_none());
        assert!(m.select("   ").is_none());
    }

    #[test]
    fn test_ties_keep_first_path() {
        let m = IconMatcher::new(vec![catalog("c", &["a/cache_node.png", "b/cache-node.png"])]);
        assert_eq!(m.select("cache node").unwrap().path, "a/cache_node.png");
    }

    #[test]
    fn test_higher_rate_wins_within_catalog() {
        let m = IconMatcher::new(vec![catalog("c", &["db/table.png", "db/dynamodb-table.png"])]);
        assert_eq!(m.select("dynamodb table").unwrap().path, "db/dynamodb-table.png");
    }

    #[test]
    fn test_first_catalog_wins_on_any_match() {
        let m = IconMatcher::new(vec![
            catalog("first", &["x/redis.png"]),
            catalog("second", &["y/redis-cache.png"]),
        ]);
        let hit = m.select("redis cache").unwrap();
        assert_eq!(hit.catalog, "first");
        assert_eq!(hit.rate, 50.0);
    }

    #[test]
    fn test_falls_through_to_second_catalog() {
        let m = IconMatcher::new(vec![catalog("first", &["x/kafka.png"]), catalog("second", &["y/user.png"])]);
        assert_eq!(m.select("user").unwrap().catalog, "second");
    }

    #[test]
    fn test_builtin_catalogs_load() {
        let m = IconMatcher::builtin();
        assert_eq!(m.catalogs().len(), 2);
        assert_eq!(m.catalogs()[0].name, "cloud");
        let hit = select_icon("ec2 instance").unwrap();
        assert_eq!(hit.url, "icons/cloud/aws/ec2/instance.svg");
        assert_eq!(select_icon("postgresql").unwrap().catalog, "general");
    }
}
