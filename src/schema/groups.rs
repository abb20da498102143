// Group extraction.
//
// Reads the group tags of every element and synthesizes one dashed,
// unfilled container per group with at least two members, sized to the
// padded bounding box of those members. Containers are prepended so they
// render behind their members:
//
//   [...new containers, ...input cells]
//
// Groups that already have a container in the input are left alone.

use std::collections::HashMap;

use crate::config::MapperConfig;
use crate::diagram::{DiagramCell, ElementCore, GroupContainer};
use crate::geometry::{bounding_box, Placed, Rect};

/// Group name -> member elements, in first-seen order.
pub fn group_members(cells: &[DiagramCell]) -> Vec<(&str, Vec<&ElementCore>)> {
    let mut order: Vec<(&str, Vec<&ElementCore>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for core in cells.iter().filter(|c| !c.is_group()).filter_map(DiagramCell::element) {
        for name in &core.groups {
            let slot = *index.entry(name.as_str()).or_insert_with(|| {
                order.push((name.as_str(), Vec::new()));
                order.len() - 1
            });
            order[slot].1.push(core);
        }
    }
    order
}

/// Padded box around the given members.
pub fn group_bounds(members: &[&ElementCore], padding: f64) -> Rect {
    let rects: Vec<Rect> = members.iter().map(|m| m.bounds()).collect();
    bounding_box(&rects, padding)
}

pub fn extract_groups(cells: Vec<DiagramCell>, cfg: &MapperConfig) -> Vec<DiagramCell> {
    let existing: Vec<&str> = cells
        .iter()
        .filter(|c| c.is_group())
        .filter_map(DiagramCell::element)
        .map(|e| e.label.as_str())
        .collect();

    let containers: Vec<DiagramCell> = group_members(&cells)
        .into_iter()
        .filter(|(name, members)| {
            if members.len() < 2 {
                tracing::debug!(group = %name, "single-member group is not materialized");
                return false;
            }
            !existing.contains(name)
        })
        .map(|(name, members)| {
            let bb = group_bounds(&members, cfg.group_padding);
            DiagramCell::Group(GroupContainer {
                core: ElementCore::new(name, bb.origin(), bb.size()),
                stroke: cfg.group_stroke.clone(),
                dash: cfg.group_dash.clone(),
            })
        })
        .collect();

    let mut out = containers;
    out.extend(cells);
    out
}
