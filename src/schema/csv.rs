// CSV bridge: the alternate model output channel.
//
// Dialect:
//   title,color,position.x,position.y,connections,groups
//   Gadget Pro,#00FF77,102,305,ConnectorA;ConnectorB,GroupA
//
// - header on the first line, one comma-delimited row per following line,
//   read with the `csv` crate with quoting off
// - quotes, slashes, backslashes and line breaks are stripped from fields
// - `connections` and `groups` are `;`-separated lists
// - rows without title, position.x or position.y are dropped
// - a non-numeric coordinate becomes NaN rather than rejecting the row

use std::collections::HashMap;

use crate::geometry::Point;

use super::{SimplifiedCell, SimplifiedDocument};

pub const CSV_COLUMNS: [&str; 6] = ["title", "color", "position.x", "position.y", "connections", "groups"];
const REQUIRED_COLUMNS: [&str; 3] = ["title", "position.x", "position.y"];
const FENCE: &str = "```";

/// Interior of the first fenced block, trimmed. An info string on the
/// opening fence line (```csv) is skipped. Text without a complete fence
/// pair comes back unchanged.
pub fn extract_fenced_block(text: &str) -> &str {
    let Some(open) = text.find(FENCE) else {
        return text;
    };
    let after_open = open + FENCE.len();
    let Some(close_rel) = text[after_open..].find(FENCE) else {
        return text;
    };
    let mut inner = &text[after_open..after_open + close_rel];

    if let Some(newline) = inner.find('\n') {
        let info = inner[..newline].trim();
        if !info.is_empty() && !info.contains(',') {
            inner = &inner[newline + 1..];
        }
    }
    inner.trim()
}

fn clean_field(field: &str) -> String {
    field
        .chars()
        .filter(|c| !matches!(c, '"' | '/' | '\\' | '\n' | '\r'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Header-keyed rows. Fields are split on plain commas with no quoting;
/// short rows are kept and extra fields beyond the header are ignored.
pub fn parse_csv_rows(text: &str) -> Vec<HashMap<String, String>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .quoting(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header: Vec<String> = match reader.headers() {
        Ok(header) => header.iter().map(clean_field).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "unreadable CSV header");
            return Vec::new();
        }
    };

    reader
        .records()
        .filter_map(|record| match record {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable CSV record");
                None
            }
        })
        .map(|record| {
            header
                .iter()
                .zip(record.iter())
                .map(|(key, value)| (key.clone(), clean_field(value)))
                .collect()
        })
        .collect()
}

fn split_list(field: Option<&String>) -> Vec<String> {
    field
        .map(|f| {
            f.split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn coerce_number(field: &str) -> f64 {
    field.parse::<f64>().unwrap_or(f64::NAN)
}

pub fn parse_csv_document(csv: &str) -> SimplifiedDocument {
    let mut cells = Vec::new();

    for (index, row) in parse_csv_rows(csv).into_iter().enumerate() {
        // Stricter than key presence: an empty title or coordinate drops the row.
        let present = |column: &str| row.get(column).is_some_and(|v| !v.is_empty());
        if !REQUIRED_COLUMNS.iter().all(|c| present(*c)) {
            tracing::debug!(row = index + 1, "dropping CSV row without title or position");
            continue;
        }

        let mut groups: Vec<String> = Vec::new();
        for g in split_list(row.get("groups")) {
            if !groups.contains(&g) {
                groups.push(g);
            }
        }

        cells.push(SimplifiedCell {
            title: row["title"].clone(),
            color: row.get("color").filter(|c| !c.is_empty()).cloned(),
            position: Point::new(coerce_number(&row["position.x"]), coerce_number(&row["position.y"])),
            connections: split_list(row.get("connections")),
            groups,
        });
    }

    SimplifiedDocument { cells }
}

/// Fenced model output straight to a document.
pub fn extract_csv_document(text: &str) -> SimplifiedDocument {
    let doc = parse_csv_document(extract_fenced_block(text));
    if doc.is_empty() {
        tracing::warn!("model CSV output produced no cells");
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "title,color,position.x,position.y,connections,groups";

    #[test]
    fn test_extract_fenced_block_with_info_string() {
        let text = "Here you go:\n```csv\ntitle,color\nA,#fff\n```\nanything else";
        assert_eq!(extract_fenced_block(text), "title,color\nA,#fff");
    }

    #[test]
    fn test_extract_fenced_block_plain_fence() {
        let text = "```\ntitle,position.x\nA,1\n```";
        assert_eq!(extract_fenced_block(text), "title,position.x\nA,1");
    }

    #[test]
    fn test_extract_without_fences_returns_input() {
        assert_eq!(extract_fenced_block("title\nA"), "title\nA");
        assert_eq!(extract_fenced_block("```csv\nunterminated"), "```csv\nunterminated");
    }

    #[test]
    fn test_parse_full_row() {
        let csv = format!("{HEADER}\nGadget Pro,#00FF77,102,305,A;B;C,G1;G2\n");
        let doc = parse_csv_document(&csv);
        assert_eq!(doc.cells.len(), 1);
        let cell = &doc.cells[0];
        assert_eq!(cell.title, "Gadget Pro");
        assert_eq!(cell.color.as_deref(), Some("#00FF77"));
        assert_eq!(cell.position, Point::new(102.0, 305.0));
        assert_eq!(cell.connections, vec!["A", "B", "C"]);
        assert_eq!(cell.groups, vec!["G1", "G2"]);
    }

    #[test]
    fn test_row_missing_position_y_is_dropped() {
        let csv = "title,color,position.x\nA,#fff,10\n";
        assert!(parse_csv_document(csv).is_empty());

        let short_row = format!("{HEADER}\nA,#fff,10\nB,,20,30,,\n");
        let doc = parse_csv_document(&short_row);
        assert_eq!(doc.cells.len(), 1);
        assert_eq!(doc.cells[0].title, "B");
    }

    #[test]
    fn test_empty_lists_and_color() {
        let doc = parse_csv_document(&format!("{HEADER}\nB,,20,30,,\n"));
        let cell = &doc.cells[0];
        assert_eq!(cell.color, None);
        assert!(cell.connections.is_empty());
        assert!(cell.groups.is_empty());
    }

    #[test]
    fn test_fields_are_cleaned() {
        let doc = parse_csv_document(&format!("{HEADER}\n\"Web/App\",\"#123456\", 1 , 2 ,\"Db\",\n"));
        let cell = &doc.cells[0];
        assert_eq!(cell.title, "WebApp");
        assert_eq!(cell.color.as_deref(), Some("#123456"));
        assert_eq!(cell.position, Point::new(1.0, 2.0));
        assert_eq!(cell.connections, vec!["Db"]);
    }

    #[test]
    fn test_non_numeric_position_becomes_nan() {
        let doc = parse_csv_document(&format!("{HEADER}\nA,,left,30,,\n"));
        assert!(doc.cells[0].position.x.is_nan());
        assert_eq!(doc.cells[0].position.y, 30.0);
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let doc = parse_csv_document(&format!("{HEADER}\r\nA,,1,2,B,\r\n\r\nB,,3,4,,\r\n"));
        assert_eq!(doc.cells.len(), 2);
        assert_eq!(doc.cells[0].connections, vec!["B"]);
    }

    #[test]
    fn test_extract_csv_document_from_model_text() {
        let text = format!("Sure!\n```csv\n{HEADER}\nA,,0,0,B,\nB,,200,0,,\n```");
        let doc = extract_csv_document(&text);
        assert_eq!(doc.edges(), vec![("A", "B")]);
    }

    #[test]
    fn test_quotes_do_not_group_commas() {
        let doc = parse_csv_document(&format!("{HEADER}\n\"Web,App\",1,2,,\n"));
        assert_eq!(doc.cells.len(), 1);
        assert_eq!(doc.cells[0].title, "Web");
        assert_eq!(doc.cells[0].color.as_deref(), Some("App"));
    }

    #[test]
    fn test_empty_required_field_drops_row() {
        let doc = parse_csv_document(&format!("{HEADER}\nA,,,2,,\n,,1,2,,\nC,,1,2,,\n"));
        assert_eq!(doc.cells.len(), 1);
        assert_eq!(doc.cells[0].title, "C");
    }

    #[test]
    fn test_empty_input_has_no_rows() {
        assert!(parse_csv_rows("").is_empty());
        assert!(parse_csv_rows(HEADER).is_empty());
    }
}
