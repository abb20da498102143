//! Language-model chain contract.
//!
//! The chains themselves (prompt templates, model transport) live in the
//! host. This module builds their inputs, turns their free-text answers
//! back into diagrams, and tracks which answer is still wanted when
//! requests overlap.

use serde::{Deserialize, Serialize};

use crate::config::MapperConfig;
use crate::diagram::Diagram;
use crate::error::Result;
use crate::schema::prompt::{CSV_SCHEMA, SIMPLIFIED_JSON_SCHEMA};
use crate::schema::{
    build_diagram, extract_csv_document, extract_json_document, flatten, parse_json_document, SimplifiedDocument,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainKind {
    /// Description -> JSON document.
    GenerateJson,
    /// Description -> fenced CSV.
    GenerateCsv,
    /// Description + current cells -> JSON document.
    Manipulate,
    /// Short prompt -> detailed prompt.
    Improvise,
}

/// Template substitutions for one chain invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainInput {
    pub kind: ChainKind,
    pub description: String,
    pub schema: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_cells: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_prompt: Option<String>,
}

impl ChainInput {
    fn new(kind: ChainKind, description: &str, schema: &str) -> Self {
        Self {
            kind,
            description: description.to_string(),
            schema: schema.to_string(),
            json_cells: None,
            base_prompt: None,
        }
    }

    pub fn generate_json(description: &str) -> Self {
        Self::new(ChainKind::GenerateJson, description, SIMPLIFIED_JSON_SCHEMA)
    }

    pub fn generate_csv(description: &str) -> Self {
        Self::new(ChainKind::GenerateCsv, description, CSV_SCHEMA)
    }

    /// Manipulation input carrying `diagram` flattened to the schema.
    pub fn manipulate(description: &str, diagram: &Diagram) -> Result<Self> {
        let cells = serde_json::to_string(&flatten(diagram))?;
        Ok(Self { json_cells: Some(cells), ..Self::new(ChainKind::Manipulate, description, SIMPLIFIED_JSON_SCHEMA) })
    }

    pub fn improvise(base_prompt: &str) -> Self {
        Self { base_prompt: Some(base_prompt.to_string()), ..Self::new(ChainKind::Improvise, "", "") }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub fn diagram_from_json_response(text: &str, cfg: &MapperConfig) -> Diagram {
    build_diagram(&extract_json_document(text), cfg)
}

pub fn diagram_from_csv_response(text: &str, cfg: &MapperConfig) -> Diagram {
    build_diagram(&extract_csv_document(text), cfg)
}

/// Diagram for a chain answer. Improvise answers are prompts, not
/// diagrams, and yield `None`.
pub fn diagram_from_response(kind: ChainKind, text: &str, cfg: &MapperConfig) -> Option<Diagram> {
    match kind {
        ChainKind::GenerateJson | ChainKind::Manipulate => Some(diagram_from_json_response(text, cfg)),
        ChainKind::GenerateCsv => Some(diagram_from_csv_response(text, cfg)),
        ChainKind::Improvise => None,
    }
}

/// Document for a chain answer, failing on JSON answers that carry no
/// parseable object. Improvise answers yield `None`.
pub fn document_from_response(kind: ChainKind, text: &str) -> Result<Option<SimplifiedDocument>> {
    match kind {
        ChainKind::GenerateJson | ChainKind::Manipulate => parse_json_document(text).map(Some),
        ChainKind::GenerateCsv => Ok(Some(extract_csv_document(text))),
        ChainKind::Improvise => Ok(None),
    }
}

/// Trimmed improvised prompt.
pub fn improvised_prompt(text: &str) -> &str {
    text.trim()
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestTicket(pub u64);

/// Last-request-wins guard for overlapping chain calls.
///
/// Every `begin` supersedes the tickets issued before it. A response is
/// applied only if its ticket is the latest one and nothing was accepted
/// for it yet.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
    outstanding: bool,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> RequestTicket {
        self.latest += 1;
        self.outstanding = true;
        RequestTicket(self.latest)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.outstanding && ticket.0 == self.latest
    }

    /// Claim the response for `ticket`. False for stale or repeated claims.
    pub fn accept(&mut self, ticket: RequestTicket) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, latest = self.latest, "discarding stale response");
            return false;
        }
        self.outstanding = false;
        true
    }

    /// Drop interest in the outstanding request.
    pub fn cancel(&mut self) {
        self.outstanding = false;
    }

    pub fn pending(&self) -> bool {
        self.outstanding
    }
}
