//! WASM bindings for the diagram-ai-core library.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here.
//! Inputs and outputs are JSON strings; results are wrapped in the
//! `Output` envelope so nothing throws across the boundary.

use wasm_bindgen::prelude::*;

use crate::chain::{self, ChainInput, ChainKind, RequestTicket};
use crate::config::MapperConfig;
use crate::diagram::{Diagram, ElementId, ShapeKind};
use crate::editor::{DiagramEditor, PrimitiveTemplate};
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::host::HostMessage;
use crate::output::Output;
use crate::schema::{self, SimplifiedDocument};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    pub fn console_log(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);
}

fn mapper(auto_select_icons: bool) -> MapperConfig {
    MapperConfig { auto_select_icons, ..MapperConfig::default() }
}

fn respond<T: serde::Serialize>(what: &str, result: Result<T>) -> String {
    if let Err(e) = &result {
        console_error(&format!("Error in {}: {}", what, e));
    }
    Output::from(result).to_json()
}

fn parse_kind(kind: &str) -> Result<ChainKind> {
    serde_json::from_value(serde_json::Value::String(kind.to_string())).map_err(Error::Serialize)
}

fn parse_shape(kind: &str) -> Result<ShapeKind> {
    serde_json::from_value(serde_json::Value::String(kind.to_string())).map_err(Error::Serialize)
}

// ============================================================================
// Stateless mapping
// ============================================================================

/// Simplified document JSON -> diagram JSON (materialize + groups).
#[wasm_bindgen]
pub fn materialize_document(document: &str, auto_select_icons: bool) -> String {
    let result = serde_json::from_str::<SimplifiedDocument>(document)
        .map_err(Error::MalformedJson)
        .map(|doc| schema::build_diagram(&doc, &mapper(auto_select_icons)));
    respond("materialize_document", result)
}

/// Diagram JSON -> simplified document JSON.
#[wasm_bindgen]
pub fn flatten_diagram(diagram: &str) -> String {
    respond("flatten_diagram", Diagram::from_json(diagram).map(|d| schema::flatten(&d)))
}

/// Model answer -> diagram JSON. `kind` is a chain kind such as
/// `generate_csv`.
#[wasm_bindgen]
pub fn diagram_from_response(kind: &str, text: &str, auto_select_icons: bool) -> String {
    let result = parse_kind(kind).map(|k| chain::diagram_from_response(k, text, &mapper(auto_select_icons)));
    respond("diagram_from_response", result)
}

/// Chain input JSON for a stateless call. `diagram` is only read for the
/// manipulate chain.
#[wasm_bindgen]
pub fn chain_input(kind: &str, text: &str, diagram: &str) -> String {
    let result = parse_kind(kind).and_then(|k| match k {
        ChainKind::GenerateJson => Ok(ChainInput::generate_json(text)),
        ChainKind::GenerateCsv => Ok(ChainInput::generate_csv(text)),
        ChainKind::Manipulate => ChainInput::manipulate(text, &Diagram::from_json(diagram)?),
        ChainKind::Improvise => Ok(ChainInput::improvise(text)),
    });
    respond("chain_input", result)
}

/// Best bundled icon for `title`, or `null` data.
#[wasm_bindgen]
pub fn select_icon(title: &str) -> String {
    Output::ok(schema::select_icon(title)).to_json()
}

/// One primitive cell (`rectangle`, `circle` or `ellipse`) as diagram JSON.
#[wasm_bindgen]
pub fn primitive_cell(kind: &str) -> String {
    let result = parse_shape(kind).map(|s| PrimitiveTemplate::for_shape(s).build());
    respond("primitive_cell", result)
}

// ============================================================================
// Editor session
// ============================================================================

#[wasm_bindgen]
pub struct Editor {
    inner: DiagramEditor,
}

impl Editor {
    /// Post queued messages to the parent window.
    fn flush(&mut self) {
        for message in self.inner.drain_outbox() {
            match message.to_json() {
                Ok(json) => post_to_parent(&json),
                Err(e) => console_error(&format!("Error encoding host message: {}", e)),
            }
        }
    }

    fn finish<T: serde::Serialize>(&mut self, what: &str, result: Result<T>) -> String {
        self.flush();
        respond(what, result)
    }
}

#[wasm_bindgen]
impl Editor {
    #[wasm_bindgen(constructor)]
    pub fn new(auto_select_icons: bool) -> Self {
        let mut inner = DiagramEditor::new(mapper(auto_select_icons));
        inner.announce_ready();
        let mut editor = Self { inner };
        editor.flush();
        editor
    }

    /// Handle a `{type, payload}` message from the host page.
    pub fn handle_message(&mut self, message: &str) -> String {
        let result = HostMessage::parse(message).and_then(|m| self.inner.handle_host_message(m));
        self.finish("handle_message", result)
    }

    pub fn set_auto_select_icons(&mut self, enabled: bool) {
        self.inner.mapper_mut().auto_select_icons = enabled;
    }

    pub fn diagram(&self) -> String {
        respond("diagram", Ok(self.inner.diagram()))
    }

    pub fn simplified(&self) -> String {
        respond("simplified", Ok(self.inner.simplified()))
    }

    pub fn hierarchy(&self) -> String {
        respond("hierarchy", Ok(self.inner.hierarchy().data()))
    }

    /// Start a chain call; returns `{ticket, input}`.
    pub fn request(&mut self, kind: &str, text: &str) -> String {
        let result = parse_kind(kind)
            .and_then(|k| self.inner.request(k, text))
            .map(|(ticket, input)| serde_json::json!({ "ticket": ticket, "input": input }));
        respond("request", result)
    }

    pub fn cancel_request(&mut self) {
        self.inner.cancel_request();
    }

    /// Apply a chain answer; `data` is false when the answer was stale.
    pub fn apply_response(&mut self, ticket: u32, kind: &str, text: &str) -> String {
        let ticket = RequestTicket(u64::from(ticket));
        let result = parse_kind(kind).and_then(|k| self.inner.apply_generated(ticket, k, text));
        self.finish("apply_response", result)
    }

    pub fn add_element_json(&mut self, cell: &str) -> String {
        let result = self.inner.add_element_from_json(cell);
        self.finish("add_element_json", result)
    }

    pub fn add_primitive(&mut self, kind: &str) -> String {
        let result = parse_shape(kind).and_then(|s| self.inner.add_primitive(s));
        self.finish("add_primitive", result)
    }

    pub fn move_element(&mut self, id: &str, x: f64, y: f64) -> String {
        let moved = self.inner.move_element(&element_id(id), Point::new(x, y));
        self.finish("move_element", Ok(moved))
    }

    pub fn rename_element(&mut self, id: &str, name: &str) -> bool {
        let renamed = self.inner.rename_element(&element_id(id), name);
        self.flush();
        renamed
    }

    pub fn remove_link(&mut self, id: &str) -> bool {
        let removed = self.inner.remove_link(&element_id(id));
        self.flush();
        removed
    }

    /// Hover an element; an empty id is ignored.
    pub fn hover(&mut self, id: &str) -> bool {
        let id = (!id.is_empty()).then(|| element_id(id));
        self.inner.hover(id.as_ref())
    }

    pub fn select(&mut self, id: &str) -> bool {
        self.inner.select(&element_id(id))
    }

    pub fn begin_link(&mut self, source: &str) -> bool {
        self.inner.begin_link(&element_id(source))
    }

    /// Finish the pending link; an empty target abandons it.
    pub fn finish_link(&mut self, target: &str) -> String {
        let target = (!target.is_empty()).then(|| element_id(target));
        let link = self.inner.finish_link(target.as_ref());
        self.finish("finish_link", Ok(link))
    }
}

fn element_id(id: &str) -> ElementId {
    ElementId(id.to_string())
}

#[cfg(target_arch = "wasm32")]
fn post_to_parent(json: &str) {
    let Some(window) = web_sys::window() else {
        console_error("No window to post to");
        return;
    };
    let message = match js_sys::JSON::parse(json) {
        Ok(m) => m,
        Err(e) => {
            console_error(&format!("Error parsing host message: {:?}", e));
            return;
        }
    };
    match window.parent() {
        Ok(Some(parent)) => {
            if let Err(e) = parent.post_message(&message, "*") {
                console_error(&format!("Error posting to parent: {:?}", e));
            }
        }
        _ => console_log("No parent window, dropping host message"),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn post_to_parent(json: &str) {
    tracing::debug!(message = json, "no parent window outside wasm");
}
