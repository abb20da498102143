// Editor session.
//
// Owns the diagram, the hierarchy store and the host settings, and queues
// the messages the host page should receive. Every mutation goes through
// here so the hierarchy and the outbound graph stay in step with the
// diagram:
//
//   host message / UI action -> DiagramEditor -> diagram + hierarchy
//                                             -> outbox (graph, ready)
//
// Inserting a whole diagram is transactional: the payload is parsed and
// the hierarchy staged before anything is replaced.

use crate::chain::{document_from_response, ChainInput, ChainKind, RequestTicket, RequestTracker};
use crate::config::{EditorSettings, MapperConfig};
use crate::diagram::{Diagram, DiagramCell, ElementCore, ElementId, ShapeElement, ShapeKind};
use crate::error::{Error, Result};
use crate::geometry::{Point, Size};
use crate::hierarchy::{HierarchyStore, ToolsViewKind};
use crate::host::{GraphPayload, HostMessage};
use crate::schema::{build_diagram, flatten, SimplifiedDocument};

// ============================================================================
// Primitive palette
// ============================================================================

pub const PRIMITIVE_FILL: &str = "#30D0C659";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitiveTemplate {
    pub shape: ShapeKind,
    pub label: &'static str,
    pub position: Point,
    pub size: Size,
}

pub const PRIMITIVES: [PrimitiveTemplate; 3] = [
    PrimitiveTemplate {
        shape: ShapeKind::Rectangle,
        label: "Rectangle",
        position: Point { x: 50.0, y: 10.0 },
        size: Size { width: 100.0, height: 100.0 },
    },
    PrimitiveTemplate {
        shape: ShapeKind::Circle,
        label: "Circle",
        position: Point { x: 200.0, y: 10.0 },
        size: Size { width: 100.0, height: 100.0 },
    },
    PrimitiveTemplate {
        shape: ShapeKind::Ellipse,
        label: "Ellipse",
        position: Point { x: 350.0, y: 10.0 },
        size: Size { width: 150.0, height: 100.0 },
    },
];

impl PrimitiveTemplate {
    pub fn for_shape(shape: ShapeKind) -> &'static PrimitiveTemplate {
        match shape {
            ShapeKind::Rectangle => &PRIMITIVES[0],
            ShapeKind::Circle => &PRIMITIVES[1],
            ShapeKind::Ellipse => &PRIMITIVES[2],
        }
    }

    /// Fresh cell with its own id.
    pub fn build(&self) -> DiagramCell {
        DiagramCell::Rectangle(ShapeElement {
            core: ElementCore::new(self.label, self.position, self.size),
            shape: self.shape,
            fill: PRIMITIVE_FILL.to_string(),
            fill_opacity: None,
            label_color: None,
            wrap_label: true,
        })
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Default)]
pub struct DiagramEditor {
    diagram: Diagram,
    hierarchy: HierarchyStore,
    settings: EditorSettings,
    mapper: MapperConfig,
    requests: RequestTracker,
    link_source: Option<ElementId>,
    outbox: Vec<HostMessage>,
}

impl DiagramEditor {
    pub fn new(mapper: MapperConfig) -> Self {
        Self { mapper, ..Self::default() }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn hierarchy(&self) -> &HierarchyStore {
        &self.hierarchy
    }

    /// For subscribing to hierarchy events.
    pub fn hierarchy_mut(&mut self) -> &mut HierarchyStore {
        &mut self.hierarchy
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn mapper(&self) -> &MapperConfig {
        &self.mapper
    }

    pub fn mapper_mut(&mut self) -> &mut MapperConfig {
        &mut self.mapper
    }

    /// Messages queued for the host since the last drain.
    pub fn drain_outbox(&mut self) -> Vec<HostMessage> {
        std::mem::take(&mut self.outbox)
    }

    pub fn announce_ready(&mut self) {
        self.outbox.push(HostMessage::Ready);
    }

    fn queue_graph(&mut self) {
        match HostMessage::graph(&self.diagram) {
            Ok(msg) => self.outbox.push(msg),
            Err(e) => tracing::error!(error = %e, "failed to encode graph for host"),
        }
    }

    fn changed(&mut self) {
        if self.settings.update_per_change {
            self.queue_graph();
        }
    }

    pub fn handle_host_message(&mut self, message: HostMessage) -> Result<()> {
        match message {
            HostMessage::Graph(payload) => self.insert_diagram_data(payload),
            HostMessage::Settings(settings) => {
                tracing::debug!(update_per_change = settings.update_per_change, "host settings");
                self.settings = settings;
                Ok(())
            }
            HostMessage::Ready => {
                tracing::debug!("ignoring inbound ready message");
                Ok(())
            }
        }
    }

    /// Replace the diagram with a host payload and echo it back.
    ///
    /// On failure the current diagram and hierarchy are kept.
    pub fn insert_diagram_data(&mut self, payload: GraphPayload) -> Result<()> {
        let diagram = payload.into_diagram().inspect_err(|e| {
            tracing::warn!(error = %e, "rejecting diagram payload");
        })?;
        self.insert_diagram(diagram)
    }

    fn insert_diagram(&mut self, mut diagram: Diagram) -> Result<()> {
        for cell in &mut diagram.cells {
            enable_label_wrap(cell);
        }
        self.hierarchy.reload(&diagram)?;
        self.diagram = diagram;
        self.link_source = None;
        self.queue_graph();
        Ok(())
    }

    // ---------- chains ----------

    /// Start a chain call. Any earlier call still in flight is superseded.
    pub fn request(&mut self, kind: ChainKind, text: &str) -> Result<(RequestTicket, ChainInput)> {
        let input = match kind {
            ChainKind::GenerateJson => ChainInput::generate_json(text),
            ChainKind::GenerateCsv => ChainInput::generate_csv(text),
            ChainKind::Manipulate => ChainInput::manipulate(text, &self.diagram)?,
            ChainKind::Improvise => ChainInput::improvise(text),
        };
        Ok((self.requests.begin(), input))
    }

    pub fn cancel_request(&mut self) {
        self.requests.cancel();
    }

    /// Apply a chain answer. Stale answers, improvise answers and answers
    /// without usable cells leave the diagram alone and return false.
    pub fn apply_generated(&mut self, ticket: RequestTicket, kind: ChainKind, text: &str) -> Result<bool> {
        if !self.requests.accept(ticket) {
            return Ok(false);
        }
        let doc = match document_from_response(kind, text) {
            Ok(Some(doc)) => doc,
            Ok(None) => return Ok(false),
            Err(e) => {
                tracing::warn!(error = %e, "keeping diagram: unusable model answer");
                return Ok(false);
            }
        };
        if doc.is_empty() {
            tracing::warn!(?kind, "keeping diagram: model answer has no cells");
            return Ok(false);
        }
        self.insert_diagram(build_diagram(&doc, &self.mapper)).map(|()| true)
    }

    /// Current diagram in the AI-facing schema.
    pub fn simplified(&self) -> SimplifiedDocument {
        flatten(&self.diagram)
    }

    // ---------- cells ----------

    pub fn add_element(&mut self, mut cell: DiagramCell) -> Result<ElementId> {
        if self.diagram.cell(cell.id()).is_some() {
            return Err(Error::DuplicateElementId { id: cell.id().to_string() });
        }
        enable_label_wrap(&mut cell);
        let is_element = cell.element().is_some();
        let id = self.diagram.push(cell);
        if is_element {
            self.hierarchy.register(&self.diagram, &id);
        }
        self.changed();
        Ok(id)
    }

    /// Add one cell given in the canvas interchange format. A missing id
    /// is generated.
    pub fn add_element_from_json(&mut self, json: &str) -> Result<ElementId> {
        let cell: DiagramCell = serde_json::from_str(json).map_err(Error::InvalidDiagram)?;
        self.add_element(cell)
    }

    pub fn add_primitive(&mut self, shape: ShapeKind) -> Result<ElementId> {
        self.add_element(PrimitiveTemplate::for_shape(shape).build())
    }

    pub fn add_link(&mut self, source: &ElementId, target: &ElementId) -> Option<ElementId> {
        let id = self.diagram.connect(source, target)?;
        self.changed();
        Some(id)
    }

    pub fn remove_link(&mut self, id: &ElementId) -> bool {
        let before = self.diagram.cells.len();
        self.diagram.cells.retain(|c| !(c.as_link().is_some() && c.id() == id));
        let removed = self.diagram.cells.len() != before;
        if removed {
            self.changed();
        }
        removed
    }

    /// Move an element; group members follow their group.
    pub fn move_element(&mut self, id: &ElementId, position: Point) -> Vec<ElementId> {
        let moved = self.hierarchy.element_moved(&mut self.diagram, id, position);
        if !moved.is_empty() {
            self.changed();
        }
        moved
    }

    pub fn rename_element(&mut self, id: &ElementId, name: &str) -> bool {
        let renamed = self.hierarchy.change_label(&mut self.diagram, id, name);
        if renamed {
            self.changed();
        }
        renamed
    }

    // ---------- affordances ----------

    pub fn hover(&mut self, id: Option<&ElementId>) -> bool {
        self.hierarchy.active_item(id)
    }

    pub fn select(&mut self, id: &ElementId) -> bool {
        self.hierarchy.select(id)
    }

    /// Start drawing a link from `source`, marking the valid ends.
    pub fn begin_link(&mut self, source: &ElementId) -> bool {
        let connectable = matches!(self.diagram.cell(source), Some(c) if c.element().is_some() && !c.is_group());
        if !connectable {
            return false;
        }
        self.hierarchy.show_link_targets(source);
        self.link_source = Some(source.clone());
        true
    }

    /// Finish the pending link at `target`, or abandon it with `None`.
    pub fn finish_link(&mut self, target: Option<&ElementId>) -> Option<ElementId> {
        let valid = target
            .and_then(|t| self.hierarchy.find(t))
            .is_some_and(|n| n.item().is_visible(ToolsViewKind::ValidForLink));
        self.hierarchy.hide_link_targets();
        let source = self.link_source.take()?;
        match target {
            Some(target) if valid => self.add_link(&source, target),
            _ => None,
        }
    }
}

fn enable_label_wrap(cell: &mut DiagramCell) {
    if let DiagramCell::Rectangle(shape) = cell {
        shape.wrap_label = true;
    }
}
