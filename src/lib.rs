//! Core of the AI diagram editor.
//!
//! Maps the canvas diagram to and from the compact schema a language model
//! reads and writes, synthesizes group containers, and keeps the element
//! hierarchy (hover, selection, group drags) consistent with the diagram.

pub mod chain;
pub mod config;
pub mod diagram;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod hierarchy;
pub mod host;
pub mod output;
pub mod schema;
mod wasm;

pub use config::{EditorSettings, MapperConfig};
pub use diagram::{Diagram, DiagramCell, ElementId};
pub use editor::DiagramEditor;
pub use error::{Error, Result};
pub use schema::{SimplifiedCell, SimplifiedDocument};
