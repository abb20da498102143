// Host-page messages.
//
// The editor runs in an iframe and talks to its parent with
// `postMessage`. Wire shape:
//
//   {"type": "graph",    "payload": {"cells": [...]}}   (or a JSON string)
//   {"type": "settings", "payload": {"update_per_change": true}}
//   {"type": "ready"}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EditorSettings;
use crate::diagram::Diagram;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum HostMessage {
    Graph(GraphPayload),
    Settings(EditorSettings),
    Ready,
}

/// Hosts send the graph either as an object or pre-encoded as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GraphPayload {
    Encoded(String),
    Object(Value),
}

impl GraphPayload {
    pub fn into_diagram(self) -> Result<Diagram> {
        match self {
            GraphPayload::Encoded(json) => Diagram::from_json(&json),
            GraphPayload::Object(value) => Diagram::from_value(value),
        }
    }
}

impl HostMessage {
    pub fn parse(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(Error::InvalidHostMessage)
    }

    /// Outbound graph message carrying `diagram` as an object.
    pub fn graph(diagram: &Diagram) -> Result<Self> {
        Ok(HostMessage::Graph(GraphPayload::Object(diagram.to_value()?)))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
