//! Output envelope for the JavaScript side.
//!
//! Every wasm export answers with one JSON object: `{"data": ...}` on
//! success, `{"error": {...}}` on failure. The boundary never throws.

use serde::Serialize;

use crate::error::{Error, Result};

/// Error information for the frontend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    /// Machine-readable, see `Error::kind`
    pub kind: String,
    pub message: String,
}

impl From<&Error> for ErrorInfo {
    fn from(e: &Error) -> Self {
        Self { kind: e.kind().to_string(), message: e.to_string() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Output<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl<T: Serialize> Output<T> {
    pub fn ok(data: T) -> Self {
        Self { data: Some(data), error: None }
    }

    pub fn err(e: &Error) -> Self {
        Self { data: None, error: Some(ErrorInfo::from(e)) }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to encode output");
            r#"{"error":{"kind":"serialize","message":"failed to encode output"}}"#.to_string()
        })
    }
}

impl<T: Serialize> From<Result<T>> for Output<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Output::ok(data),
            Err(e) => Output::err(&e),
        }
    }
}
