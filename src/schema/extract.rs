// JSON channel: pull the document out of free model text.
//
// The model is asked for a bare object but routinely wraps it in prose or
// a code fence, so the slice from the first `{` to the last `}` is taken
// and parsed. The lenient entry point never fails: bad output degrades to
// an empty document.

use crate::error::{Error, Result};

use super::SimplifiedDocument;

/// Slice from the first `{` to the last `}` inclusive.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

pub fn parse_json_document(text: &str) -> Result<SimplifiedDocument> {
    let json = extract_json_object(text).ok_or(Error::MissingJson)?;
    serde_json::from_str(json).map_err(Error::MalformedJson)
}

/// Lenient variant for model output: logs and returns an empty document.
pub fn extract_json_document(text: &str) -> SimplifiedDocument {
    match parse_json_document(text) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(error = %e, "discarding model JSON output");
            SimplifiedDocument::default()
        }
    }
}
