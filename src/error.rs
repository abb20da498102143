pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid diagram payload: {0}")]
    InvalidDiagram(#[source] serde_json::Error),

    #[error("Unsupported cell type: {cell_type}")]
    UnsupportedCell { cell_type: String },

    #[error("Invalid host message: {0}")]
    InvalidHostMessage(#[source] serde_json::Error),

    #[error("Duplicate element id: {id}")]
    DuplicateElementId { id: String },

    #[error("No JSON object found in model output")]
    MissingJson,

    #[error("Malformed JSON in model output: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// Stable machine-readable name, used in the JSON error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidDiagram(_) => "invalid_diagram",
            Error::UnsupportedCell { .. } => "unsupported_cell",
            Error::InvalidHostMessage(_) => "invalid_host_message",
            Error::DuplicateElementId { .. } => "duplicate_element_id",
            Error::MissingJson => "missing_json",
            Error::MalformedJson(_) => "malformed_json",
            Error::Serialize(_) => "serialize",
        }
    }
}
