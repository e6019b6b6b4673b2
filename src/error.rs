use thiserror::Error;

/// Failures surfaced by the extraction engine.
///
/// Missing optional structure and unresolved `actionRef` names are never
/// errors; they end up as defaults or empty collections in the model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    /// The source text is not a well-formed element tree.
    #[error("malformed form XML: {0}")]
    MalformedInput(String),
}

impl From<roxmltree::Error> for FormError {
    fn from(err: roxmltree::Error) -> Self {
        FormError::MalformedInput(err.to_string())
    }
}
