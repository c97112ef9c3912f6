use kgraph_extract::ExtractError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid graph document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    XmlError(String),

    #[error("Export failed: {0}")]
    ExportError(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}
