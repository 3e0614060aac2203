//! Error types for loading documents. The encoder itself cannot fail.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while turning an input document into a [`Value`](crate::Value).
#[derive(Error, Debug)]
pub enum SexpError {
    /// The requested input path does not exist.
    #[error("input file '{}' not found", .0.display())]
    InputNotFound(PathBuf),

    /// The input path exists but could not be read.
    #[error("failed to read '{}': {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input was not valid YAML.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] yaml_rust2::ScanError),

    /// The input was not valid JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Well-formed YAML that has no `Value` representation
    /// (unknown alias, non-scalar key, bad merge value).
    /// Includes the 1-based line number where the node started.
    #[error("YAML structure error at line {line}: {message}")]
    Structure { line: usize, message: String },

    /// The document decoded to null, or the stream held no document at all.
    #[error("document is empty or entirely null")]
    EmptyDocument,

    /// The stream held more than one document.
    #[error("expected a single document, found {0}")]
    MultipleDocuments(usize),
}

/// Convenience alias used throughout yaml-sexp.
pub type Result<T> = std::result::Result<T, SexpError>;
