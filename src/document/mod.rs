//! Reading schema and prefill documents from disk
//!
//! Both JSON and YAML are accepted; either way the result is a JSON tree
//! with object key order preserved.

pub mod diagnostics;

pub use diagnostics::{DocumentError, DocumentSyntaxError};

use serde_json::Value as JsonValue;
use std::path::Path;

/// On-disk document syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the syntax from a file extension; anything unknown is read as JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }
}

/// Parse document text into a JSON tree
pub fn parse(source: &str, filename: &str, format: DocumentFormat) -> Result<JsonValue, DocumentSyntaxError> {
    match format {
        DocumentFormat::Json => serde_json::from_str(source)
            .map_err(|e| DocumentSyntaxError::from_json_error(&e, source, filename)),
        DocumentFormat::Yaml => serde_yml::from_str(source)
            .map_err(|e| DocumentSyntaxError::from_yaml_error(&e, source, filename)),
    }
}

/// Read and parse the document at `path`
pub fn read(path: &Path) -> Result<JsonValue, DocumentError> {
    let source = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    tracing::debug!(path = %path.display(), bytes = source.len(), "read document");
    Ok(parse(&source, &filename, DocumentFormat::from_path(path))?)
}
