//! Schema and prefill acquisition
//!
//! The engine never performs I/O on its own; it asks a [`SchemaProvider`]
//! for the schema tree and a [`PrefillProvider`] for the initial document.
//! Failures are classified as network or local so a loader can report them
//! uniformly.

use miette::Diagnostic;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::document::{self, DocumentError};
use crate::schema::decode::SchemaError;
use crate::schema::node::SchemaNode;
use crate::schema::registry::SchemaRegistry;

/// Transport-level failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    NoConnectivity,
    Timeout,
    /// The server answered with a non-success status
    ServerRejected { status: u16 },
    Unknown,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::NoConnectivity => write!(f, "no connectivity"),
            NetworkError::Timeout => write!(f, "request timed out"),
            NetworkError::ServerRejected { status } => write!(f, "server rejected request ({})", status),
            NetworkError::Unknown => write!(f, "unknown network error"),
        }
    }
}

/// Failures decoding a payload that was obtained
#[derive(Debug, Error, Diagnostic)]
pub enum LocalError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    #[error("decoding error: {reason}")]
    #[diagnostic(code(schemaform::provider::decoding))]
    Decoding { reason: String },
}

/// Errors a provider can return
#[derive(Debug, Error, Diagnostic)]
pub enum DataError {
    #[error("network error: {0}")]
    #[diagnostic(code(schemaform::provider::network))]
    Network(NetworkError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Local(#[from] LocalError),
}

impl DataError {
    pub fn decoding(reason: impl Into<String>) -> Self {
        DataError::Local(LocalError::Decoding {
            reason: reason.into(),
        })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, DataError::Network(_))
    }
}

impl From<NetworkError> for DataError {
    fn from(err: NetworkError) -> Self {
        DataError::Network(err)
    }
}

impl From<DocumentError> for DataError {
    fn from(err: DocumentError) -> Self {
        DataError::Local(LocalError::Document(err))
    }
}

impl From<SchemaError> for DataError {
    fn from(err: SchemaError) -> Self {
        DataError::Local(LocalError::Schema(err))
    }
}

/// Source of the schema tree
pub trait SchemaProvider {
    fn fetch_schema(&self) -> Result<SchemaNode, DataError>;
}

/// Source of prefill documents, addressed by a locator string
pub trait PrefillProvider {
    fn fetch_prefill(&self, locator: &str) -> Result<JsonValue, DataError>;
}

impl<F> SchemaProvider for F
where
    F: Fn() -> Result<SchemaNode, DataError>,
{
    fn fetch_schema(&self) -> Result<SchemaNode, DataError> {
        self()
    }
}

impl<F> PrefillProvider for F
where
    F: Fn(&str) -> Result<JsonValue, DataError>,
{
    fn fetch_prefill(&self, locator: &str) -> Result<JsonValue, DataError> {
        self(locator)
    }
}

/// Reads a schema document (JSON or YAML) from disk
pub struct FileSchemaProvider {
    path: PathBuf,
    strict: bool,
    registry: SchemaRegistry,
}

impl FileSchemaProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            strict: true,
            registry: SchemaRegistry::default(),
        }
    }

    /// Toggle the meta-schema pre-check (on by default)
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SchemaProvider for FileSchemaProvider {
    fn fetch_schema(&self) -> Result<SchemaNode, DataError> {
        let document = document::read(&self.path)?;
        Ok(self.registry.load(&document, self.strict)?)
    }
}

/// Holds an already-parsed schema document
pub struct StaticSchemaProvider {
    document: JsonValue,
}

impl StaticSchemaProvider {
    pub fn new(document: JsonValue) -> Self {
        Self { document }
    }
}

impl SchemaProvider for StaticSchemaProvider {
    fn fetch_schema(&self) -> Result<SchemaNode, DataError> {
        Ok(SchemaRegistry::default().load(&self.document, true)?)
    }
}

/// Resolves locators as file paths, relative to an optional base directory
#[derive(Debug, Default)]
pub struct FilePrefillProvider {
    base_dir: Option<PathBuf>,
}

impl FilePrefillProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    fn resolve(&self, locator: &str) -> PathBuf {
        let path = PathBuf::from(locator);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

impl PrefillProvider for FilePrefillProvider {
    fn fetch_prefill(&self, locator: &str) -> Result<JsonValue, DataError> {
        let path = self.resolve(locator);
        let document = document::read(&path)?;
        if !document.is_object() {
            return Err(DataError::decoding(format!(
                "prefill document {} is not a JSON object",
                path.display()
            )));
        }
        Ok(document)
    }
}

/// Prefill provider that supplies nothing; every field gets its default
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyPrefill;

impl PrefillProvider for EmptyPrefill {
    fn fetch_prefill(&self, _locator: &str) -> Result<JsonValue, DataError> {
        Ok(JsonValue::Object(Map::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_network_error_display() {
        let err = DataError::from(NetworkError::ServerRejected { status: 503 });
        assert_eq!(err.to_string(), "network error: server rejected request (503)");
        assert!(err.is_network());
    }

    #[test]
    fn test_file_schema_provider() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("form.schema.json");
        fs::write(
            &path,
            r#"{"type": "object", "properties": {"name": {"type": "string"}}}"#,
        )
        .unwrap();

        let schema = FileSchemaProvider::new(&path).fetch_schema().unwrap();
        assert!(schema.as_object().unwrap().properties.contains("name"));
    }

    #[test]
    fn test_file_schema_provider_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("form.schema.yaml");
        fs::write(
            &path,
            "type: object\nrequired: [age]\nproperties:\n  age:\n    type: integer\n    minimum: 0\n",
        )
        .unwrap();

        let schema = FileSchemaProvider::new(&path).fetch_schema().unwrap();
        assert!(schema.as_object().unwrap().is_required("age"));
    }

    #[test]
    fn test_missing_schema_file_is_local_error() {
        let err = FileSchemaProvider::new("/nonexistent/form.json")
            .fetch_schema()
            .unwrap_err();
        assert!(matches!(err, DataError::Local(LocalError::Document(_))));
    }

    #[test]
    fn test_bad_schema_is_local_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"type": "tuple"}"#).unwrap();

        let err = FileSchemaProvider::new(&path)
            .with_strict(false)
            .fetch_schema()
            .unwrap_err();
        assert!(matches!(err, DataError::Local(LocalError::Schema(SchemaError::UnknownType { .. }))));
    }

    #[test]
    fn test_file_prefill_relative_to_base() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("data.json"), r#"{"name": "Dana"}"#).unwrap();

        let provider = FilePrefillProvider::new().with_base_dir(dir.path());
        let document = provider.fetch_prefill("data.json").unwrap();
        assert_eq!(document["name"], "Dana");
    }

    #[test]
    fn test_file_prefill_must_be_object() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("list.json"), "[1, 2]").unwrap();

        let provider = FilePrefillProvider::new().with_base_dir(dir.path());
        let err = provider.fetch_prefill("list.json").unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }

    #[test]
    fn test_closures_are_providers() {
        let schema = || -> Result<SchemaNode, DataError> { Ok(SchemaNode::string()) };
        let prefill = |_: &str| -> Result<JsonValue, DataError> { Err(NetworkError::Timeout.into()) };

        assert!(schema.fetch_schema().is_ok());
        assert!(prefill.fetch_prefill("x").unwrap_err().is_network());
        assert!(EmptyPrefill.fetch_prefill("x").unwrap().as_object().unwrap().is_empty());
    }
}
