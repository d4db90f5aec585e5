//! Embedded meta-schema and structural pre-check of schema documents

use jsonschema::{validator_for, Validator as JsonValidator};
use rust_embed::Embed;
use serde_json::Value as JsonValue;

use crate::schema::decode::{decode, SchemaError, StructureViolation};
use crate::schema::node::SchemaNode;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

const META_SCHEMA: &str = "form-schema.schema.json";

/// Holds the compiled meta-schema describing the schema subset the engine
/// understands, and loads schema documents through it
pub struct SchemaRegistry {
    meta: Option<JsonValidator>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        let meta = Self::meta_schema_source()
            .and_then(|src| serde_json::from_str::<JsonValue>(&src).ok())
            .and_then(|schema| match validator_for(&schema) {
                Ok(compiled) => Some(compiled),
                Err(e) => {
                    tracing::error!(error = %e, "embedded meta-schema does not compile");
                    None
                }
            });
        Self { meta }
    }

    /// Raw text of the embedded meta-schema
    pub fn meta_schema_source() -> Option<String> {
        EmbeddedSchemas::get(META_SCHEMA)
            .map(|file| String::from_utf8_lossy(file.data.as_ref()).into_owned())
    }

    pub fn has_meta_schema(&self) -> bool {
        self.meta.is_some()
    }

    /// Every meta-schema violation in `document`
    pub fn check(&self, document: &JsonValue) -> Vec<StructureViolation> {
        let Some(meta) = &self.meta else {
            return Vec::new();
        };
        meta.iter_errors(document)
            .map(|error| StructureViolation {
                pointer: format!("#{}", error.instance_path.as_str()),
                message: error.to_string(),
            })
            .collect()
    }

    /// Decode a schema document, running the structural pre-check first when `strict`
    pub fn load(&self, document: &JsonValue, strict: bool) -> Result<SchemaNode, SchemaError> {
        if strict {
            let violations = self.check(document);
            if !violations.is_empty() {
                tracing::debug!(count = violations.len(), "schema document failed meta-schema");
                return Err(SchemaError::structure(violations));
            }
        }
        decode(document)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
