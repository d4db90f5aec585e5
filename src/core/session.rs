//! Form session: load orchestration, the edit path and the submit gate
//!
//! A session owns the current schema and [`FormState`]. Loading asks the
//! providers for a schema and a prefill document, then clears and
//! repopulates the state. Every edit is followed by a full validation pass.

use miette::Diagnostic;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use thiserror::Error;

use crate::core::form::FormState;
use crate::core::provider::{DataError, PrefillProvider, SchemaProvider};
use crate::core::value::DynamicValue;
use crate::schema::flatten::flatten;
use crate::schema::node::SchemaNode;
use crate::schema::path::resolve;

/// Where a load currently stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Human-readable failure message
    Failed(String),
}

/// Which acquisition step failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Schema,
    Prefill,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStage::Schema => write!(f, "schema"),
            LoadStage::Prefill => write!(f, "initial data"),
        }
    }
}

/// A failed load attempt
#[derive(Debug, Error, Diagnostic)]
#[error("Failed to load {stage}")]
#[diagnostic(code(schemaform::session::load))]
pub struct LoadError {
    pub stage: LoadStage,
    #[source]
    #[diagnostic_source]
    pub source: DataError,
}

impl LoadError {
    /// One-line message including the cause, e.g. `Failed to load schema (...)`
    pub fn message(&self) -> String {
        format!("{} ({})", self, self.source)
    }
}

/// Result of asking the providers for a schema and prefill document
#[derive(Debug)]
pub enum Acquisition {
    Loaded {
        schema: SchemaNode,
        document: JsonValue,
    },
    SchemaFailed(DataError),
    /// The schema arrived but the prefill document did not
    PrefillFailed {
        schema: SchemaNode,
        error: DataError,
    },
}

impl Acquisition {
    /// Fetch the schema, then the prefill document at `locator`
    pub fn fetch(
        schema_provider: &dyn SchemaProvider,
        prefill_provider: &dyn PrefillProvider,
        locator: &str,
    ) -> Self {
        let schema = match schema_provider.fetch_schema() {
            Ok(schema) => schema,
            Err(error) => return Acquisition::SchemaFailed(error),
        };
        match prefill_provider.fetch_prefill(locator) {
            Ok(document) => Acquisition::Loaded { schema, document },
            Err(error) => Acquisition::PrefillFailed { schema, error },
        }
    }
}

/// Identifies one issued load request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// Rejected field edit
#[derive(Debug, Error, Diagnostic)]
pub enum EditError {
    #[error("No schema is loaded")]
    #[diagnostic(code(schemaform::session::no_schema))]
    NoSchema,

    #[error("Form is not editable: {message}")]
    #[diagnostic(code(schemaform::session::load_failed), help("Reload the form"))]
    LoadFailed { message: String },

    #[error("'{path}' is not a field of this form")]
    #[diagnostic(
        code(schemaform::session::unknown_field),
        help("Run `schemaform schema show` to list the field paths")
    )]
    UnknownField { path: String },
}

/// A field that blocks submission
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("{path}: {message}")]
pub struct FieldViolation {
    pub path: String,
    pub message: String,
}

/// Submission refused
#[derive(Debug, Error, Diagnostic)]
pub enum SubmitError {
    #[error("No schema is loaded")]
    #[diagnostic(code(schemaform::session::no_schema))]
    NoSchema,

    #[error("Form cannot be submitted: {message}")]
    #[diagnostic(code(schemaform::session::load_failed), help("Reload the form"))]
    LoadFailed { message: String },

    #[error("Form is invalid: {summary}")]
    #[diagnostic(code(schemaform::session::invalid))]
    Invalid {
        summary: String,
        #[related]
        fields: Vec<FieldViolation>,
    },
}

/// Schema plus form state, with load and submit orchestration
#[derive(Debug, Default)]
pub struct FormSession {
    schema: Option<SchemaNode>,
    state: FormState,
    load_state: LoadState,
    issued: u64,
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(&self) -> Option<&SchemaNode> {
        self.schema.as_ref()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Direct access for renderers that manage validation themselves
    pub fn state_mut(&mut self) -> &mut FormState {
        &mut self.state
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    pub fn load_error(&self) -> Option<&str> {
        match &self.load_state {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Mark a new request as outstanding
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        self.load_state = LoadState::Loading;
        tracing::debug!(ticket = self.issued, "load started");
        LoadTicket(self.issued)
    }

    /// Apply the outcome of a request
    ///
    /// Requests are never cancelled: whichever completes last determines the
    /// session contents, even if a newer request was issued before it.
    pub fn complete_load(&mut self, ticket: LoadTicket, acquisition: Acquisition) -> Result<(), LoadError> {
        if ticket.0 < self.issued {
            tracing::debug!(ticket = ticket.0, latest = self.issued, "applying result of an older load");
        }

        match acquisition {
            Acquisition::Loaded { schema, document } => {
                let values = flatten(&document, &schema);
                self.state.clear();
                self.state.replace_values(values);
                tracing::info!(fields = self.state.values().len(), "form loaded");
                self.schema = Some(schema);
                self.load_state = LoadState::Ready;
                Ok(())
            }
            Acquisition::SchemaFailed(source) => self.fail(LoadError {
                stage: LoadStage::Schema,
                source,
            }),
            Acquisition::PrefillFailed { schema, error } => {
                // Every leaf of the new schema gets its default; nothing from
                // the previous form survives
                let values = flatten(&JsonValue::Object(Map::new()), &schema);
                self.state.clear();
                self.state.replace_values(values);
                self.schema = Some(schema);
                self.fail(LoadError {
                    stage: LoadStage::Prefill,
                    source: error,
                })
            }
        }
    }

    /// Fetch and apply in one step
    pub fn load(
        &mut self,
        schema_provider: &dyn SchemaProvider,
        prefill_provider: &dyn PrefillProvider,
        locator: &str,
    ) -> Result<(), LoadError> {
        let ticket = self.begin_load();
        let acquisition = Acquisition::fetch(schema_provider, prefill_provider, locator);
        self.complete_load(ticket, acquisition)
    }

    fn fail(&mut self, error: LoadError) -> Result<(), LoadError> {
        let message = error.message();
        tracing::warn!(%message, "load failed");
        self.load_state = LoadState::Failed(message);
        Err(error)
    }

    /// The leaf node at `path`, if any
    pub fn leaf(&self, path: &str) -> Option<&SchemaNode> {
        self.schema
            .as_ref()
            .and_then(|schema| resolve(schema, path))
            .filter(|node| node.is_leaf())
    }

    /// Current value at `path`, or the kind default for that field
    pub fn value(&self, path: &str) -> DynamicValue {
        match &self.schema {
            Some(schema) => self.state.get_or_default(schema, path),
            None => self.state.get(path),
        }
    }

    /// Write a field, then re-validate the whole form
    ///
    /// Returns the form's overall validity after the edit.
    pub fn update_value(&mut self, path: &str, value: impl Into<DynamicValue>) -> Result<bool, EditError> {
        if let LoadState::Failed(message) = &self.load_state {
            return Err(EditError::LoadFailed {
                message: message.clone(),
            });
        }
        let schema = self.schema.as_ref().ok_or(EditError::NoSchema)?;
        if !resolve(schema, path).is_some_and(|node| node.is_leaf()) {
            return Err(EditError::UnknownField {
                path: path.to_string(),
            });
        }
        self.state.set(path, value);
        Ok(self.state.validate_all(schema))
    }

    /// Write a field from raw renderer text, coercing it to the field's type
    pub fn update_from_input(&mut self, path: &str, raw: &str) -> Result<bool, EditError> {
        let node = self.leaf(path).ok_or_else(|| match self.schema {
            Some(_) => EditError::UnknownField {
                path: path.to_string(),
            },
            None => EditError::NoSchema,
        })?;
        let value = DynamicValue::from_input(node, raw);
        self.update_value(path, value)
    }

    /// Full validation pass over the current values
    pub fn validate(&mut self) -> bool {
        match &self.schema {
            Some(schema) => self.state.validate_all(schema),
            None => false,
        }
    }

    /// Validate and, when the form is valid, return the values as a JSON
    /// object keyed by path
    pub fn submit(&mut self) -> Result<JsonValue, SubmitError> {
        if self.schema.is_none() {
            return Err(SubmitError::NoSchema);
        }
        if let LoadState::Failed(message) = &self.load_state {
            return Err(SubmitError::LoadFailed {
                message: message.clone(),
            });
        }
        if !self.validate() {
            let fields: Vec<FieldViolation> = self
                .state
                .errors()
                .iter()
                .map(|(path, message)| FieldViolation {
                    path: path.clone(),
                    message: message.clone(),
                })
                .collect();
            let summary = if fields.len() == 1 {
                "1 field has errors".to_string()
            } else {
                format!("{} fields have errors", fields.len())
            };
            return Err(SubmitError::Invalid { summary, fields });
        }

        let payload: Map<String, JsonValue> = self
            .state
            .values()
            .iter()
            .map(|(path, value)| (path.clone(), value.to_json()))
            .collect();
        tracing::info!(fields = payload.len(), "form submitted");
        Ok(JsonValue::Object(payload))
    }
}
