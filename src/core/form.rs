//! Form state: current field values and field errors, keyed by path

use std::collections::BTreeMap;
use std::fmt;

use crate::core::value::DynamicValue;
use crate::schema::node::SchemaNode;
use crate::schema::path::resolve;
use crate::schema::validator;

/// Path -> value
pub type FieldValues = BTreeMap<String, DynamicValue>;

/// Path -> error message
pub type FieldErrors = BTreeMap<String, String>;

/// Change notification delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// A single value was written or removed
    ValueChanged { path: String },
    /// All values were replaced (fresh prefill)
    ValuesReplaced,
    /// A validation pass replaced the error map
    ErrorsReplaced { valid: bool },
    /// Values and errors were emptied
    Cleared,
}

/// Handle returned by [`FormState::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&FormEvent) + Send>;

/// Mutable container for a form's values and errors
///
/// Only leaf paths ever hold entries. Writers are expected to be serialised
/// by the caller; the state itself does no locking.
#[derive(Default)]
pub struct FormState {
    values: FieldValues,
    errors: FieldErrors,
    revision: u64,
    clean_revision: u64,
    next_subscription: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value at `path`, `Absent` when nothing is stored
    pub fn get(&self, path: &str) -> DynamicValue {
        self.values.get(path).cloned().unwrap_or_default()
    }

    /// Current value at `path`, or the kind default of the leaf `schema` puts there
    pub fn get_or_default(&self, schema: &SchemaNode, path: &str) -> DynamicValue {
        match self.values.get(path) {
            Some(value) => value.clone(),
            None => resolve(schema, path)
                .map(|node| DynamicValue::default_for(node.kind()))
                .unwrap_or_default(),
        }
    }

    /// Overwrite the value at `path`. Does not re-validate.
    ///
    /// `path` must be a leaf path of the current schema; the state does not
    /// check. [`FormSession::update_value`](crate::core::session::FormSession::update_value)
    /// is the checked entry point.
    pub fn set(&mut self, path: impl Into<String>, value: impl Into<DynamicValue>) {
        let path = path.into();
        self.values.insert(path.clone(), value.into());
        self.bump(FormEvent::ValueChanged { path });
    }

    /// Drop the value at `path`
    pub fn remove(&mut self, path: &str) -> Option<DynamicValue> {
        let old = self.values.remove(path);
        if old.is_some() {
            self.bump(FormEvent::ValueChanged {
                path: path.to_string(),
            });
        }
        old
    }

    pub fn error_for(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Empty both maps
    pub fn clear(&mut self) {
        self.values.clear();
        self.errors.clear();
        self.bump(FormEvent::Cleared);
    }

    /// Replace every value at once (used after flattening a prefill document)
    pub fn replace_values(&mut self, values: FieldValues) {
        self.values = values;
        self.bump(FormEvent::ValuesReplaced);
    }

    /// Run a full validation pass of `schema` over the current values
    pub fn validate_all(&mut self, schema: &SchemaNode) -> bool {
        let mut errors = std::mem::take(&mut self.errors);
        let valid = validator::validate_all(schema, &self.values, &mut errors);
        self.errors = errors;
        self.bump(FormEvent::ErrorsReplaced { valid });
        valid
    }

    /// Re-check only the field at `path`
    ///
    /// Leaves the error map exactly as a full pass would. Returns `None` when
    /// `path` is not a leaf of `schema`.
    pub fn validate_field(&mut self, schema: &SchemaNode, path: &str) -> Option<bool> {
        let valid = validator::validate_field(schema, &self.values, path, &mut self.errors)?;
        self.bump(FormEvent::ErrorsReplaced {
            valid: self.errors.is_empty(),
        });
        Some(valid)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Incremented on every mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when the state changed since the last [`mark_clean`](Self::mark_clean)
    pub fn is_dirty(&self) -> bool {
        self.revision != self.clean_revision
    }

    pub fn mark_clean(&mut self) {
        self.clean_revision = self.revision;
    }

    /// Register a listener called after every mutation
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&FormEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn bump(&mut self, event: FormEvent) {
        self.revision += 1;
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
