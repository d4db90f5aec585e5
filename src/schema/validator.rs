//! Per-field validation of form values against the schema tree
//!
//! A validation pass walks the whole schema, checks every leaf against the
//! value currently stored at its path and produces a complete replacement of
//! the error map. Messages are part of the contract: renderers display them
//! verbatim, so their wording must stay stable.

use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

use crate::core::form::{FieldErrors, FieldValues};
use crate::core::value::{format_number, DynamicValue};
use crate::schema::node::SchemaNode;
use crate::schema::path::{child_path, leaves};

/// A numeric bound quoted in a message
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Integer(i64),
    Float(f64),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Integer(n) => write!(f, "{}", n),
            Bound::Float(x) => write!(f, "{}", format_number(*x)),
        }
    }
}

/// Why a single field is invalid
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("Field is required")]
    Required,

    #[error("Must be at least {0} characters long")]
    TooShort(u64),

    #[error("Must be at most {0} characters long")]
    TooLong(u64),

    #[error("Invalid date format. Expected YYYY-MM-DD")]
    InvalidDate,

    #[error("Invalid integer value")]
    InvalidInteger,

    #[error("Invalid number value")]
    InvalidNumber,

    #[error("Minimum value: {0}")]
    BelowMinimum(Bound),

    #[error("Maximum value: {0}")]
    AboveMaximum(Bound),
}

/// Run a full validation pass from the root, replacing `errors`
///
/// Returns true when every leaf is valid.
pub fn validate_all(schema: &SchemaNode, values: &FieldValues, errors: &mut FieldErrors) -> bool {
    let valid = validate_tree(schema, values, "", false, errors);
    tracing::debug!(valid, errors = errors.len(), "validation pass complete");
    valid
}

/// Validate the subtree `node` located at `path`
///
/// Called with the root path, the error map is cleared first. Validity of an
/// object is the conjunction of its children; every child is visited even
/// after one fails so the error map stays complete.
pub fn validate_tree(
    node: &SchemaNode,
    values: &FieldValues,
    path: &str,
    required: bool,
    errors: &mut FieldErrors,
) -> bool {
    if path.is_empty() {
        errors.clear();
    }

    match node {
        SchemaNode::Object(obj) => {
            let mut valid = true;
            for (key, child) in obj.properties.iter() {
                let child_required = obj.is_required(key);
                if !validate_tree(child, values, &child_path(path, key), child_required, errors) {
                    valid = false;
                }
            }
            valid
        }
        _ => {
            let value = values.get(path).unwrap_or(&DynamicValue::Absent);
            record(path, check_leaf(node, value, required), errors)
        }
    }
}

/// Re-check a single leaf and patch its entry in `errors`
///
/// Produces the same entry a full pass would, because a leaf's verdict only
/// depends on its own value and required flag. Returns `None` when `path`
/// does not address a leaf.
pub fn validate_field(
    schema: &SchemaNode,
    values: &FieldValues,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<bool> {
    let leaf = leaves(schema).into_iter().find(|l| l.path == path)?;
    let value = values.get(path).unwrap_or(&DynamicValue::Absent);
    Some(record(path, check_leaf(leaf.node, value, leaf.required), errors))
}

fn record(path: &str, error: Option<FieldError>, errors: &mut FieldErrors) -> bool {
    match error {
        Some(error) => {
            tracing::trace!(path, %error, "field invalid");
            errors.insert(path.to_string(), error.to_string());
            false
        }
        None => {
            errors.remove(path);
            true
        }
    }
}

/// Check one leaf value. The first violated rule wins.
pub fn check_leaf(node: &SchemaNode, value: &DynamicValue, required: bool) -> Option<FieldError> {
    if required && value.is_blank() {
        return Some(FieldError::Required);
    }

    match node {
        SchemaNode::String(n) => {
            let text = value.to_text();
            let length = text.chars().count() as u64;
            if let Some(min) = n.min_length.filter(|min| length < *min) {
                Some(FieldError::TooShort(min))
            } else if let Some(max) = n.max_length.filter(|max| length > *max) {
                Some(FieldError::TooLong(max))
            } else if n.is_date() && !text.is_empty() && !is_valid_date(&text) {
                Some(FieldError::InvalidDate)
            } else {
                None
            }
        }
        SchemaNode::Integer(n) => {
            let parsed = match value {
                DynamicValue::Integer(i) => Some(*i),
                other => other.to_text().parse::<i64>().ok(),
            };
            match parsed {
                None if !value.is_blank() => Some(FieldError::InvalidInteger),
                None => None,
                Some(num) => {
                    if let Some(min) = n.minimum.filter(|min| num < *min) {
                        Some(FieldError::BelowMinimum(Bound::Integer(min)))
                    } else if let Some(max) = n.maximum.filter(|max| num > *max) {
                        Some(FieldError::AboveMaximum(Bound::Integer(max)))
                    } else {
                        None
                    }
                }
            }
        }
        SchemaNode::Number(n) => {
            let parsed = match value {
                DynamicValue::Float(f) => Some(*f),
                DynamicValue::Integer(i) => Some(*i as f64),
                other => other.to_text().parse::<f64>().ok(),
            }
            .filter(|f| f.is_finite());
            match parsed {
                None if !value.is_blank() => Some(FieldError::InvalidNumber),
                None => None,
                Some(num) => {
                    if let Some(min) = n.minimum.filter(|min| num < *min) {
                        Some(FieldError::BelowMinimum(Bound::Float(min)))
                    } else if let Some(max) = n.maximum.filter(|max| num > *max) {
                        Some(FieldError::AboveMaximum(Bound::Float(max)))
                    } else {
                        None
                    }
                }
            }
        }
        SchemaNode::Array(_) => match value {
            DynamicValue::List(items) if required && items.is_empty() => Some(FieldError::Required),
            _ => None,
        },
        SchemaNode::Boolean(_) => None,
        // Objects are validated through their children
        SchemaNode::Object(_) => None,
    }
}

/// Strict `YYYY-MM-DD` calendar date: exact shape and a real day
pub fn is_valid_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    shaped && NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}
