//! Prefill flattening
//!
//! Projects a nested prefill document onto the flat, schema-shaped map of
//! field values. Every schema leaf gets exactly one entry, whatever the
//! document supplies at that position.

use serde_json::Value as JsonValue;

use crate::core::form::FieldValues;
use crate::core::value::DynamicValue;
use crate::schema::node::SchemaNode;
use crate::schema::path::child_path;

/// Flatten `document` against `schema` starting at the root
pub fn flatten(document: &JsonValue, schema: &SchemaNode) -> FieldValues {
    let mut values = FieldValues::new();
    flatten_into(Some(document), schema, "", &mut values);
    tracing::debug!(fields = values.len(), "flattened prefill document");
    values
}

/// Flatten a (possibly missing) document branch into `values` under `path`
pub fn flatten_into(
    element: Option<&JsonValue>,
    node: &SchemaNode,
    path: &str,
    values: &mut FieldValues,
) {
    match node {
        SchemaNode::Object(obj) => {
            let fields = element.and_then(|e| e.as_object());
            for (key, child) in obj.properties.iter() {
                let child_element = fields.and_then(|f| f.get(key));
                flatten_into(child_element, child, &child_path(path, key), values);
            }
        }
        SchemaNode::String(_) => {
            let text = element.and_then(primitive_content).unwrap_or_default();
            values.insert(path.to_string(), DynamicValue::Text(text));
        }
        SchemaNode::Integer(_) => {
            let value = element
                .and_then(integer_content)
                .map(DynamicValue::Integer)
                .unwrap_or(DynamicValue::Absent);
            values.insert(path.to_string(), value);
        }
        SchemaNode::Number(_) => {
            let value = element
                .and_then(number_content)
                .map(DynamicValue::Float)
                .unwrap_or(DynamicValue::Absent);
            values.insert(path.to_string(), value);
        }
        SchemaNode::Boolean(_) => {
            let flag = element.and_then(boolean_content).unwrap_or(false);
            values.insert(path.to_string(), DynamicValue::Boolean(flag));
        }
        SchemaNode::Array(_) => {
            let items = element
                .and_then(|e| e.as_array())
                .map(|arr| arr.iter().filter_map(primitive_content).collect())
                .unwrap_or_default();
            values.insert(path.to_string(), DynamicValue::List(items));
        }
    }
}

/// Text content of a JSON primitive; `None` for null, arrays and objects
fn primitive_content(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

fn integer_content(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn number_content(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn boolean_content(value: &JsonValue) -> Option<bool> {
    match value {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        JsonValue::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}
