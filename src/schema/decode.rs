//! Schema document decoding
//!
//! Turns a JSON schema document into a typed [`SchemaNode`] tree. Anything
//! the engine cannot represent faithfully is reported as an authoring error
//! with the JSON pointer of the offending node; nothing is guessed, with one
//! documented exception: an untyped node carrying a `$ref` becomes an object
//! with no properties.

use miette::Diagnostic;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::schema::node::{
    ArrayNode, BooleanNode, IntegerNode, NumberNode, ObjectNode, Properties, SchemaKind,
    SchemaNode, StringNode,
};

/// A schema document the engine refuses to load
#[derive(Debug, Error, Diagnostic)]
pub enum SchemaError {
    #[error("Schema node at {pointer} is not a JSON object")]
    #[diagnostic(code(schemaform::schema::not_an_object))]
    NotAnObject { pointer: String },

    #[error("Schema node at {pointer} has no 'type'")]
    #[diagnostic(
        code(schemaform::schema::missing_type),
        help("Add \"type\": \"string\" (or integer, number, boolean, object, array)")
    )]
    MissingType { pointer: String },

    #[error("Schema node at {pointer} has unknown type '{kind}'")]
    #[diagnostic(
        code(schemaform::schema::unknown_type),
        help("Supported types: string, integer, number, boolean, object, array")
    )]
    UnknownType { pointer: String, kind: String },

    #[error("Invalid '{keyword}' at {pointer}: {reason}")]
    #[diagnostic(code(schemaform::schema::invalid_keyword))]
    InvalidKeyword {
        pointer: String,
        keyword: String,
        reason: String,
    },

    #[error("'{name}' is required at {pointer} but is not one of its properties")]
    #[diagnostic(
        code(schemaform::schema::unknown_required),
        help("Remove '{name}' from 'required' or add it under 'properties'")
    )]
    UnknownRequired { pointer: String, name: String },

    #[error("Property name '{name}' at {pointer} is not a valid path segment")]
    #[diagnostic(
        code(schemaform::schema::invalid_property_name),
        help("Field paths join property names with '.', so names must be non-empty and free of '.'")
    )]
    InvalidPropertyName { pointer: String, name: String },

    #[error("Array at {pointer} has {kind} items; only string items are supported")]
    #[diagnostic(code(schemaform::schema::unsupported_items))]
    UnsupportedItems { pointer: String, kind: SchemaKind },

    #[error("Schema document failed structural checks: {summary}")]
    #[diagnostic(code(schemaform::schema::structure))]
    Structure {
        summary: String,
        #[related]
        violations: Vec<StructureViolation>,
    },
}

impl SchemaError {
    pub fn structure(violations: Vec<StructureViolation>) -> Self {
        let summary = if violations.len() == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", violations.len())
        };
        SchemaError::Structure {
            summary,
            violations,
        }
    }
}

/// One violation of the embedded meta-schema
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("{pointer}: {message}")]
pub struct StructureViolation {
    pub pointer: String,
    pub message: String,
}

/// Decode a whole schema document
///
/// The root node's title falls back to its `description`.
pub fn decode(document: &JsonValue) -> Result<SchemaNode, SchemaError> {
    let mut root = decode_node(document, "#", None)?;
    if root.title().is_none() {
        if let (SchemaNode::Object(obj), Some(desc)) = (
            &mut root,
            document.get("description").and_then(|d| d.as_str()),
        ) {
            obj.title = Some(desc.to_string());
        }
    }
    Ok(root)
}

impl TryFrom<&JsonValue> for SchemaNode {
    type Error = SchemaError;

    fn try_from(value: &JsonValue) -> Result<Self, Self::Error> {
        decode(value)
    }
}

/// Decode the node at `pointer`; `key` is the property name it hangs under
fn decode_node(value: &JsonValue, pointer: &str, key: Option<&str>) -> Result<SchemaNode, SchemaError> {
    let fields = value.as_object().ok_or_else(|| SchemaError::NotAnObject {
        pointer: pointer.to_string(),
    })?;

    let title = opt_str(fields, "title", pointer)?.or_else(|| key.map(String::from));

    let kind = match fields.get("type") {
        Some(JsonValue::String(keyword)) => {
            SchemaKind::from_keyword(keyword).ok_or_else(|| SchemaError::UnknownType {
                pointer: pointer.to_string(),
                kind: keyword.clone(),
            })?
        }
        Some(other) => {
            return Err(invalid(pointer, "type", format!("expected a string, found {}", other)))
        }
        None if fields.contains_key("$ref") => {
            tracing::warn!(
                pointer,
                reference = ?fields.get("$ref"),
                "unresolved $ref treated as an object without properties"
            );
            return Ok(SchemaNode::Object(ObjectNode {
                title,
                ..Default::default()
            }));
        }
        None => {
            return Err(SchemaError::MissingType {
                pointer: pointer.to_string(),
            })
        }
    };

    let node = match kind {
        SchemaKind::String => SchemaNode::String(StringNode {
            title,
            options: opt_string_list(fields, "enum", pointer)?,
            min_length: opt_u64(fields, "minLength", pointer)?,
            max_length: opt_u64(fields, "maxLength", pointer)?,
            format: opt_str(fields, "format", pointer)?,
        }),
        SchemaKind::Integer => SchemaNode::Integer(IntegerNode {
            title,
            minimum: opt_i64(fields, "minimum", pointer)?,
            maximum: opt_i64(fields, "maximum", pointer)?,
        }),
        SchemaKind::Number => SchemaNode::Number(NumberNode {
            title,
            minimum: opt_f64(fields, "minimum", pointer)?,
            maximum: opt_f64(fields, "maximum", pointer)?,
        }),
        SchemaKind::Boolean => SchemaNode::Boolean(BooleanNode { title }),
        SchemaKind::Object => SchemaNode::Object(decode_object(fields, pointer, title)?),
        SchemaKind::Array => {
            let items = match fields.get("items") {
                Some(items) => {
                    let item_pointer = format!("{}/items", pointer);
                    let node = decode_node(items, &item_pointer, None)?;
                    if node.kind() != SchemaKind::String {
                        return Err(SchemaError::UnsupportedItems {
                            pointer: pointer.to_string(),
                            kind: node.kind(),
                        });
                    }
                    Some(Box::new(node))
                }
                None => None,
            };
            SchemaNode::Array(ArrayNode { title, items })
        }
    };

    Ok(node)
}

fn decode_object(
    fields: &Map<String, JsonValue>,
    pointer: &str,
    title: Option<String>,
) -> Result<ObjectNode, SchemaError> {
    let mut properties = Properties::new();
    match fields.get("properties") {
        Some(JsonValue::Object(props)) => {
            for (name, child) in props {
                let child_pointer = format!("{}/properties/{}", pointer, escape_pointer(name));
                if name.is_empty() || name.contains('.') {
                    return Err(SchemaError::InvalidPropertyName {
                        pointer: child_pointer,
                        name: name.clone(),
                    });
                }
                properties.insert(name.clone(), decode_node(child, &child_pointer, Some(name))?);
            }
        }
        Some(other) => {
            return Err(invalid(pointer, "properties", format!("expected an object, found {}", other)))
        }
        None => {}
    }

    let required = opt_string_list(fields, "required", pointer)?.unwrap_or_default();
    if let Some(name) = required.iter().find(|name| !properties.contains(name)) {
        return Err(SchemaError::UnknownRequired {
            pointer: pointer.to_string(),
            name: name.clone(),
        });
    }

    Ok(ObjectNode {
        title,
        properties,
        required,
    })
}

fn invalid(pointer: &str, keyword: &str, reason: impl Into<String>) -> SchemaError {
    SchemaError::InvalidKeyword {
        pointer: pointer.to_string(),
        keyword: keyword.to_string(),
        reason: reason.into(),
    }
}

/// RFC 6901 escaping of a pointer segment
fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn opt_str(fields: &Map<String, JsonValue>, keyword: &str, pointer: &str) -> Result<Option<String>, SchemaError> {
    match fields.get(keyword) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid(pointer, keyword, format!("expected a string, found {}", other))),
    }
}

fn opt_string_list(
    fields: &Map<String, JsonValue>,
    keyword: &str,
    pointer: &str,
) -> Result<Option<Vec<String>>, SchemaError> {
    match fields.get(keyword) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(String::from)
                    .ok_or_else(|| invalid(pointer, keyword, format!("expected strings, found {}", item)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(other) => Err(invalid(pointer, keyword, format!("expected an array, found {}", other))),
    }
}

fn opt_u64(fields: &Map<String, JsonValue>, keyword: &str, pointer: &str) -> Result<Option<u64>, SchemaError> {
    match opt_i64(fields, keyword, pointer)? {
        Some(n) if n < 0 => Err(invalid(pointer, keyword, "must not be negative")),
        Some(n) => Ok(Some(n as u64)),
        None => Ok(None),
    }
}

fn opt_i64(fields: &Map<String, JsonValue>, keyword: &str, pointer: &str) -> Result<Option<i64>, SchemaError> {
    match fields.get(keyword) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9e15).map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| invalid(pointer, keyword, format!("expected an integer, found {}", n))),
        Some(other) => Err(invalid(pointer, keyword, format!("expected an integer, found {}", other))),
    }
}

fn opt_f64(fields: &Map<String, JsonValue>, keyword: &str, pointer: &str) -> Result<Option<f64>, SchemaError> {
    match fields.get(keyword) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => Ok(n.as_f64()),
        Some(other) => Err(invalid(pointer, keyword, format!("expected a number, found {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job_posting() -> JsonValue {
        json!({
            "$id": "https://example.com/job-posting.schema.json",
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "description": "A representation of a job posting",
            "type": "object",
            "required": ["title", "company", "location", "description"],
            "properties": {
                "title": {"type": "string"},
                "company": {"type": "string"},
                "location": {"type": "string"},
                "description": {"type": "string"},
                "employmentType": {"type": "string"},
                "salary": {"type": "number", "minimum": 0},
                "applicationDeadline": {"type": "string", "format": "date"}
            }
        })
    }

    #[test]
    fn test_decode_job_posting() {
        let node = decode(&job_posting()).unwrap();
        let obj = node.as_object().unwrap();

        assert_eq!(node.title(), Some("A representation of a job posting"));
        assert_eq!(obj.properties.len(), 7);
        assert_eq!(obj.required.len(), 4);
        assert!(obj.is_required("company"));

        let names: Vec<&str> = obj.properties.iter().map(|(n, _)| n).collect();
        assert_eq!(names[0], "title");
        assert_eq!(names[6], "applicationDeadline");

        match obj.properties.get("salary") {
            Some(SchemaNode::Number(n)) => assert_eq!(n.minimum, Some(0.0)),
            other => panic!("unexpected salary node: {:?}", other),
        }
        match obj.properties.get("applicationDeadline") {
            Some(SchemaNode::String(s)) => assert!(s.is_date()),
            other => panic!("unexpected deadline node: {:?}", other),
        }
    }

    #[test]
    fn test_property_key_is_default_title() {
        let node = decode(&json!({
            "type": "object",
            "properties": {
                "a": {"type": "string"},
                "b": {"type": "string", "title": "Bee"}
            }
        }))
        .unwrap();
        let obj = node.as_object().unwrap();
        assert_eq!(obj.properties.get("a").and_then(|n| n.title()), Some("a"));
        assert_eq!(obj.properties.get("b").and_then(|n| n.title()), Some("Bee"));
    }

    #[test]
    fn test_nested_object_and_array() {
        let node = decode(&json!({
            "type": "object",
            "properties": {
                "address": {
                    "type": "object",
                    "required": ["city"],
                    "properties": {"city": {"type": "string", "minLength": 2}}
                },
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        }))
        .unwrap();
        let obj = node.as_object().unwrap();
        let address = obj.properties.get("address").and_then(|n| n.as_object()).unwrap();
        assert!(address.is_required("city"));
        assert!(matches!(obj.properties.get("tags"), Some(SchemaNode::Array(a)) if a.items.is_some()));
    }

    #[test]
    fn test_ref_degrades_to_empty_object() {
        let node = decode(&json!({
            "type": "object",
            "properties": {"owner": {"$ref": "#/definitions/person"}}
        }))
        .unwrap();
        match node.as_object().and_then(|o| o.properties.get("owner")) {
            Some(SchemaNode::Object(owner)) => {
                assert!(owner.properties.is_empty());
                assert_eq!(owner.title.as_deref(), Some("owner"));
            }
            other => panic!("unexpected owner node: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = decode(&json!({
            "type": "object",
            "properties": {"x": {"type": "date"}}
        }))
        .unwrap_err();
        match err {
            SchemaError::UnknownType { pointer, kind } => {
                assert_eq!(pointer, "#/properties/x");
                assert_eq!(kind, "date");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_type_is_rejected() {
        let err = decode(&json!({"type": "object", "properties": {"x": {}}})).unwrap_err();
        assert!(matches!(err, SchemaError::MissingType { .. }));
    }

    #[test]
    fn test_required_must_name_property() {
        let err = decode(&json!({
            "type": "object",
            "required": ["ghost"],
            "properties": {"real": {"type": "string"}}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("'ghost'"));
    }

    #[test]
    fn test_non_string_items_rejected() {
        let err = decode(&json!({"type": "array", "items": {"type": "integer"}})).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::UnsupportedItems {
                kind: SchemaKind::Integer,
                ..
            }
        ));
    }

    #[test]
    fn test_ill_typed_constraints() {
        let err = decode(&json!({"type": "string", "minLength": "three"})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidKeyword { ref keyword, .. } if keyword == "minLength"));

        let err = decode(&json!({"type": "string", "maxLength": -1})).unwrap_err();
        assert!(err.to_string().contains("negative"));

        let err = decode(&json!({"type": "integer", "minimum": 0.5})).unwrap_err();
        assert!(err.to_string().contains("expected an integer"));
    }

    #[test]
    fn test_whole_float_bound_accepted_for_integer() {
        let node = decode(&json!({"type": "integer", "maximum": 10.0})).unwrap();
        assert!(matches!(node, SchemaNode::Integer(IntegerNode { maximum: Some(10), .. })));
    }

    #[test]
    fn test_pointer_escaping() {
        let err = decode(&json!({
            "type": "object",
            "properties": {"a/b": {"type": "nope"}}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("#/properties/a~1b"));
    }

    #[test]
    fn test_dotted_property_name_rejected() {
        // "a.b" would share its path with the nested a -> b leaf
        let err = decode(&json!({
            "type": "object",
            "properties": {
                "a.b": {"type": "string"},
                "a": {"type": "object", "properties": {"b": {"type": "integer"}}}
            }
        }))
        .unwrap_err();
        match err {
            SchemaError::InvalidPropertyName { pointer, name } => {
                assert_eq!(pointer, "#/properties/a.b");
                assert_eq!(name, "a.b");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_property_name_rejected() {
        let err = decode(&json!({"type": "object", "properties": {"": {"type": "string"}}})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPropertyName { ref name, .. } if name.is_empty()));
    }

    #[test]
    fn test_dotted_name_rejected_when_nested() {
        let err = decode(&json!({
            "type": "object",
            "properties": {
                "address": {"type": "object", "properties": {"zip.code": {"type": "string"}}}
            }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("#/properties/address/properties/zip.code"));
    }

    #[test]
    fn test_not_an_object() {
        let err = decode(&json!("string")).unwrap_err();
        assert!(matches!(err, SchemaError::NotAnObject { .. }));
    }
}
