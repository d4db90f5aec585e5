//! Dynamically-typed field values

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;

use crate::schema::node::{SchemaKind, SchemaNode};

/// The value held by a single form field
///
/// Serialises untagged, so a form's values map becomes a plain JSON object
/// with `null` for absent fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum DynamicValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<String>),
    #[default]
    Absent,
}

impl DynamicValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, DynamicValue::Absent)
    }

    /// Absent, or an empty string
    pub fn is_blank(&self) -> bool {
        match self {
            DynamicValue::Absent => true,
            DynamicValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            DynamicValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Textual rendering used by length checks and numeric re-parsing
    pub fn to_text(&self) -> String {
        match self {
            DynamicValue::Text(s) => s.clone(),
            DynamicValue::Integer(n) => n.to_string(),
            DynamicValue::Float(f) => format_number(*f),
            DynamicValue::Boolean(b) => b.to_string(),
            DynamicValue::List(items) => format!("[{}]", items.join(", ")),
            DynamicValue::Absent => String::new(),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            DynamicValue::Text(s) => JsonValue::String(s.clone()),
            DynamicValue::Integer(n) => JsonValue::from(*n),
            DynamicValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DynamicValue::Boolean(b) => JsonValue::Bool(*b),
            DynamicValue::List(items) => {
                JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
            }
            DynamicValue::Absent => JsonValue::Null,
        }
    }

    /// The value a renderer shows for a field that has no stored value
    pub fn default_for(kind: SchemaKind) -> Self {
        match kind {
            SchemaKind::String => DynamicValue::Text(String::new()),
            SchemaKind::Boolean => DynamicValue::Boolean(false),
            SchemaKind::Array => DynamicValue::List(Vec::new()),
            SchemaKind::Integer | SchemaKind::Number | SchemaKind::Object => DynamicValue::Absent,
        }
    }

    /// Convert raw text typed into a field into a value of the node's type
    ///
    /// Numeric input that does not parse is kept as text so validation can
    /// report it. Blank numeric input clears the field.
    pub fn from_input(node: &SchemaNode, raw: &str) -> Self {
        match node {
            SchemaNode::String(_) => DynamicValue::Text(raw.to_string()),
            SchemaNode::Integer(_) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    DynamicValue::Absent
                } else {
                    trimmed
                        .parse::<i64>()
                        .map(DynamicValue::Integer)
                        .unwrap_or_else(|_| DynamicValue::Text(raw.to_string()))
                }
            }
            SchemaNode::Number(_) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    DynamicValue::Absent
                } else {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(DynamicValue::Float)
                        .unwrap_or_else(|| DynamicValue::Text(raw.to_string()))
                }
            }
            SchemaNode::Boolean(_) => match raw.trim().to_lowercase().as_str() {
                "true" | "yes" | "y" | "1" | "on" => DynamicValue::Boolean(true),
                "false" | "no" | "n" | "0" | "off" | "" => DynamicValue::Boolean(false),
                _ => DynamicValue::Text(raw.to_string()),
            },
            SchemaNode::Array(_) => DynamicValue::List(
                raw.split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            SchemaNode::Object(_) => DynamicValue::Absent,
        }
    }
}

impl fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl From<&str> for DynamicValue {
    fn from(s: &str) -> Self {
        DynamicValue::Text(s.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(s: String) -> Self {
        DynamicValue::Text(s)
    }
}

impl From<i64> for DynamicValue {
    fn from(n: i64) -> Self {
        DynamicValue::Integer(n)
    }
}

impl From<f64> for DynamicValue {
    fn from(f: f64) -> Self {
        DynamicValue::Float(f)
    }
}

impl From<bool> for DynamicValue {
    fn from(b: bool) -> Self {
        DynamicValue::Boolean(b)
    }
}

impl From<Vec<String>> for DynamicValue {
    fn from(items: Vec<String>) -> Self {
        DynamicValue::List(items)
    }
}

impl From<Vec<&str>> for DynamicValue {
    fn from(items: Vec<&str>) -> Self {
        DynamicValue::List(items.into_iter().map(String::from).collect())
    }
}

/// Render a float the way field messages expect: whole numbers keep one
/// fractional digit (`80000.0`), everything else uses the shortest form.
pub fn format_number(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::node::StringNode;

    #[test]
    fn test_blank() {
        assert!(DynamicValue::Absent.is_blank());
        assert!(DynamicValue::from("").is_blank());
        assert!(!DynamicValue::from(" ").is_blank());
        assert!(!DynamicValue::Boolean(false).is_blank());
        assert!(!DynamicValue::List(vec![]).is_blank());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(DynamicValue::Integer(42).to_text(), "42");
        assert_eq!(DynamicValue::Float(80000.0).to_text(), "80000.0");
        assert_eq!(DynamicValue::Float(2.5).to_text(), "2.5");
        assert_eq!(DynamicValue::from(vec!["a", "b"]).to_text(), "[a, b]");
        assert_eq!(DynamicValue::Absent.to_text(), "");
    }

    #[test]
    fn test_serializes_untagged() {
        let json = serde_json::to_value(DynamicValue::Absent).unwrap();
        assert!(json.is_null());
        let json = serde_json::to_value(DynamicValue::from(vec!["x"])).unwrap();
        assert_eq!(json, serde_json::json!(["x"]));
        assert_eq!(DynamicValue::Integer(7).to_json(), serde_json::json!(7));
    }

    #[test]
    fn test_default_for_kind() {
        assert_eq!(DynamicValue::default_for(SchemaKind::String), DynamicValue::from(""));
        assert_eq!(DynamicValue::default_for(SchemaKind::Boolean), DynamicValue::Boolean(false));
        assert_eq!(DynamicValue::default_for(SchemaKind::Array), DynamicValue::List(vec![]));
        assert!(DynamicValue::default_for(SchemaKind::Integer).is_absent());
    }

    #[test]
    fn test_from_input_integer() {
        let node = SchemaNode::integer();
        assert_eq!(DynamicValue::from_input(&node, " 15 "), DynamicValue::Integer(15));
        assert_eq!(DynamicValue::from_input(&node, ""), DynamicValue::Absent);
        assert_eq!(DynamicValue::from_input(&node, "1.5"), DynamicValue::from("1.5"));
    }

    #[test]
    fn test_from_input_number() {
        let node = SchemaNode::number();
        assert_eq!(DynamicValue::from_input(&node, "1.5"), DynamicValue::Float(1.5));
        assert_eq!(DynamicValue::from_input(&node, "abc"), DynamicValue::from("abc"));
        assert_eq!(DynamicValue::from_input(&node, "NaN"), DynamicValue::from("NaN"));
    }

    #[test]
    fn test_from_input_boolean_and_list() {
        assert_eq!(
            DynamicValue::from_input(&SchemaNode::boolean(), "Yes"),
            DynamicValue::Boolean(true)
        );
        assert_eq!(
            DynamicValue::from_input(&SchemaNode::string_list(), "a, b,,c "),
            DynamicValue::from(vec!["a", "b", "c"])
        );
    }

    #[test]
    fn test_from_input_string_is_verbatim() {
        let node: SchemaNode = StringNode::default().into();
        assert_eq!(DynamicValue::from_input(&node, " padded "), DynamicValue::from(" padded "));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0.0");
        assert_eq!(format_number(-3.0), "-3.0");
        assert_eq!(format_number(0.25), "0.25");
    }
}
