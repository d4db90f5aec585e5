//! Typed schema tree
//!
//! A `SchemaNode` is the immutable, decoded form of a schema document. Every
//! other part of the engine (path addressing, prefill flattening, validation,
//! rendering) dispatches on it with an exhaustive `match`.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// One node of the schema tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaNode {
    String(StringNode),
    Integer(IntegerNode),
    Number(NumberNode),
    Boolean(BooleanNode),
    Object(ObjectNode),
    Array(ArrayNode),
}

/// Kind discriminator for a `SchemaNode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl SchemaKind {
    /// The `type` keyword used for this kind in schema documents
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::String => "string",
            SchemaKind::Integer => "integer",
            SchemaKind::Number => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
        }
    }

    /// Parse a `type` keyword
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "string" => Some(SchemaKind::String),
            "integer" => Some(SchemaKind::Integer),
            "number" => Some(SchemaKind::Number),
            "boolean" => Some(SchemaKind::Boolean),
            "object" => Some(SchemaKind::Object),
            "array" => Some(SchemaKind::Array),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StringNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Allowed values, in display order
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    /// Format hint; only `date` is enforced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl StringNode {
    /// True when the node asks for a `YYYY-MM-DD` calendar date
    pub fn is_date(&self) -> bool {
        self.format.as_deref() == Some("date")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntegerNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumberNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BooleanNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub properties: Properties,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ObjectNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add (or replace) a property
    pub fn property(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.properties.insert(name, node);
        self
    }

    /// Builder: mark a property as required
    pub fn require(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    /// Whether `name` appears in this node's `required` list
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Array node. Only string items are supported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArrayNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
}

/// Ordered property mapping with unique names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Vec<(String, SchemaNode)>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property, replacing (in place) any property with the same name
    pub fn insert(&mut self, name: impl Into<String>, node: SchemaNode) -> Option<SchemaNode> {
        let name = name.into();
        if let Some(slot) = self.0.iter_mut().find(|(n, _)| *n == name) {
            return Some(std::mem::replace(&mut slot.1, node));
        }
        self.0.push((name, node));
        None
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, node)| node)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.0.iter().map(|(n, node)| (n.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, node) in &self.0 {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

impl SchemaNode {
    pub fn kind(&self) -> SchemaKind {
        match self {
            SchemaNode::String(_) => SchemaKind::String,
            SchemaNode::Integer(_) => SchemaKind::Integer,
            SchemaNode::Number(_) => SchemaKind::Number,
            SchemaNode::Boolean(_) => SchemaKind::Boolean,
            SchemaNode::Object(_) => SchemaKind::Object,
            SchemaNode::Array(_) => SchemaKind::Array,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            SchemaNode::String(n) => n.title.as_deref(),
            SchemaNode::Integer(n) => n.title.as_deref(),
            SchemaNode::Number(n) => n.title.as_deref(),
            SchemaNode::Boolean(n) => n.title.as_deref(),
            SchemaNode::Object(n) => n.title.as_deref(),
            SchemaNode::Array(n) => n.title.as_deref(),
        }
    }

    /// Everything except `Object` holds a value
    pub fn is_leaf(&self) -> bool {
        !matches!(self, SchemaNode::Object(_))
    }

    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            SchemaNode::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Short human summary of the node's constraints, e.g. `min 0, max 10`
    pub fn constraints(&self) -> String {
        let mut parts = Vec::new();
        match self {
            SchemaNode::String(n) => {
                if let Some(min) = n.min_length {
                    parts.push(format!("minLength {}", min));
                }
                if let Some(max) = n.max_length {
                    parts.push(format!("maxLength {}", max));
                }
                if let Some(ref format) = n.format {
                    parts.push(format!("format {}", format));
                }
                if let Some(ref options) = n.options {
                    parts.push(format!("one of {}", options.join("|")));
                }
            }
            SchemaNode::Integer(n) => {
                if let Some(min) = n.minimum {
                    parts.push(format!("min {}", min));
                }
                if let Some(max) = n.maximum {
                    parts.push(format!("max {}", max));
                }
            }
            SchemaNode::Number(n) => {
                if let Some(min) = n.minimum {
                    parts.push(format!("min {}", min));
                }
                if let Some(max) = n.maximum {
                    parts.push(format!("max {}", max));
                }
            }
            SchemaNode::Array(n) => {
                if let Some(ref items) = n.items {
                    parts.push(format!("items {}", items.kind()));
                }
            }
            SchemaNode::Boolean(_) | SchemaNode::Object(_) => {}
        }
        parts.join(", ")
    }

    pub fn string() -> Self {
        SchemaNode::String(StringNode::default())
    }

    pub fn integer() -> Self {
        SchemaNode::Integer(IntegerNode::default())
    }

    pub fn number() -> Self {
        SchemaNode::Number(NumberNode::default())
    }

    pub fn boolean() -> Self {
        SchemaNode::Boolean(BooleanNode::default())
    }

    /// Array of plain strings
    pub fn string_list() -> Self {
        SchemaNode::Array(ArrayNode {
            title: None,
            items: Some(Box::new(SchemaNode::string())),
        })
    }
}

impl From<ObjectNode> for SchemaNode {
    fn from(node: ObjectNode) -> Self {
        SchemaNode::Object(node)
    }
}

impl From<StringNode> for SchemaNode {
    fn from(node: StringNode) -> Self {
        SchemaNode::String(node)
    }
}

impl From<IntegerNode> for SchemaNode {
    fn from(node: IntegerNode) -> Self {
        SchemaNode::Integer(node)
    }
}

impl From<NumberNode> for SchemaNode {
    fn from(node: NumberNode) -> Self {
        SchemaNode::Number(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_keep_insertion_order() {
        let obj = ObjectNode::new()
            .property("zeta", SchemaNode::string())
            .property("alpha", SchemaNode::integer())
            .property("mid", SchemaNode::boolean());

        let names: Vec<&str> = obj.properties.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_properties_insert_replaces_duplicate() {
        let mut props = Properties::new();
        assert!(props.insert("a", SchemaNode::string()).is_none());
        let old = props.insert("a", SchemaNode::integer());
        assert_eq!(old, Some(SchemaNode::string()));
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("a").map(|n| n.kind()), Some(SchemaKind::Integer));
    }

    #[test]
    fn test_require_is_idempotent() {
        let obj = ObjectNode::new()
            .property("a", SchemaNode::string())
            .require("a")
            .require("a");
        assert_eq!(obj.required, vec!["a".to_string()]);
        assert!(obj.is_required("a"));
        assert!(!obj.is_required("b"));
    }

    #[test]
    fn test_kind_round_trips_keyword() {
        for kind in [
            SchemaKind::String,
            SchemaKind::Integer,
            SchemaKind::Number,
            SchemaKind::Boolean,
            SchemaKind::Object,
            SchemaKind::Array,
        ] {
            assert_eq!(SchemaKind::from_keyword(kind.as_str()), Some(kind));
        }
        assert_eq!(SchemaKind::from_keyword("null"), None);
    }

    #[test]
    fn test_serialize_uses_schema_keywords() {
        let node: SchemaNode = ObjectNode::new()
            .property(
                "name",
                StringNode {
                    min_length: Some(2),
                    options: Some(vec!["a".into(), "b".into()]),
                    ..Default::default()
                }
                .into(),
            )
            .require("name")
            .into();

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "object");
        assert_eq!(json["required"][0], "name");
        assert_eq!(json["properties"]["name"]["type"], "string");
        assert_eq!(json["properties"]["name"]["minLength"], 2);
        assert_eq!(json["properties"]["name"]["enum"][1], "b");
        assert!(json["properties"]["name"].get("maxLength").is_none());
    }

    #[test]
    fn test_constraints_summary() {
        let node: SchemaNode = IntegerNode {
            minimum: Some(0),
            maximum: Some(10),
            ..Default::default()
        }
        .into();
        assert_eq!(node.constraints(), "min 0, max 10");
        assert_eq!(SchemaNode::boolean().constraints(), "");
    }
}
