//! Field path addressing
//!
//! A path is the dot-joined list of property names from the root object
//! (the root itself is the empty string). Flattener, validator and renderer
//! all derive paths through [`child_path`] so they agree on field identity.

use crate::schema::node::SchemaNode;

/// Path of the child `key` under `parent`
pub fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// A leaf position in the schema tree
#[derive(Debug, Clone)]
pub struct Leaf<'a> {
    pub path: String,
    pub name: &'a str,
    pub node: &'a SchemaNode,
    /// Listed in the parent's `required`
    pub required: bool,
}

/// All leaf positions of `schema` in document order
pub fn leaves(schema: &SchemaNode) -> Vec<Leaf<'_>> {
    let mut out = Vec::new();
    collect_leaves(schema, "", "", false, &mut out);
    out
}

fn collect_leaves<'a>(
    node: &'a SchemaNode,
    path: &str,
    name: &'a str,
    required: bool,
    out: &mut Vec<Leaf<'a>>,
) {
    match node {
        SchemaNode::Object(obj) => {
            for (key, child) in obj.properties.iter() {
                let next = child_path(path, key);
                collect_leaves(child, &next, key, obj.is_required(key), out);
            }
        }
        _ => out.push(Leaf {
            path: path.to_string(),
            name,
            node,
            required,
        }),
    }
}

/// Find the node addressed by `path`, branches included
///
/// Matches whole path segments: `ab` never resolves under `a`. Decoding
/// rejects property names containing `.`, so each path names one position.
pub fn resolve<'a>(schema: &'a SchemaNode, path: &str) -> Option<&'a SchemaNode> {
    resolve_from(schema, "", path)
}

fn resolve_from<'a>(node: &'a SchemaNode, current: &str, target: &str) -> Option<&'a SchemaNode> {
    if current == target {
        return Some(node);
    }
    let obj = node.as_object()?;
    for (key, child) in obj.properties.iter() {
        let path = child_path(current, key);
        if target == path || target.starts_with(&format!("{}.", path)) {
            if let Some(found) = resolve_from(child, &path, target) {
                return Some(found);
            }
        }
    }
    None
}
