use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A dynamically-shaped JSON value used to represent LLM-produced payloads
/// (user portraits, topic maps) whose field set is not known at compile time.
///
/// Uses a `BTreeMap` rather than `serde_json::Map` so iteration order is
/// deterministic for rendering and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<Node>),
    Object(BTreeMap<String, Node>),
}

impl Node {
    pub fn as_object(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty_collection(&self) -> bool {
        match self {
            Node::Object(m) => m.is_empty(),
            Node::Array(a) => a.is_empty(),
            _ => false,
        }
    }

    /// Render this node as a recursively indented bullet list, 2 spaces per
    /// depth level. Leaf values are rendered inline on their own bullet;
    /// objects and arrays open a nested block under a `- key:` header.
    pub fn render_indented(&self, indent: &str) -> String {
        let mut out = String::new();
        render_node(self, indent, &mut out);
        out
    }
}

impl From<serde_json::Value> for Node {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Node::Null,
            serde_json::Value::Bool(b) => Node::Bool(b),
            serde_json::Value::Number(n) => Node::Number(n),
            serde_json::Value::String(s) => Node::String(s),
            serde_json::Value::Array(a) => Node::Array(a.into_iter().map(Node::from).collect()),
            serde_json::Value::Object(o) => {
                Node::Object(o.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

fn render_node(node: &Node, indent: &str, out: &mut String) {
    match node {
        Node::Object(map) => {
            for (key, value) in map {
                match value {
                    Node::Object(_) | Node::Array(_) => {
                        out.push_str(&format!("{indent}- {key}:\n"));
                        render_node(value, &format!("{indent}  "), out);
                    }
                    leaf => {
                        out.push_str(&format!("{indent}- {key}: {}\n", render_leaf(leaf)));
                    }
                }
            }
        }
        Node::Array(items) => {
            for item in items {
                match item {
                    Node::Object(_) | Node::Array(_) => {
                        out.push_str(&format!("{indent}-\n"));
                        render_node(item, &format!("{indent}  "), out);
                    }
                    leaf => out.push_str(&format!("{indent}- {}\n", render_leaf(leaf))),
                }
            }
        }
        leaf => out.push_str(&format!("{indent}{}\n", render_leaf(leaf))),
    }
}

fn render_leaf(node: &Node) -> String {
    match node {
        Node::Null => "null".to_string(),
        Node::Bool(b) => b.to_string(),
        Node::Number(n) => n.to_string(),
        Node::String(s) => s.clone(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_object_with_growing_indent() {
        let json = serde_json::json!({
            "basic_information": { "age": "28" },
            "interest_topics": { "hobby": "climbing" }
        });
        let node = Node::from(json);
        let rendered = node.render_indented("");
        assert!(rendered.contains("- basic_information:\n  - age: 28\n"));
        assert!(rendered.contains("- interest_topics:\n  - hobby: climbing\n"));
    }

    #[test]
    fn empty_object_detected() {
        assert!(Node::Object(BTreeMap::new()).is_empty_collection());
        assert!(!Node::String("x".into()).is_empty_collection());
    }
}
