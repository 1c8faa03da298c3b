//! In-memory document tree.
//!
//! A small arena-backed stand-in for a browser document, used by tests and
//! by the CLI to preview what a configuration does to a piece of text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::node::{NodeId, NodeKind, Tree};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeData {
    kind: NodeKind,
    /// Upper-case tag for elements.
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Text content for text nodes, `value` for form elements.
    text: String,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    /// Raw markup written through `innerHTML`.
    inner_html: Option<String>,
}

impl NodeData {
    fn new(kind: NodeKind, name: &str, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            name: name.to_string(),
            parent,
            children: Vec::new(),
            text: String::new(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            inner_html: None,
        }
    }
}

/// Arena-backed [`Tree`] implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryTree {
    nodes: Vec<NodeData>,
    location: String,
}

impl MemoryTree {
    /// Create a tree holding only the document node.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            nodes: vec![NodeData::new(NodeKind::Document, "#document", None)],
            location: location.into(),
        }
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append an element with the given tag and attributes.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let mut data = NodeData::new(NodeKind::Element, &tag.to_ascii_uppercase(), Some(parent));
        for (name, value) in attributes {
            data.attributes.insert(name.to_string(), value.to_string());
        }
        self.push(parent, data)
    }

    /// Append a text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let mut data = NodeData::new(NodeKind::Text, "#text", Some(parent));
        data.text = text.to_string();
        self.push(parent, data)
    }

    /// Append a form field (e.g. a `textarea`) whose `value` holds `text`.
    pub fn append_field(&mut self, parent: NodeId, tag: &str, text: &str) -> NodeId {
        let id = self.append_element(parent, tag, &[]);
        self.nodes[id.0].text = text.to_string();
        id
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(data);
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.push(id);
        }
        id
    }

    fn text_content(&self, node: NodeId) -> String {
        let Some(data) = self.nodes.get(node.0) else {
            return String::new();
        };
        match data.kind {
            NodeKind::Text => data.text.clone(),
            _ => data
                .children
                .iter()
                .map(|c| self.text_content(*c))
                .collect(),
        }
    }

    fn serialize(&self, node: NodeId) -> String {
        let Some(data) = self.nodes.get(node.0) else {
            return String::new();
        };
        match data.kind {
            NodeKind::Text => data.text.clone(),
            NodeKind::Element => {
                let tag = data.name.to_ascii_lowercase();
                let mut out = format!("<{}", tag);
                for (name, value) in &data.attributes {
                    out.push_str(&format!(" {}=\"{}\"", name, value));
                }
                if !data.style.is_empty() {
                    let style: Vec<String> =
                        data.style.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                    out.push_str(&format!(" style=\"{}\"", style.join("; ")));
                }
                out.push('>');
                out.push_str(&self.inner_html(node));
                out.push_str(&format!("</{}>", tag));
                out
            }
            _ => self.inner_html(node),
        }
    }

    fn inner_html(&self, node: NodeId) -> String {
        let Some(data) = self.nodes.get(node.0) else {
            return String::new();
        };
        if let Some(raw) = &data.inner_html {
            return raw.clone();
        }
        data.children.iter().map(|c| self.serialize(*c)).collect()
    }

    /// Replace all children of `node` with a single text node.
    fn replace_children_with_text(&mut self, node: NodeId, value: &str) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        self.nodes[node.0].inner_html = None;
        self.append_text(node, value);
    }
}

impl Tree for MemoryTree {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes.get(node.0).map(|d| d.kind).unwrap_or(NodeKind::Other)
    }

    fn node_name(&self, node: NodeId) -> String {
        self.nodes.get(node.0).map(|d| d.name.clone()).unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|d| d.children.clone())
            .unwrap_or_default()
    }

    fn get(&self, node: NodeId, property: &str) -> Option<String> {
        let data = self.nodes.get(node.0)?;

        if let Some(name) = property.strip_prefix("style.") {
            return data.style.get(name).cloned();
        }

        match (data.kind, property) {
            (NodeKind::Text, "value" | "data" | "nodeValue" | "textContent") => {
                Some(data.text.clone())
            }
            (NodeKind::Element, "value") => Some(data.text.clone()),
            (_, "textContent") => Some(self.text_content(node)),
            (_, "innerHTML") => Some(self.inner_html(node)),
            _ => {
                let name = property.strip_prefix("attr.").unwrap_or(property);
                data.attributes.get(name).cloned()
            }
        }
    }

    fn set(&mut self, node: NodeId, property: &str, value: &str) {
        let Some(kind) = self.nodes.get(node.0).map(|d| d.kind) else {
            return;
        };

        if let Some(name) = property.strip_prefix("style.") {
            let style = &mut self.nodes[node.0].style;
            if value.is_empty() {
                style.remove(name);
            } else {
                style.insert(name.to_string(), value.to_string());
            }
            return;
        }

        match (kind, property) {
            (NodeKind::Text, "value" | "data" | "nodeValue" | "textContent")
            | (NodeKind::Element, "value") => {
                self.nodes[node.0].text = value.to_string();
            }
            (_, "textContent") => self.replace_children_with_text(node, value),
            (_, "innerHTML") => {
                let children = std::mem::take(&mut self.nodes[node.0].children);
                for child in children {
                    self.nodes[child.0].parent = None;
                }
                self.nodes[node.0].inner_html = Some(value.to_string());
            }
            _ => {
                let name = property.strip_prefix("attr.").unwrap_or(property);
                let attributes = &mut self.nodes[node.0].attributes;
                if value.is_empty() {
                    attributes.remove(name);
                } else {
                    attributes.insert(name.to_string(), value.to_string());
                }
            }
        }
    }

    fn location(&self) -> String {
        self.location.clone()
    }
}
