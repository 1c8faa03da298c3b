//! The document tree contract commands are applied against.

use serde::{Deserialize, Serialize};

use crate::selector::Selector;

/// Handle of a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Node type, mirroring the DOM node types the compiler cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Element,
    Text,
    Document,
    Other,
}

/// A live, externally owned document tree.
///
/// Properties are addressed by string paths:
/// - `value`, `data`, `textContent`, `innerHTML` for content
/// - `style.<name>` for inline styles
/// - `attr.<name>` or a bare attribute name (`src`, `href`, `class`, ...)
///
/// Missing properties read as `None`; writing an empty string to a style or
/// attribute removes it.
pub trait Tree {
    /// The topmost node (the document).
    fn root(&self) -> NodeId;

    fn kind(&self, node: NodeId) -> NodeKind;

    /// Upper-case tag name for elements, `#text` for text nodes.
    fn node_name(&self, node: NodeId) -> String;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn get(&self, node: NodeId, property: &str) -> Option<String>;

    fn set(&mut self, node: NodeId, property: &str, value: &str);

    /// URL of the page the tree belongs to, including the fragment.
    fn location(&self) -> String;

    /// Walk `n` steps up. `n == 0` returns the node itself.
    fn nth_parent(&self, node: NodeId, n: usize) -> Option<NodeId> {
        let mut current = node;
        for _ in 0..n {
            current = self.parent(current)?;
        }
        Some(current)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node, "class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Whether `node` matches a CSS-like selector.
    fn matches(&self, node: NodeId, selector: &str) -> bool {
        match Selector::parse(selector) {
            Some(sel) => sel.matches(self, node),
            None => false,
        }
    }

    /// First descendant of `scope` (depth-first, document order) matching
    /// `selector`. An empty selector selects `scope` itself.
    fn query_selector(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        if selector.trim().is_empty() {
            return Some(scope);
        }
        let sel = Selector::parse(selector)?;
        let mut stack: Vec<NodeId> = self.children(scope).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if sel.matches(self, node) {
                return Some(node);
            }
            stack.extend(self.children(node).into_iter().rev());
        }
        None
    }
}
