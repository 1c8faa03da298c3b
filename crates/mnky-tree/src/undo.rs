//! Undo records produced by commands.

use serde::{Deserialize, Serialize};

use crate::node::{NodeId, Tree};

/// Everything needed to reverse one atomic property write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoRecord {
    /// The node that was written.
    pub target: NodeId,

    /// Property path, e.g. `value` or `style.display`.
    pub property: String,

    /// Value before the write (empty if the property was absent).
    pub original_value: String,

    /// Value written by the command.
    pub new_value: String,
}

impl UndoRecord {
    pub fn new(
        target: NodeId,
        property: impl Into<String>,
        original_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            target,
            property: property.into(),
            original_value: original_value.into(),
            new_value: new_value.into(),
        }
    }

    /// Write `value` to `property` of `node`, recording the change.
    ///
    /// Returns `None` when the property already holds `value`; nothing is
    /// written in that case.
    pub fn write(tree: &mut dyn Tree, node: NodeId, property: &str, value: &str) -> Option<Self> {
        let original = tree.get(node, property).unwrap_or_default();
        if original == value {
            return None;
        }
        tree.set(node, property, value);
        Some(Self::new(node, property, original, value))
    }

    /// Restore the original value if the property still holds the value this
    /// record wrote. Returns whether anything was restored.
    pub fn undo(&self, tree: &mut dyn Tree) -> bool {
        let current = tree.get(self.target, &self.property).unwrap_or_default();
        if current != self.new_value {
            return false;
        }
        tree.set(self.target, &self.property, &self.original_value);
        true
    }
}

/// Undo a list of records, newest first. Returns how many were restored.
pub fn undo_all(records: &[UndoRecord], tree: &mut dyn Tree) -> usize {
    records.iter().rev().filter(|r| r.undo(tree)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTree;

    #[test]
    fn test_write_and_undo() {
        let mut tree = MemoryTree::new("https://example.com/");
        let body = tree.root();
        let text = tree.append_text(body, "Hello");

        let record = UndoRecord::write(&mut tree, text, "data", "Hi").unwrap();
        assert_eq!(record.original_value, "Hello");
        assert_eq!(tree.get(text, "data").as_deref(), Some("Hi"));

        assert!(record.undo(&mut tree));
        assert_eq!(tree.get(text, "data").as_deref(), Some("Hello"));
    }

    #[test]
    fn test_write_unchanged_returns_none() {
        let mut tree = MemoryTree::new("https://example.com/");
        let text = tree.append_text(tree.root(), "same");
        assert!(UndoRecord::write(&mut tree, text, "data", "same").is_none());
    }

    #[test]
    fn test_undo_skips_overwritten_value() {
        let mut tree = MemoryTree::new("https://example.com/");
        let text = tree.append_text(tree.root(), "a");
        let record = UndoRecord::write(&mut tree, text, "data", "b").unwrap();
        tree.set(text, "data", "c");
        assert!(!record.undo(&mut tree));
        assert_eq!(tree.get(text, "data").as_deref(), Some("c"));
    }

    #[test]
    fn test_undo_all_newest_first() {
        let mut tree = MemoryTree::new("https://example.com/");
        let text = tree.append_text(tree.root(), "a");
        let first = UndoRecord::write(&mut tree, text, "data", "b").unwrap();
        let second = UndoRecord::write(&mut tree, text, "data", "c").unwrap();
        assert_eq!(undo_all(&[first, second], &mut tree), 2);
        assert_eq!(tree.get(text, "data").as_deref(), Some("a"));
    }
}
