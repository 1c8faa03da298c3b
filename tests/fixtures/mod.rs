//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use mnky::{Configuration, MemoryTree, NodeId, Repository, Tree};

/// Directory holding the sample configuration repository.
pub fn repo_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/repo")
}

pub fn repository() -> Repository {
    Repository::from_dir(&repo_path()).expect("fixture repository loads")
}

/// A document with one text node under `<body>`.
pub fn text_tree(location: &str, text: &str) -> (MemoryTree, NodeId) {
    let mut tree = MemoryTree::new(location);
    let body = tree.append_element(tree.root(), "body", &[]);
    let node = tree.append_text(body, text);
    (tree, node)
}

/// Compile `text` standalone and apply it to a single text node.
pub fn apply_text(config: &Configuration<'_>, text: &str) -> String {
    let (mut tree, node) = text_tree("https://example.com/", text);
    config.apply_default(&mut tree, node).expect("configuration compiles");
    tree.get(node, "value").unwrap_or_default()
}
