//! Commands: the reversible mutations a configuration compiles to.
//!
//! Every command exposes an applicability test for a group of targets and an
//! `apply` operation against a [`Tree`] node that returns the undo records
//! of the writes it made. An empty list means nothing changed.

mod dom;
mod group;
mod media;
mod flowmap;
mod search_replace;
mod url;

pub use dom::{Hide, InsertHtml, InsertPosition, OverwriteHtml, Recolor, ReplaceNeighbor, SetStyle, Style};
pub use flowmap::{ConnectionHealth, ReplaceConnection};
pub use group::Group;
pub use media::{DelayLink, RecolorImage, ReplaceImage, ReplaceLink, DELAY_ATTRIBUTE};
pub use search_replace::{Pattern, SearchAndReplace};
pub use url::{BlockUrl, DelayUrl, ReplaceUrl, UrlAction, UrlRequest};

use std::fmt;
use std::sync::Arc;

use globset::Glob;
use mnky_tree::{NodeId, Tree, UndoRecord};
use serde::{Deserialize, Serialize};

use crate::builder::BuildError;

/// Group every command belongs to.
pub const GROUP_ALL: &str = "*";
/// Text and element mutations.
pub const GROUP_TEXT: &str = "text";
/// Outbound request rewriting.
pub const GROUP_AJAX: &str = "ajax";

/// Variant tag of a compiled command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    SearchAndReplace,
    ReplaceNeighbor,
    InsertHtml,
    Style,
    Hide,
    ReplaceImage,
    RecolorImage,
    ReplaceLink,
    DelayLink,
    Recolor,
    ReplaceConnection,
    BlockUrl,
    DelayUrl,
    ReplaceUrl,
    OverwriteHtml,
    Group,
    /// Produced when a line could not be compiled; applies nothing.
    Unknown,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::SearchAndReplace => "search_and_replace",
            CommandKind::ReplaceNeighbor => "replace_neighbor",
            CommandKind::InsertHtml => "insert_html",
            CommandKind::Style => "style",
            CommandKind::Hide => "hide",
            CommandKind::ReplaceImage => "replace_image",
            CommandKind::RecolorImage => "recolor_image",
            CommandKind::ReplaceLink => "replace_link",
            CommandKind::DelayLink => "delay_link",
            CommandKind::Recolor => "recolor",
            CommandKind::ReplaceConnection => "replace_connection",
            CommandKind::BlockUrl => "block_url",
            CommandKind::DelayUrl => "delay_url",
            CommandKind::ReplaceUrl => "replace_url",
            CommandKind::OverwriteHtml => "overwrite_html",
            CommandKind::Group => "group",
            CommandKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled, reversible mutation.
pub trait Command: fmt::Debug + Send + Sync {
    fn kind(&self) -> CommandKind;

    fn is_applicable_for_group(&self, group: &str) -> bool;

    /// Apply to `node`, reading and writing its `key` property where the
    /// command works on text.
    fn apply(&self, tree: &mut dyn Tree, node: NodeId, key: &str) -> Vec<UndoRecord>;

    /// One-line human description.
    fn describe(&self) -> String;

    /// Decide what to do with an outbound request. Only URL commands act.
    fn intercept(&self, _request: &UrlRequest<'_>) -> Option<UrlAction> {
        None
    }

    fn summary(&self) -> CommandSummary {
        CommandSummary {
            kind: self.kind(),
            description: self.describe(),
        }
    }
}

/// Shared handle to a compiled command.
pub type CommandRef = Arc<dyn Command>;

/// Serializable view of a compiled command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSummary {
    pub kind: CommandKind,
    pub description: String,
}

/// The command an uncompilable line turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoOp {
    pub key: String,
    pub error: Option<BuildError>,
}

impl NoOp {
    pub fn new(key: impl Into<String>, error: Option<BuildError>) -> Self {
        Self {
            key: key.into(),
            error,
        }
    }
}

impl Command for NoOp {
    fn kind(&self) -> CommandKind {
        CommandKind::Unknown
    }

    fn is_applicable_for_group(&self, _group: &str) -> bool {
        false
    }

    fn apply(&self, _tree: &mut dyn Tree, _node: NodeId, _key: &str) -> Vec<UndoRecord> {
        Vec::new()
    }

    fn describe(&self) -> String {
        match &self.error {
            Some(e) => format!("unknown `{}`: {}", self.key, e),
            None => format!("unknown `{}`", self.key),
        }
    }
}

/// Extra predicate over `(tree, node, parent)` some commands check before
/// writing.
#[derive(Clone)]
pub struct Condition(Arc<dyn Fn(&dyn Tree, NodeId, NodeId) -> bool + Send + Sync>);

impl Condition {
    pub fn new(f: impl Fn(&dyn Tree, NodeId, NodeId) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn always() -> Self {
        Self::new(|_, _, _| true)
    }

    pub fn check(&self, tree: &dyn Tree, node: NodeId, parent: NodeId) -> bool {
        (self.0)(tree, node, parent)
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::always()
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition(..)")
    }
}

pub(crate) fn is_dom_group(group: &str) -> bool {
    group == GROUP_ALL || group == GROUP_TEXT
}

pub(crate) fn is_ajax_group(group: &str) -> bool {
    group == GROUP_ALL || group == GROUP_AJAX
}

/// An empty filter matches every page.
pub(crate) fn location_matches(tree: &dyn Tree, filter: &str) -> bool {
    filter.is_empty() || tree.location().contains(filter)
}

/// Whether the `key` property of `node` contains `search`.
pub(crate) fn text_contains(tree: &dyn Tree, node: NodeId, key: &str, search: &str) -> bool {
    if search.is_empty() {
        return false;
    }
    tree.get(node, key)
        .map(|text| text.contains(search))
        .unwrap_or(false)
}

/// Patterns with `*` or `?` are globs; anything else must match exactly.
pub(crate) fn wildcard_matches(pattern: &str, text: &str) -> bool {
    if pattern.contains(['*', '?']) {
        if let Ok(glob) = Glob::new(pattern) {
            return glob.compile_matcher().is_match(text);
        }
    }
    pattern == text
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnky_tree::MemoryTree;

    #[test]
    fn test_noop_is_inert() {
        let mut tree = MemoryTree::new("https://example.com/");
        let text = tree.append_text(tree.root(), "Hello");
        let noop = NoOp::new("!nope()", None);
        assert_eq!(noop.kind(), CommandKind::Unknown);
        assert!(!noop.is_applicable_for_group(GROUP_ALL));
        assert!(noop.apply(&mut tree, text, "value").is_empty());
    }

    #[test]
    fn test_wildcard_matches() {
        assert!(wildcard_matches("*/logo.png", "https://cdn.example.com/img/logo.png"));
        assert!(wildcard_matches("logo.png", "logo.png"));
        assert!(!wildcard_matches("logo.png", "https://cdn.example.com/logo.png"));
    }

    #[test]
    fn test_groups() {
        assert!(is_dom_group("*"));
        assert!(is_dom_group("text"));
        assert!(!is_dom_group("ajax"));
        assert!(is_ajax_group("ajax"));
    }

    #[test]
    fn test_condition_debug() {
        assert_eq!(format!("{:?}", Condition::always()), "Condition(..)");
    }
}
