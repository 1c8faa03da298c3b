//! Flowmap connections between two tiers.
//!
//! An edge is a `g.adsFlowMapEdge` naming the tiers it joins in its
//! `data-source` and `data-target` attributes; its line is the first `path`
//! inside it.

use std::fmt;
use std::str::FromStr;

use mnky_tree::{NodeId, Tree, UndoRecord};
use serde::{Deserialize, Serialize};

use super::{is_dom_group, Command, CommandKind};

const EDGE_SELECTOR: &str = "g.adsFlowMapEdge";
const EDGE_LINE: &str = "path";

/// Health a connection is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionHealth {
    Normal,
    Warning,
    Error,
    Unknown,
}

impl ConnectionHealth {
    pub fn color(&self) -> &'static str {
        match self {
            ConnectionHealth::Normal => "#6cb95a",
            ConnectionHealth::Warning => "#f5c342",
            ConnectionHealth::Error => "#e0433c",
            ConnectionHealth::Unknown => "#9b9b9b",
        }
    }
}

impl FromStr for ConnectionHealth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(ConnectionHealth::Normal),
            "warning" => Ok(ConnectionHealth::Warning),
            "error" | "critical" => Ok(ConnectionHealth::Error),
            "unknown" => Ok(ConnectionHealth::Unknown),
            other => Err(format!(
                "`{}` is not a connection health (normal, warning, error, unknown)",
                other
            )),
        }
    }
}

impl fmt::Display for ConnectionHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionHealth::Normal => "normal",
            ConnectionHealth::Warning => "warning",
            ConnectionHealth::Error => "error",
            ConnectionHealth::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Recolour or hide the connection between two tiers.
#[derive(Debug, Clone)]
pub struct ReplaceConnection {
    source: String,
    target: String,
    /// `None` hides the edge.
    health: Option<ConnectionHealth>,
    /// Also match the edge running from `target` to `source`.
    both_directions: bool,
}

impl ReplaceConnection {
    pub fn new(source: &str, target: &str, health: ConnectionHealth) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            health: Some(health),
            both_directions: false,
        }
    }

    pub fn hide(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            health: None,
            both_directions: false,
        }
    }

    pub fn with_both_directions(mut self, both: bool) -> Self {
        self.both_directions = both;
        self
    }

    fn joins(&self, source: &str, target: &str) -> bool {
        (source == self.source && target == self.target)
            || (self.both_directions && source == self.target && target == self.source)
    }
}

impl Command for ReplaceConnection {
    fn kind(&self) -> CommandKind {
        CommandKind::ReplaceConnection
    }

    fn is_applicable_for_group(&self, group: &str) -> bool {
        is_dom_group(group)
    }

    fn apply(&self, tree: &mut dyn Tree, node: NodeId, _key: &str) -> Vec<UndoRecord> {
        if !tree.matches(node, EDGE_SELECTOR) {
            return Vec::new();
        }
        let source = tree.get(node, "data-source").unwrap_or_default();
        let target = tree.get(node, "data-target").unwrap_or_default();
        if !self.joins(&source, &target) {
            return Vec::new();
        }

        let Some(health) = self.health else {
            return UndoRecord::write(tree, node, "style.display", "none")
                .into_iter()
                .collect();
        };
        let Some(line) = tree.query_selector(node, EDGE_LINE) else {
            return Vec::new();
        };
        UndoRecord::write(tree, line, "style.stroke", health.color())
            .into_iter()
            .collect()
    }

    fn describe(&self) -> String {
        match self.health {
            Some(health) => format!("connection {} -> {} as {}", self.source, self.target, health),
            None => format!("hide connection {} -> {}", self.source, self.target),
        }
    }
}
