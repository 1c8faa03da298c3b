use mnky_tree::{NodeId, Tree, UndoRecord};

use super::{Command, CommandKind, CommandRef, UrlAction, UrlRequest};

/// Several commands behind one configuration line.
///
/// Used by namespace vocabularies where one semantic target ("hide this
/// application") has several concrete shapes in the page.
#[derive(Debug, Clone, Default)]
pub struct Group {
    children: Vec<CommandRef>,
}

impl Group {
    pub fn new(children: Vec<CommandRef>) -> Self {
        Self { children }
    }

    pub fn children(&self) -> &[CommandRef] {
        &self.children
    }
}

impl Command for Group {
    fn kind(&self) -> CommandKind {
        CommandKind::Group
    }

    fn is_applicable_for_group(&self, group: &str) -> bool {
        self.children.iter().any(|c| c.is_applicable_for_group(group))
    }

    fn apply(&self, tree: &mut dyn Tree, node: NodeId, key: &str) -> Vec<UndoRecord> {
        self.children
            .iter()
            .flat_map(|c| c.apply(tree, node, key))
            .collect()
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.children.iter().map(|c| c.describe()).collect();
        format!("group [{}]", parts.join("; "))
    }

    fn intercept(&self, request: &UrlRequest<'_>) -> Option<UrlAction> {
        self.children.iter().find_map(|c| c.intercept(request))
    }
}
