//! Element-level commands: styling, hiding, neighbour and HTML rewrites.

use mnky_tree::{NodeId, NodeKind, Tree, UndoRecord};
use serde::{Deserialize, Serialize};

use super::{is_dom_group, location_matches, text_contains, Command, CommandKind, Condition};

/// Set an inline style on an ancestor of every node containing `search`.
#[derive(Debug, Clone)]
pub struct Style {
    search: String,
    property: String,
    nth_parent: usize,
    value: String,
}

impl Style {
    pub fn new(search: &str, property: &str, nth_parent: usize, value: &str) -> Self {
        Self {
            search: search.to_string(),
            property: property.to_string(),
            nth_parent,
            value: value.to_string(),
        }
    }
}

impl Command for Style {
    fn kind(&self) -> CommandKind {
        CommandKind::Style
    }

    fn is_applicable_for_group(&self, group: &str) -> bool {
        is_dom_group(group)
    }

    fn apply(&self, tree: &mut dyn Tree, node: NodeId, key: &str) -> Vec<UndoRecord> {
        if self.property.is_empty() || !text_contains(tree, node, key, &self.search) {
            return Vec::new();
        }
        let Some(target) = tree.nth_parent(node, self.nth_parent) else {
            return Vec::new();
        };
        let property = format!("style.{}", self.property);
        UndoRecord::write(tree, target, &property, &self.value)
            .into_iter()
            .collect()
    }

    fn describe(&self) -> String {
        format!(
            "style {}={} on parent {} of \"{}\"",
            self.property, self.value, self.nth_parent, self.search
        )
    }
}

/// Hide an ancestor of every node containing `search`.
#[derive(Debug, Clone)]
pub struct Hide {
    search: String,
    nth_parent: usize,
    /// The ancestor must carry this class.
    css_class: String,
    /// The ancestor must match this selector.
    parent_selector: String,
    /// Only on pages whose location contains this text.
    page_filter: String,
    condition: Condition,
}

impl Hide {
    pub fn new(
        search: &str,
        nth_parent: usize,
        css_class: &str,
        parent_selector: &str,
        page_filter: &str,
    ) -> Self {
        Self {
            search: search.to_string(),
            nth_parent,
            css_class: css_class.to_string(),
            parent_selector: parent_selector.to_string(),
            page_filter: page_filter.to_string(),
            condition: Condition::always(),
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }
}

impl Command for Hide {
    fn kind(&self) -> CommandKind {
        CommandKind::Hide
    }

    fn is_applicable_for_group(&self, group: &str) -> bool {
        is_dom_group(group)
    }

    fn apply(&self, tree: &mut dyn Tree, node: NodeId, key: &str) -> Vec<UndoRecord> {
        if !location_matches(tree, &self.page_filter) || !text_contains(tree, node, key, &self.search) {
            return Vec::new();
        }
        let Some(parent) = tree.nth_parent(node, self.nth_parent) else {
            return Vec::new();
        };
        if !self.css_class.is_empty() && !tree.has_class(parent, &self.css_class) {
            return Vec::new();
        }
        if !self.parent_selector.is_empty() && !tree.matches(parent, &self.parent_selector) {
            return Vec::new();
        }
        if !self.condition.check(tree, node, parent) {
            return Vec::new();
        }
        UndoRecord::write(tree, parent, "style.display", "none")
            .into_iter()
            .collect()
    }

    fn describe(&self) -> String {
        let mut out = format!("hide parent {} of \"{}\"", self.nth_parent, self.search);
        if !self.css_class.is_empty() {
            out.push_str(&format!(" with class {}", self.css_class));
        }
        if !self.page_filter.is_empty() {
            out.push_str(&format!(" on {}", self.page_filter));
        }
        out
    }
}

/// Replace the content of a nearby element, found by walking up from a node
/// containing `search` and then selecting downwards.
#[derive(Debug, Clone)]
pub struct ReplaceNeighbor {
    search: String,
    replace: String,
    nth_parent: usize,
    selector: String,
    location_filter: String,
    /// Property written on the neighbour.
    property: String,
}

impl ReplaceNeighbor {
    pub fn new(search: &str, replace: &str, nth_parent: usize, selector: &str, location_filter: &str) -> Self {
        Self {
            search: search.to_string(),
            replace: replace.to_string(),
            nth_parent,
            selector: selector.to_string(),
            location_filter: location_filter.to_string(),
            property: "textContent".to_string(),
        }
    }

    pub fn with_property(mut self, property: &str) -> Self {
        self.property = property.to_string();
        self
    }
}

impl Command for ReplaceNeighbor {
    fn kind(&self) -> CommandKind {
        CommandKind::ReplaceNeighbor
    }

    fn is_applicable_for_group(&self, group: &str) -> bool {
        is_dom_group(group)
    }

    fn apply(&self, tree: &mut dyn Tree, node: NodeId, key: &str) -> Vec<UndoRecord> {
        if !location_matches(tree, &self.location_filter) || !text_contains(tree, node, key, &self.search) {
            return Vec::new();
        }
        let neighbor = tree
            .nth_parent(node, self.nth_parent)
            .and_then(|parent| tree.query_selector(parent, &self.selector));
        let Some(neighbor) = neighbor else {
            return Vec::new();
        };
        UndoRecord::write(tree, neighbor, &self.property, &self.replace)
            .into_iter()
            .collect()
    }

    fn describe(&self) -> String {
        format!(
            "set {} of `{}` near \"{}\" to \"{}\"",
            self.property, self.selector, self.search, self.replace
        )
    }
}

/// Where [`InsertHtml`] puts its markup, named after `insertAdjacentHTML`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    AfterBegin,
    BeforeEnd,
}

/// Insert markup inside an element near a node containing `search`.
#[derive(Debug, Clone)]
pub struct InsertHtml {
    position: InsertPosition,
    search: String,
    html: String,
    nth_parent: usize,
    selector: String,
}

impl InsertHtml {
    pub fn new(position: InsertPosition, search: &str, html: &str, nth_parent: usize, selector: &str) -> Self {
        Self {
            position,
            search: search.to_string(),
            html: html.to_string(),
            nth_parent,
            selector: selector.to_string(),
        }
    }
}

impl Command for InsertHtml {
    fn kind(&self) -> CommandKind {
        CommandKind::InsertHtml
    }

    fn is_applicable_for_group(&self, group: &str) -> bool {
        is_dom_group(group)
    }

    fn apply(&self, tree: &mut dyn Tree, node: NodeId, key: &str) -> Vec<UndoRecord> {
        if self.html.is_empty() || !text_contains(tree, node, key, &self.search) {
            return Vec::new();
        }
        let target = tree
            .nth_parent(node, self.nth_parent)
            .and_then(|parent| tree.query_selector(parent, &self.selector));
        let Some(target) = target else {
            return Vec::new();
        };

        let current = tree.get(target, "innerHTML").unwrap_or_default();
        // Re-applying must not stack copies
        let already = match self.position {
            InsertPosition::AfterBegin => current.starts_with(&self.html),
            InsertPosition::BeforeEnd => current.ends_with(&self.html),
        };
        if already {
            return Vec::new();
        }
        let updated = match self.position {
            InsertPosition::AfterBegin => format!("{}{}", self.html, current),
            InsertPosition::BeforeEnd => format!("{}{}", current, self.html),
        };
        UndoRecord::write(tree, target, "innerHTML", &updated)
            .into_iter()
            .collect()
    }

    fn describe(&self) -> String {
        let position = match self.position {
            InsertPosition::AfterBegin => "before",
            InsertPosition::BeforeEnd => "after",
        };
        format!("insert html {} content near \"{}\"", position, self.search)
    }
}

/// Overwrite the markup of an element of the whole document.
#[derive(Debug, Clone)]
pub struct OverwriteHtml {
    page_filter: String,
    /// Empty selects the document itself.
    selector: String,
    html: String,
    condition: Condition,
}

impl OverwriteHtml {
    pub fn new(page_filter: &str, selector: &str, html: &str) -> Self {
        Self {
            page_filter: page_filter.to_string(),
            selector: selector.to_string(),
            html: html.to_string(),
            condition: Condition::always(),
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }
}

impl Command for OverwriteHtml {
    fn kind(&self) -> CommandKind {
        CommandKind::OverwriteHtml
    }

    fn is_applicable_for_group(&self, group: &str) -> bool {
        is_dom_group(group)
    }

    fn apply(&self, tree: &mut dyn Tree, _node: NodeId, _key: &str) -> Vec<UndoRecord> {
        if !location_matches(tree, &self.page_filter) {
            return Vec::new();
        }
        let root = tree.root();
        let Some(target) = tree.query_selector(root, &self.selector) else {
            return Vec::new();
        };
        if !self.condition.check(tree, root, target) {
            return Vec::new();
        }
        UndoRecord::write(tree, target, "innerHTML", &self.html)
            .into_iter()
            .collect()
    }

    fn describe(&self) -> String {
        let target = if self.selector.is_empty() {
            "page"
        } else {
            self.selector.as_str()
        };
        format!("overwrite {} on {}", target, self.page_filter)
    }
}

/// Set an inline style on an element of the whole document.
#[derive(Debug, Clone)]
pub struct SetStyle {
    page_filter: String,
    selector: String,
    property: String,
    value: String,
    condition: Condition,
}

impl SetStyle {
    pub fn new(page_filter: &str, selector: &str, property: &str, value: &str) -> Self {
        Self {
            page_filter: page_filter.to_string(),
            selector: selector.to_string(),
            property: property.to_string(),
            value: value.to_string(),
            condition: Condition::always(),
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }
}

impl Command for SetStyle {
    fn kind(&self) -> CommandKind {
        CommandKind::Style
    }

    fn is_applicable_for_group(&self, group: &str) -> bool {
        is_dom_group(group)
    }

    fn apply(&self, tree: &mut dyn Tree, _node: NodeId, _key: &str) -> Vec<UndoRecord> {
        if self.property.is_empty() || !location_matches(tree, &self.page_filter) {
            return Vec::new();
        }
        let root = tree.root();
        let Some(target) = tree.query_selector(root, &self.selector) else {
            return Vec::new();
        };
        if !self.condition.check(tree, root, target) {
            return Vec::new();
        }
        let property = format!("style.{}", self.property);
        UndoRecord::write(tree, target, &property, &self.value)
            .into_iter()
            .collect()
    }

    fn describe(&self) -> String {
        format!("style {}={} on `{}`", self.property, self.value, self.selector)
    }
}

/// Colour-carrying properties [`Recolor`] looks at. SVG shapes carry
/// `fill` and `stroke` as attributes as well as styles.
const COLOR_PROPERTIES: [&str; 7] = [
    "style.color",
    "style.background-color",
    "style.border-color",
    "style.fill",
    "style.stroke",
    "fill",
    "stroke",
];

/// Swap one colour for another on every element that uses it.
#[derive(Debug, Clone)]
pub struct Recolor {
    from: String,
    to: String,
    page_filter: String,
    condition: Condition,
}

impl Recolor {
    /// Returns `None` unless both colours are `#rgb` or `#rrggbb`.
    pub fn new(from: &str, to: &str, page_filter: &str) -> Option<Self> {
        Some(Self {
            from: normalize_color(from)?,
            to: normalize_color(to)?,
            page_filter: page_filter.to_string(),
            condition: Condition::always(),
        })
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }
}

/// Lower-case `#rrggbb`.
fn normalize_color(color: &str) -> Option<String> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    Some(format!("#{}", expanded.to_ascii_lowercase()))
}

impl Command for Recolor {
    fn kind(&self) -> CommandKind {
        CommandKind::Recolor
    }

    fn is_applicable_for_group(&self, group: &str) -> bool {
        is_dom_group(group)
    }

    fn apply(&self, tree: &mut dyn Tree, node: NodeId, _key: &str) -> Vec<UndoRecord> {
        if tree.kind(node) != NodeKind::Element || !location_matches(tree, &self.page_filter) {
            return Vec::new();
        }
        if !self.condition.check(tree, node, node) {
            return Vec::new();
        }
        let mut undo = Vec::new();
        for property in COLOR_PROPERTIES {
            let uses_color = tree
                .get(node, property)
                .and_then(|current| normalize_color(&current))
                .map(|current| current == self.from)
                .unwrap_or(false);
            if uses_color {
                undo.extend(UndoRecord::write(tree, node, property, &self.to));
            }
        }
        undo
    }

    fn describe(&self) -> String {
        format!("recolor {} to {}", self.from, self.to)
    }
}
