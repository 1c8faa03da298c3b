//! Image and link commands.

use mnky_tree::{NodeId, Tree, UndoRecord};

use super::{is_dom_group, wildcard_matches, Command, CommandKind};

fn is_tag(tree: &dyn Tree, node: NodeId, tag: &str) -> bool {
    tree.node_name(node).eq_ignore_ascii_case(tag)
}

/// Write `property` when its current value matches `search`.
fn rewrite_matching(
    tree: &mut dyn Tree,
    node: NodeId,
    property: &str,
    search: &str,
    value: &str,
) -> Vec<UndoRecord> {
    match tree.get(node, property) {
        Some(current) if wildcard_matches(search, &current) => {
            UndoRecord::write(tree, node, property, value).into_iter().collect()
        }
        _ => Vec::new(),
    }
}

/// Swap the `src` of matching images.
#[derive(Debug, Clone)]
pub struct ReplaceImage {
    search: String,
    replace: String,
}

impl ReplaceImage {
    pub fn new(search: &str, replace: &str) -> Self {
        Self {
            search: search.to_string(),
            replace: replace.to_string(),
        }
    }
}

impl Command for ReplaceImage {
    fn kind(&self) -> CommandKind {
        CommandKind::ReplaceImage
    }

    fn is_applicable_for_group(&self, group: &str) -> bool {
        is_dom_group(group)
    }

    fn apply(&self, tree: &mut dyn Tree, node: NodeId, _key: &str) -> Vec<UndoRecord> {
        if !is_tag(tree, node, "img") {
            return Vec::new();
        }
        rewrite_matching(tree, node, "src", &self.search, &self.replace)
    }

    fn describe(&self) -> String {
        format!("replace image {} with {}", self.search, self.replace)
    }
}

/// Tint matching images towards a colour with a CSS filter.
#[derive(Debug, Clone)]
pub struct RecolorImage {
    search: String,
    color: String,
    filter: String,
}

impl RecolorImage {
    /// Returns `None` when `color` is not a `#rgb` or `#rrggbb` colour.
    pub fn new(search: &str, color: &str) -> Option<Self> {
        let hue = hue_of(color)?;
        Some(Self {
            search: search.to_string(),
            color: color.to_string(),
            filter: format!("sepia(1) saturate(5) hue-rotate({}deg)", hue.round() as i64),
        })
    }
}

/// Hue in degrees of a hex colour.
pub(crate) fn hue_of(color: &str) -> Option<f64> {
    let hex = color.trim().strip_prefix('#')?;
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| {
        expanded
            .get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .map(|v| f64::from(v) / 255.0)
    };
    let (r, g, b) = (channel(0)?, channel(2)?, channel(4)?);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    if delta == 0.0 {
        return Some(0.0);
    }
    let hue = if max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    Some(if hue < 0.0 { hue + 360.0 } else { hue })
}

impl Command for RecolorImage {
    fn kind(&self) -> CommandKind {
        CommandKind::RecolorImage
    }

    fn is_applicable_for_group(&self, group: &str) -> bool {
        is_dom_group(group)
    }

    fn apply(&self, tree: &mut dyn Tree, node: NodeId, _key: &str) -> Vec<UndoRecord> {
        if !is_tag(tree, node, "img") {
            return Vec::new();
        }
        match tree.get(node, "src") {
            Some(src) if wildcard_matches(&self.search, &src) => {
                UndoRecord::write(tree, node, "style.filter", &self.filter)
                    .into_iter()
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    fn describe(&self) -> String {
        format!("recolor image {} to {}", self.search, self.color)
    }
}

/// Point matching links somewhere else.
#[derive(Debug, Clone)]
pub struct ReplaceLink {
    search: String,
    replace: String,
}

impl ReplaceLink {
    pub fn new(search: &str, replace: &str) -> Self {
        Self {
            search: search.to_string(),
            replace: replace.to_string(),
        }
    }
}

impl Command for ReplaceLink {
    fn kind(&self) -> CommandKind {
        CommandKind::ReplaceLink
    }

    fn is_applicable_for_group(&self, group: &str) -> bool {
        is_dom_group(group)
    }

    fn apply(&self, tree: &mut dyn Tree, node: NodeId, _key: &str) -> Vec<UndoRecord> {
        if !is_tag(tree, node, "a") {
            return Vec::new();
        }
        rewrite_matching(tree, node, "href", &self.search, &self.replace)
    }

    fn describe(&self) -> String {
        format!("replace link {} with {}", self.search, self.replace)
    }
}

/// Attribute a host reads to hold back navigation through a link.
pub const DELAY_ATTRIBUTE: &str = "data-delay";

/// Mark matching links so following them is held back for a while. A link
/// matches on its `href` or on the text it shows.
#[derive(Debug, Clone)]
pub struct DelayLink {
    search: String,
    milliseconds: u64,
}

impl DelayLink {
    pub fn new(search: &str, milliseconds: u64) -> Self {
        Self {
            search: search.to_string(),
            milliseconds,
        }
    }
}

impl Command for DelayLink {
    fn kind(&self) -> CommandKind {
        CommandKind::DelayLink
    }

    fn is_applicable_for_group(&self, group: &str) -> bool {
        is_dom_group(group)
    }

    fn apply(&self, tree: &mut dyn Tree, node: NodeId, _key: &str) -> Vec<UndoRecord> {
        if !is_tag(tree, node, "a") {
            return Vec::new();
        }
        let by_href = tree
            .get(node, "href")
            .map(|href| wildcard_matches(&self.search, &href))
            .unwrap_or(false);
        let by_text = tree
            .get(node, "textContent")
            .map(|text| text.trim() == self.search)
            .unwrap_or(false);
        if !by_href && !by_text {
            return Vec::new();
        }
        UndoRecord::write(tree, node, DELAY_ATTRIBUTE, &self.milliseconds.to_string())
            .into_iter()
            .collect()
    }

    fn describe(&self) -> String {
        format!("delay link {} by {}ms", self.search, self.milliseconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnky_tree::MemoryTree;

    #[test]
    fn test_replace_image_glob() {
        let mut tree = MemoryTree::new("https://example.com/");
        let img = tree.append_element(tree.root(), "img", &[("src", "https://cdn.example.com/logo.png")]);
        let cmd = ReplaceImage::new("*/logo.png", "https://acme.test/acme.png");
        let undo = cmd.apply(&mut tree, img, "value");
        assert_eq!(undo.len(), 1);
        assert_eq!(tree.get(img, "src").as_deref(), Some("https://acme.test/acme.png"));
        assert_eq!(undo[0].original_value, "https://cdn.example.com/logo.png");
    }

    #[test]
    fn test_replace_image_ignores_other_tags() {
        let mut tree = MemoryTree::new("https://example.com/");
        let div = tree.append_element(tree.root(), "div", &[("src", "logo.png")]);
        assert!(ReplaceImage::new("logo.png", "x.png").apply(&mut tree, div, "value").is_empty());
    }

    #[test]
    fn test_hue_of() {
        assert_eq!(hue_of("#ff0000"), Some(0.0));
        assert_eq!(hue_of("#00ff00").map(f64::round), Some(120.0));
        assert_eq!(hue_of("#00f").map(f64::round), Some(240.0));
        assert_eq!(hue_of("#777777"), Some(0.0));
        assert_eq!(hue_of("blue"), None);
        assert_eq!(hue_of("#12345"), None);
    }

    #[test]
    fn test_recolor_image() {
        let mut tree = MemoryTree::new("https://example.com/");
        let img = tree.append_element(tree.root(), "img", &[("src", "logo.png")]);
        let cmd = RecolorImage::new("logo.png", "#00ff00").unwrap();
        assert_eq!(cmd.apply(&mut tree, img, "value").len(), 1);
        assert_eq!(
            tree.get(img, "style.filter").as_deref(),
            Some("sepia(1) saturate(5) hue-rotate(120deg)")
        );
    }

    #[test]
    fn test_replace_link() {
        let mut tree = MemoryTree::new("https://example.com/");
        let a = tree.append_element(tree.root(), "a", &[("href", "https://example.com/help")]);
        let cmd = ReplaceLink::new("https://example.com/help", "https://acme.test/support");
        assert_eq!(cmd.apply(&mut tree, a, "value").len(), 1);
        assert_eq!(tree.get(a, "href").as_deref(), Some("https://acme.test/support"));
    }

    #[test]
    fn test_delay_link_by_href_or_text() {
        let mut tree = MemoryTree::new("https://example.com/");
        let root = tree.root();
        let by_href = tree.append_element(root, "a", &[("href", "https://example.com/#/troubleshoot")]);
        let by_text = tree.append_element(root, "a", &[("href", "#")]);
        tree.append_text(by_text, " Troubleshoot ");
        let other = tree.append_element(root, "a", &[("href", "https://example.com/#/home")]);

        let cmd = DelayLink::new("*troubleshoot", 3000);
        assert_eq!(cmd.apply(&mut tree, by_href, "value").len(), 1);
        assert_eq!(tree.get(by_href, DELAY_ATTRIBUTE).as_deref(), Some("3000"));
        assert!(cmd.apply(&mut tree, other, "value").is_empty());

        let cmd = DelayLink::new("Troubleshoot", 500);
        assert_eq!(cmd.apply(&mut tree, by_text, "value").len(), 1);
        assert_eq!(tree.get(other, DELAY_ATTRIBUTE), None);
    }
}
