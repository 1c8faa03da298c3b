//! Minimal CSS selector matching.
//!
//! Supports compound selectors (`tag`, `.class`, `#id`, `[attr]`,
//! `[attr=value]`) joined by the descendant combinator (whitespace).

use crate::node::{NodeKind, NodeId, Tree};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

/// A parsed selector: compounds from outermost to innermost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    compounds: Vec<Compound>,
}

impl Selector {
    /// Parse a selector. Returns `None` for empty or malformed input.
    pub fn parse(text: &str) -> Option<Self> {
        let compounds = text
            .split_whitespace()
            .map(parse_compound)
            .collect::<Option<Vec<_>>>()?;
        if compounds.is_empty() {
            return None;
        }
        Some(Self { compounds })
    }

    pub fn matches<T: Tree + ?Sized>(&self, tree: &T, node: NodeId) -> bool {
        let Some((last, ancestors)) = self.compounds.split_last() else {
            return false;
        };
        if !compound_matches(tree, node, last) {
            return false;
        }

        // Remaining compounds must match ancestors, innermost first
        let mut current = tree.parent(node);
        for compound in ancestors.iter().rev() {
            loop {
                let Some(candidate) = current else {
                    return false;
                };
                current = tree.parent(candidate);
                if compound_matches(tree, candidate, compound) {
                    break;
                }
            }
        }
        true
    }
}

fn parse_compound(text: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = text;

    let tag_end = rest.find(['.', '#', '[']).unwrap_or(rest.len());
    if tag_end > 0 {
        let tag = &rest[..tag_end];
        if tag != "*" {
            compound.tag = Some(tag.to_ascii_uppercase());
        }
    }
    rest = &rest[tag_end..];

    while let Some(marker) = rest.chars().next() {
        rest = &rest[marker.len_utf8()..];
        match marker {
            '.' | '#' => {
                let end = rest.find(['.', '#', '[']).unwrap_or(rest.len());
                let name = &rest[..end];
                if name.is_empty() {
                    return None;
                }
                if marker == '.' {
                    compound.classes.push(name.to_string());
                } else {
                    compound.id = Some(name.to_string());
                }
                rest = &rest[end..];
            }
            '[' => {
                let end = rest.find(']')?;
                let body = &rest[..end];
                let attribute = match body.split_once('=') {
                    Some((name, value)) => (
                        name.trim().to_string(),
                        Some(value.trim().trim_matches(['"', '\'']).to_string()),
                    ),
                    None => (body.trim().to_string(), None),
                };
                compound.attributes.push(attribute);
                rest = &rest[end + 1..];
            }
            _ => return None,
        }
    }

    Some(compound)
}

fn compound_matches<T: Tree + ?Sized>(tree: &T, node: NodeId, compound: &Compound) -> bool {
    if tree.kind(node) != NodeKind::Element {
        return false;
    }
    if let Some(tag) = &compound.tag {
        if !tree.node_name(node).eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if tree.get(node, "id").as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    if !compound.classes.iter().all(|c| tree.has_class(node, c)) {
        return false;
    }
    compound.attributes.iter().all(|(name, expected)| {
        match (tree.get(node, name), expected) {
            (Some(actual), Some(expected)) => &actual == expected,
            (Some(_), None) => true,
            (None, _) => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound() {
        let sel = Selector::parse("div.card.big#main[data-x=\"1\"]").unwrap();
        let c = &sel.compounds[0];
        assert_eq!(c.tag.as_deref(), Some("DIV"));
        assert_eq!(c.classes, vec!["card".to_string(), "big".to_string()]);
        assert_eq!(c.id.as_deref(), Some("main"));
        assert_eq!(c.attributes, vec![("data-x".to_string(), Some("1".to_string()))]);
    }

    #[test]
    fn test_parse_descendant() {
        let sel = Selector::parse("g.container image").unwrap();
        assert_eq!(sel.compounds.len(), 2);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Selector::parse("").is_none());
        assert!(Selector::parse("div.").is_none());
        assert!(Selector::parse("[open").is_none());
    }

    #[test]
    fn test_universal_tag() {
        let sel = Selector::parse("*.x").unwrap();
        assert!(sel.compounds[0].tag.is_none());
    }
}
