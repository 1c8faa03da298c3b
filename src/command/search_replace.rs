//! Text search and replace.

use mnky_tree::{NodeId, Tree, UndoRecord};
use regex_lite::{Captures, Regex};

use super::{is_dom_group, location_matches, Command, CommandKind};

/// What a [`SearchAndReplace`] looks for.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Exact substring; every occurrence is replaced.
    Literal(String),
    Regex {
        regex: Regex,
        /// Replace every match rather than only the first.
        global: bool,
        /// Upper- or lower-case the replacement to follow each match.
        preserve_case: bool,
    },
}

impl Pattern {
    pub fn replace(&self, text: &str, replacement: &str) -> String {
        match self {
            Pattern::Literal(search) => {
                if search.is_empty() {
                    text.to_string()
                } else {
                    text.replace(search.as_str(), replacement)
                }
            }
            Pattern::Regex {
                regex,
                global,
                preserve_case,
            } => {
                let limit = if *global { 0 } else { 1 };
                regex
                    .replacen(text, limit, |caps: &Captures<'_>| {
                        expand(caps, replacement, *preserve_case)
                    })
                    .into_owned()
            }
        }
    }

    fn source(&self) -> String {
        match self {
            Pattern::Literal(s) => format!("\"{}\"", s),
            Pattern::Regex { regex, .. } => format!("/{}/", regex.as_str()),
        }
    }
}

/// Case the replacement after the matched text: all upper gives upper, all
/// lower gives lower, anything else is left as written.
fn case_like(matched: &str, replacement: &str) -> String {
    let mut out = replacement.to_string();
    if matched.to_uppercase() == matched {
        out = out.to_uppercase();
    }
    if matched.to_lowercase() == matched {
        out = out.to_lowercase();
    }
    out
}

/// Expand a replacement template for one match.
///
/// `$$` is a dollar, `$&` and `$0` the whole match, `$1`..`$99` and `${n}`/`${name}`
/// a capture group. A reference to a group the pattern does not have is
/// kept as written. With `preserve_case` only the literal text is re-cased,
/// never the inserted groups.
fn expand(caps: &Captures<'_>, replacement: &str, preserve_case: bool) -> String {
    let matched = caps.get(0).map(|m| m.as_str()).unwrap_or("");
    let mut out = String::with_capacity(replacement.len());
    let mut literal = String::new();
    let mut rest = replacement;

    while let Some(at) = rest.find('$') {
        literal.push_str(&rest[..at]);
        let after = &rest[at + 1..];
        let (inserted, consumed) = match reference(caps, after) {
            Some(found) => found,
            None => {
                literal.push('$');
                rest = after;
                continue;
            }
        };
        flush(&mut out, &mut literal, matched, preserve_case);
        out.push_str(&inserted);
        rest = &after[consumed..];
    }
    literal.push_str(rest);
    flush(&mut out, &mut literal, matched, preserve_case);
    out
}

fn flush(out: &mut String, literal: &mut String, matched: &str, preserve_case: bool) {
    if preserve_case {
        out.push_str(&case_like(matched, literal));
    } else {
        out.push_str(literal);
    }
    literal.clear();
}

/// Resolve the reference following a `$`: the text it expands to and the
/// number of bytes it spans.
fn reference(caps: &Captures<'_>, after: &str) -> Option<(String, usize)> {
    let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();

    if after.starts_with('$') {
        return Some(("$".to_string(), 1));
    }
    if after.starts_with('&') {
        return Some((group(0), 1));
    }
    if let Some(inner) = after.strip_prefix('{') {
        let end = inner.find('}')?;
        let name = &inner[..end];
        let text = match name.parse::<usize>() {
            Ok(i) if i < caps.len() => group(i),
            Ok(_) => return None,
            Err(_) => caps.name(name)?.as_str().to_string(),
        };
        return Some((text, end + 2));
    }

    let digits: String = after.chars().take(2).take_while(char::is_ascii_digit).collect();
    for len in (1..=digits.len()).rev() {
        if let Ok(i) = digits[..len].parse::<usize>() {
            if i < caps.len() {
                return Some((group(i), len));
            }
        }
    }
    None
}

/// Replace text in the target property of a node.
#[derive(Debug, Clone)]
pub struct SearchAndReplace {
    pattern: Pattern,
    replacement: String,
    /// Only on pages whose location contains this text.
    location_filter: String,
    /// Only when the node's parent matches this selector.
    css_filter: String,
}

impl SearchAndReplace {
    pub fn new(pattern: Pattern, replacement: impl Into<String>) -> Self {
        Self {
            pattern,
            replacement: replacement.into(),
            location_filter: String::new(),
            css_filter: String::new(),
        }
    }

    pub fn literal(search: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::new(Pattern::Literal(search.into()), replacement)
    }

    pub fn with_filters(mut self, location_filter: &str, css_filter: &str) -> Self {
        self.location_filter = location_filter.to_string();
        self.css_filter = css_filter.to_string();
        self
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The transformed text, without touching any tree.
    pub fn replace_text(&self, text: &str) -> String {
        self.pattern.replace(text, &self.replacement)
    }
}

impl Command for SearchAndReplace {
    fn kind(&self) -> CommandKind {
        CommandKind::SearchAndReplace
    }

    fn is_applicable_for_group(&self, group: &str) -> bool {
        is_dom_group(group)
    }

    fn apply(&self, tree: &mut dyn Tree, node: NodeId, key: &str) -> Vec<UndoRecord> {
        if !location_matches(tree, &self.location_filter) {
            return Vec::new();
        }
        if !self.css_filter.is_empty() {
            let parent_matches = tree
                .parent(node)
                .map(|p| tree.matches(p, &self.css_filter))
                .unwrap_or(false);
            if !parent_matches {
                return Vec::new();
            }
        }

        let Some(current) = tree.get(node, key) else {
            return Vec::new();
        };
        let replaced = self.replace_text(&current);
        UndoRecord::write(tree, node, key, &replaced)
            .into_iter()
            .collect()
    }

    fn describe(&self) -> String {
        format!("replace {} with \"{}\"", self.pattern.source(), self.replacement)
    }
}
