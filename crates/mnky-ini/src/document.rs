//! Parsed document tree and parse warnings.

use serde::{Deserialize, Serialize};

/// Private-use code point standing in for an escaped or quoted `=` while a
/// line is split into key and value.
pub const SENTINEL: char = '\u{E03D}';

/// Reverse the sentinel substitution.
pub fn unescape(text: &str) -> String {
    text.replace(SENTINEL, "=")
}

/// Scalar value of a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// The key was present without `=`.
    Flag,
    /// Explicit value (may be empty).
    Text(String),
}

impl Value {
    pub fn is_flag(&self) -> bool {
        matches!(self, Value::Flag)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(t) => Some(t),
            Value::Flag => None,
        }
    }
}

/// A node is either a scalar leaf or a nested section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum Node {
    Leaf(Value),
    Section(ParsedDocument),
}

/// One keyed entry of a document, remembering the source row it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub key: String,
    pub node: Node,
    /// Zero-based source line.
    pub row: usize,
}

/// Ordered tree of entries. Duplicate keys are kept as separate entries;
/// order is the source order and is significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    entries: Vec<Entry>,
}

impl ParsedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a leaf entry.
    pub fn push_leaf(&mut self, key: impl Into<String>, value: Value, row: usize) {
        self.entries.push(Entry {
            key: key.into(),
            node: Node::Leaf(value),
            row,
        });
    }

    /// Return the section at `path`, creating missing levels in place.
    ///
    /// Reopening an existing section appends to it, so the section keeps the
    /// position of its first header.
    pub fn section_mut(&mut self, path: &[String], row: usize) -> &mut ParsedDocument {
        let Some((head, rest)) = path.split_first() else {
            return self;
        };

        let index = match self
            .entries
            .iter()
            .position(|e| &e.key == head && matches!(e.node, Node::Section(_)))
        {
            Some(i) => i,
            None => {
                self.entries.push(Entry {
                    key: head.clone(),
                    node: Node::Section(ParsedDocument::new()),
                    row,
                });
                self.entries.len() - 1
            }
        };

        match &mut self.entries[index].node {
            Node::Section(doc) => doc.section_mut(rest, row),
            // position() only matched sections
            Node::Leaf(_) => unreachable!("section index points at a leaf"),
        }
    }

    /// Depth-first iteration over leaves in document order.
    pub fn leaves(&self) -> Vec<(&str, &Value, usize)> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<(&'a str, &'a Value, usize)>) {
        for entry in &self.entries {
            match &entry.node {
                Node::Leaf(value) => out.push((entry.key.as_str(), value, entry.row)),
                Node::Section(doc) => doc.collect_leaves(out),
            }
        }
    }
}

/// Non-fatal anomaly found while parsing a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "row")]
pub enum ParseWarning {
    /// More than one unescaped `=`; the first one separates key and value.
    #[serde(rename = "MULTIPLE_SEPARATORS")]
    MultipleSeparators(usize),

    /// Unquoted `;` or `#` after the start of a line cut the line short.
    #[serde(rename = "INLINE_COMMENT")]
    InlineComment(usize),

    /// A quoted span was still open at the end of the line.
    #[serde(rename = "UNTERMINATED_QUOTE")]
    UnterminatedQuote(usize),

    /// A line had a value but no key (`=value`).
    #[serde(rename = "EMPTY_KEY")]
    EmptyKey(usize),
}

impl ParseWarning {
    pub fn row(&self) -> usize {
        match self {
            ParseWarning::MultipleSeparators(r)
            | ParseWarning::InlineComment(r)
            | ParseWarning::UnterminatedQuote(r)
            | ParseWarning::EmptyKey(r) => *r,
        }
    }

    /// Machine-readable form, e.g. `MULTIPLE_SEPARATORS:3`.
    pub fn to_code(&self) -> String {
        match self {
            ParseWarning::MultipleSeparators(r) => format!("MULTIPLE_SEPARATORS:{}", r),
            ParseWarning::InlineComment(r) => format!("INLINE_COMMENT:{}", r),
            ParseWarning::UnterminatedQuote(r) => format!("UNTERMINATED_QUOTE:{}", r),
            ParseWarning::EmptyKey(r) => format!("EMPTY_KEY:{}", r),
        }
    }
}

/// Result of parsing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOutput {
    pub document: ParsedDocument,
    #[serde(default)]
    pub warnings: Vec<ParseWarning>,
}
