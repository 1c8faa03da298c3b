//! Configuration text parser.
//!
//! Parses line-oriented `key = value` text into an ordered [`ParsedDocument`].
//! Handles the language's lexical conventions:
//! - `;` and `#` start a comment, unless quoted or escaped with `\`
//! - `\=` and `=` inside a quoted key or value do not separate key and value
//! - `[a.b]` opens a (nested) section
//! - A line without `=` is a presence flag

use crate::document::{ParseOutput, ParseWarning, Value, SENTINEL};
use crate::template::TemplateOptions;

/// Characters opening an inline comment outside quotes.
const COMMENT_CHARS: &[char] = &[';', '#'];

/// Characters that may wrap a whole key or value.
const QUOTE_CHARS: &[char] = &['"', '\''];

/// A physical line after comment stripping and separator detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ScannedLine {
    key: String,
    value: Option<String>,
    extra_separators: usize,
    inline_comment: bool,
    unterminated_quote: bool,
}

/// Parse configuration text into a document plus per-line warnings.
///
/// Parsing never fails: malformed lines are skipped or taken literally and
/// reported through [`ParseOutput::warnings`].
pub fn parse(text: &str, template: &TemplateOptions) -> ParseOutput {
    let mut output = ParseOutput::default();
    let mut section: Vec<String> = Vec::new();

    for (row, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();

        // Blank lines and whole-line comments
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_CHARS) {
            continue;
        }

        let scanned = scan_line(trimmed);

        if scanned.inline_comment {
            output.warnings.push(ParseWarning::InlineComment(row));
        }
        if scanned.unterminated_quote {
            output.warnings.push(ParseWarning::UnterminatedQuote(row));
        }
        if scanned.extra_separators > 0 {
            output.warnings.push(ParseWarning::MultipleSeparators(row));
        }

        if scanned.value.is_none() {
            if let Some(path) = section_header(&scanned.key) {
                section = path;
                output.document.section_mut(&section, row);
                continue;
            }
        }

        let key = normalize_key(&scanned.key);
        if key.is_empty() {
            if scanned.value.is_some() {
                output.warnings.push(ParseWarning::EmptyKey(row));
            }
            continue;
        }

        let value = match scanned.value {
            Some(v) => Value::Text(template.render(strip_quotes(v.trim()))),
            None => Value::Flag,
        };

        output.document.section_mut(&section, row).push_leaf(key, value, row);
    }

    output
}

/// Split a trimmed, non-comment line into key and optional value.
fn scan_line(line: &str) -> ScannedLine {
    let mut scanned = ScannedLine::default();
    let mut current = String::new();
    let mut key: Option<String> = None;
    let mut quote: Option<char> = None;
    // Quotes only count at the start of the key or the value, or of a
    // parameter inside a `!command(...)` key
    let mut at_segment_start = true;
    let mut param_depth = 0usize;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(open) = quote {
            if c == open {
                quote = None;
            }
            current.push(if c == '=' { SENTINEL } else { c });
            continue;
        }

        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '=' || COMMENT_CHARS.contains(&next) {
                    chars.next();
                    current.push(if next == '=' { SENTINEL } else { next });
                    at_segment_start = false;
                    continue;
                }
            }
            current.push(c);
            at_segment_start = false;
            continue;
        }

        if c.is_whitespace() {
            current.push(c);
            continue;
        }

        if QUOTE_CHARS.contains(&c) && (at_segment_start || at_parameter_start(&current, param_depth)) {
            quote = Some(c);
            current.push(c);
            at_segment_start = false;
            continue;
        }

        if COMMENT_CHARS.contains(&c) {
            scanned.inline_comment = true;
            break;
        }

        if c == '=' {
            if key.is_none() {
                key = Some(std::mem::take(&mut current));
                at_segment_start = true;
            } else {
                scanned.extra_separators += 1;
                current.push(c);
                at_segment_start = false;
            }
            continue;
        }

        if key.is_none() {
            match c {
                '(' if current.trim_start().starts_with('!') => param_depth += 1,
                ')' if param_depth > 0 => param_depth -= 1,
                _ => {}
            }
        }

        current.push(c);
        at_segment_start = false;
    }

    scanned.unterminated_quote = quote.is_some();
    match key {
        Some(k) => {
            scanned.key = k;
            scanned.value = Some(current);
        }
        None => scanned.key = current,
    }
    scanned
}

/// Whether the next character starts a parameter of a command invocation.
fn at_parameter_start(current: &str, param_depth: usize) -> bool {
    param_depth > 0 && matches!(current.trim_end().chars().last(), Some('(' | ','))
}

/// `[a.b]` → `["a", "b"]`.
fn section_header(key: &str) -> Option<Vec<String>> {
    let inner = key.trim().strip_prefix('[')?.strip_suffix(']')?;
    Some(
        inner
            .split('.')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn normalize_key(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix("[]").unwrap_or(trimmed).trim_end();
    strip_quotes(trimmed).to_string()
}

/// Remove one layer of matching surrounding quotes.
pub fn strip_quotes(text: &str) -> &str {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if first == last && QUOTE_CHARS.contains(&first) => {
            &text[first.len_utf8()..text.len() - last.len_utf8()]
        }
        _ => text,
    }
}
