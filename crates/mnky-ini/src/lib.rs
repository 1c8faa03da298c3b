//! Parser for the mnky configuration language.
//!
//! Turns line-oriented configuration text into an ordered, nested
//! [`ParsedDocument`]. Interpretation of keys (`@option`, `$variable`,
//! `+import`, `!command`, patterns) is left to the compiler.

mod document;
mod parser;
mod template;

pub use document::{unescape, Entry, Node, ParseOutput, ParseWarning, ParsedDocument, Value, SENTINEL};
pub use parser::{parse, strip_quotes};
pub use template::{interpolate, TemplateOptions};
