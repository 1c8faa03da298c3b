//! Command compiler: configuration keys and values to [`Command`]s.
//!
//! Key forms:
//! - `!ns.command(args)`: a registered command, see [`Registry`]
//! - `!/pattern/flags` or `/pattern/flags`: regular expression replace
//! - `\literal`: literal search starting with a reserved character
//! - anything else: literal search
//!
//! Building never fails outright. [`CommandBuilder::try_build`] reports why
//! a line could not be compiled; [`CommandBuilder::build`] turns that into
//! a [`NoOp`] so the rest of a document still compiles.

mod appdynamics;
mod extract;
mod registry;

pub use extract::{extract, Invocation};
pub use registry::{Call, Factory, Registry};

use std::sync::Arc;

use mnky_ini::unescape;
use regex_lite::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::command::{CommandRef, NoOp, Pattern, SearchAndReplace};
use crate::match_rule::MatchRule;

/// Regex flags accepted after the closing `/`.
const REGEX_FLAGS: &str = "gimp";

/// Why a line compiled to a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum BuildError {
    #[error("Malformed command \"{key}\"")]
    Malformed { key: String },

    #[error("Command \"{name}\" not found")]
    UnknownCommand { name: String },

    #[error("Invalid pattern /{pattern}/: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid parameter for \"{command}\": {message}")]
    InvalidParameter { command: String, message: String },
}

/// Compiles single `key = value` lines.
#[derive(Debug, Clone)]
pub struct CommandBuilder<'r> {
    registry: &'r Registry,
    /// Namespaces declared with `@namespace`, searched after an explicit one.
    namespaces: Vec<String>,
    /// Page rules of the owning configuration, handed to URL commands.
    rules: MatchRule,
}

impl CommandBuilder<'static> {
    /// Builder over the built-in vocabulary.
    pub fn new(namespaces: Vec<String>, rules: MatchRule) -> Self {
        Self::with_registry(Registry::global(), namespaces, rules)
    }
}

impl<'r> CommandBuilder<'r> {
    pub fn with_registry(registry: &'r Registry, namespaces: Vec<String>, rules: MatchRule) -> Self {
        Self {
            registry,
            namespaces,
            rules,
        }
    }

    /// Compile a line, falling back to a [`NoOp`] carrying the reason.
    pub fn build(&self, key: &str, value: &str) -> CommandRef {
        match self.try_build(key, value) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(key, error = %e, "line compiled to no-op");
                Arc::new(NoOp::new(unescape(key), Some(e)))
            }
        }
    }

    pub fn try_build(&self, key: &str, value: &str) -> Result<CommandRef, BuildError> {
        let key = unescape(key);
        let value = unescape(value);

        if key.is_empty() {
            return Err(BuildError::Malformed { key });
        }

        if let Some(rest) = key.strip_prefix('!') {
            if let Some((body, flags)) = regex_literal(rest) {
                return build_regex(body, flags, &value);
            }
            let invocation = extract(rest).ok_or_else(|| BuildError::Malformed { key: key.clone() })?;
            return self.dispatch(&invocation, &value);
        }

        if let Some(rest) = key.strip_prefix('\\') {
            return Ok(Arc::new(SearchAndReplace::literal(rest, value)));
        }

        if let Some((body, flags)) = regex_literal(&key) {
            return build_regex(body, flags, &value);
        }

        Ok(Arc::new(SearchAndReplace::literal(key, value)))
    }

    /// Explicit namespace first, then declared namespaces, then the base
    /// vocabulary.
    fn dispatch(&self, invocation: &Invocation, value: &str) -> Result<CommandRef, BuildError> {
        let call = Call {
            command: &invocation.command,
            parameters: &invocation.parameters,
            value,
            rules: &self.rules,
        };

        let explicit = Some(invocation.namespace.as_str()).filter(|ns| !ns.is_empty());
        let candidates = explicit
            .into_iter()
            .chain(self.namespaces.iter().map(String::as_str))
            .chain(std::iter::once(""));

        for namespace in candidates {
            if let Some(factory) = self.registry.get(namespace, &invocation.command) {
                tracing::trace!(namespace, command = %invocation.command, "dispatching command");
                return factory(&call);
            }
        }

        Err(BuildError::UnknownCommand {
            name: invocation.qualified_name(),
        })
    }
}

/// Split `/body/flags` into body and flags.
fn regex_literal(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    if end == 0 {
        return None;
    }
    let flags = &rest[end + 1..];
    if !flags.chars().all(|c| REGEX_FLAGS.contains(c)) {
        return None;
    }
    Some((&rest[..end], flags))
}

fn build_regex(body: &str, flags: &str, replacement: &str) -> Result<CommandRef, BuildError> {
    let global = flags.is_empty() || flags.contains('g');
    let preserve_case = flags.contains('p');

    let mut source = String::new();
    if flags.contains('i') {
        source.push_str("(?i)");
    }
    if flags.contains('m') {
        source.push_str("(?m)");
    }
    source.push_str(&body.replace("\\/", "/"));

    let regex = Regex::new(&source).map_err(|e| BuildError::InvalidPattern {
        pattern: body.to_string(),
        message: e.to_string(),
    })?;

    Ok(Arc::new(SearchAndReplace::new(
        Pattern::Regex {
            regex,
            global,
            preserve_case,
        },
        replacement,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandKind, GROUP_ALL};
    use mnky_ini::SENTINEL;
    use mnky_tree::{MemoryTree, Tree};

    fn builder() -> CommandBuilder<'static> {
        CommandBuilder::new(Vec::new(), MatchRule::default())
    }

    fn run(key: &str, value: &str, text: &str) -> String {
        let command = builder().build(key, value);
        let mut tree = MemoryTree::new("https://example.com/");
        let node = tree.append_text(tree.root(), text);
        command.apply(&mut tree, node, "value");
        tree.get(node, "value").unwrap_or_default()
    }

    #[test]
    fn test_literal() {
        assert_eq!(run("Hello", "Hi", "Hello World"), "Hi World");
    }

    #[test]
    fn test_escaped_bang_is_literal() {
        assert_eq!(run("\\!important", "x", "very !important"), "very x");
    }

    #[test]
    fn test_regex_default_global() {
        assert_eq!(run("/o/", "0", "foo"), "f00");
        assert_eq!(run("/o/i", "0", "fOo"), "f0o");
        assert_eq!(run("!/o/g", "0", "foo"), "f00");
    }

    #[test]
    fn test_regex_case_preserving() {
        assert_eq!(run("/hello/pi", "world", "HELLO"), "WORLD");
        assert_eq!(run("/hello/pi", "world", "hello"), "world");
        assert_eq!(run("/hello/pi", "world", "Hello"), "world");
    }

    #[test]
    fn test_invalid_flags_are_literal() {
        assert_eq!(run("/a/x", "b", "c /a/x d"), "c b d");
    }

    #[test]
    fn test_invalid_regex_is_noop() {
        let err = builder().try_build("/([/", "x").err();
        assert!(matches!(err, Some(BuildError::InvalidPattern { .. })));
        assert_eq!(builder().build("/([/", "x").kind(), CommandKind::Unknown);
    }

    #[test]
    fn test_sentinel_round_trip() {
        let value = format!("a{}b", SENTINEL);
        assert_eq!(run("x", &value, "x"), "a=b");
        let key = format!("k{}v", SENTINEL);
        assert_eq!(run(&key, "ok", "k=v"), "ok");
    }

    #[test]
    fn test_unknown_command() {
        let command = builder().build("!doesNotExist()", "x");
        assert_eq!(command.kind(), CommandKind::Unknown);
        assert!(!command.is_applicable_for_group(GROUP_ALL));
        assert_eq!(
            builder().try_build("!doesNotExist()", "x").err(),
            Some(BuildError::UnknownCommand {
                name: "doesNotExist".into()
            })
        );
    }

    #[test]
    fn test_malformed_command() {
        assert_eq!(
            builder().try_build("!replace(a", "x").err(),
            Some(BuildError::Malformed {
                key: "!replace(a".into()
            })
        );
    }

    #[test]
    fn test_base_command() {
        assert_eq!(run("!replace(World)", "Moon", "Hello World"), "Hello Moon");
        assert_eq!(builder().build("!hide(x, 2)", "").kind(), CommandKind::Hide);
    }

    #[test]
    fn test_unregistered_namespace_falls_back_to_base() {
        assert_eq!(
            builder().build("!acme.style(x, color)", "red").kind(),
            CommandKind::Style
        );
    }

    #[test]
    fn test_namespace_needs_declaration() {
        assert_eq!(
            builder().build("!hideApplication(Shop)", "").kind(),
            CommandKind::Unknown
        );
        let declared = CommandBuilder::new(vec!["appdynamics".into()], MatchRule::default());
        assert_eq!(
            declared.build("!hideApplication(Shop)", "").kind(),
            CommandKind::Group
        );
        assert_eq!(
            builder().build("!appdynamics.hideApplication(Shop)", "").kind(),
            CommandKind::Group
        );
    }

    #[test]
    fn test_regex_literal_split() {
        assert_eq!(regex_literal("/a/b/gi"), Some(("a/b", "gi")));
        assert_eq!(regex_literal("/a/"), Some(("a", "")));
        assert_eq!(regex_literal("//"), None);
        assert_eq!(regex_literal("a/b/"), None);
    }
}
