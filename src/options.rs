//! Document options (`@name` / `@name=value`).

use indexmap::IndexMap;
use mnky_ini::{unescape, ParsedDocument, Value};
use serde::{Deserialize, Serialize};

use crate::match_rule::MatchRule;

pub const INCLUDE: &str = "include";
pub const EXCLUDE: &str = "exclude";
pub const NAMESPACE: &str = "namespace";
pub const BLACKLIST: &str = "blacklist";
pub const WHITELIST: &str = "whitelist";
pub const TEMPLATE: &str = "template";
pub const DEPRECATED: &str = "deprecated";

/// Accumulated values of one option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValue {
    /// Explicit values, in document order across all occurrences.
    #[serde(default)]
    pub values: Vec<String>,

    /// At least one occurrence had no value (`@template`).
    #[serde(default)]
    pub flag: bool,
}

/// All options of a document, keyed by name without `@`, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    entries: IndexMap<String, OptionValue>,
}

impl Options {
    /// Collect `@`-keys at any depth. Repeated keys accumulate.
    pub fn from_document(document: &ParsedDocument) -> Self {
        let mut options = Options::default();
        for (key, value, _) in document.leaves() {
            let Some(name) = option_name(key) else {
                continue;
            };
            let entry = options.entries.entry(name.to_string()).or_default();
            match value {
                Value::Flag => entry.flag = true,
                Value::Text(text) => entry.values.push(unescape(text)),
            }
        }
        options
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries.get(name)
    }

    /// Explicit values of `name` (empty when absent).
    pub fn values(&self, name: &str) -> &[String] {
        self.entries
            .get(name)
            .map(|o| o.values.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `name` occurs at all, with or without a value.
    pub fn is_set(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.entries.iter()
    }

    pub fn include(&self) -> &[String] {
        self.values(INCLUDE)
    }

    pub fn exclude(&self) -> &[String] {
        self.values(EXCLUDE)
    }

    pub fn namespaces(&self) -> &[String] {
        self.values(NAMESPACE)
    }

    pub fn blacklist(&self) -> &[String] {
        self.values(BLACKLIST)
    }

    pub fn whitelist(&self) -> &[String] {
        self.values(WHITELIST)
    }

    /// Presence alone marks a template.
    pub fn is_template(&self) -> bool {
        self.is_set(TEMPLATE)
    }

    pub fn is_deprecated(&self) -> bool {
        self.is_set(DEPRECATED)
    }

    pub fn match_rule(&self) -> MatchRule {
        MatchRule::new(self.include().to_vec(), self.exclude().to_vec())
    }
}

/// `@name` → `name`; a lone `@` is not an option.
pub(crate) fn option_name(key: &str) -> Option<&str> {
    key.strip_prefix('@').filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnky_ini::{parse, TemplateOptions};

    fn options(text: &str) -> Options {
        Options::from_document(&parse(text, &TemplateOptions::disabled()).document)
    }

    #[test]
    fn test_accumulates_in_order() {
        let opts = options("@include = a.com\nx = y\n@include = b.com");
        assert_eq!(opts.include(), &["a.com".to_string(), "b.com".to_string()]);
    }

    #[test]
    fn test_nested_sections() {
        let opts = options("[s]\n@namespace = appdynamics\n[t.u]\n@blacklist = pre");
        assert_eq!(opts.namespaces(), &["appdynamics".to_string()]);
        assert_eq!(opts.blacklist(), &["pre".to_string()]);
    }

    #[test]
    fn test_flag_presence() {
        let opts = options("@template\n@deprecated = true");
        assert!(opts.is_template());
        assert!(opts.is_deprecated());
        assert!(opts.get(TEMPLATE).unwrap().flag);
        assert!(opts.get(TEMPLATE).unwrap().values.is_empty());
    }

    #[test]
    fn test_flag_not_overwritten_by_value() {
        let opts = options("@template\n@template = true");
        let template = opts.get(TEMPLATE).unwrap();
        assert!(template.flag);
        assert_eq!(template.values, vec!["true".to_string()]);
    }

    #[test]
    fn test_lone_at_is_not_option() {
        let opts = options("@ = x");
        assert_eq!(opts.iter().count(), 0);
    }

    #[test]
    fn test_escaped_value() {
        let opts = options(r"@include = /q\=1/");
        assert_eq!(opts.include(), &["/q=1/".to_string()]);
    }

    #[test]
    fn test_match_rule() {
        let opts = options("@include = example.com\n@exclude = /admin");
        let rule = opts.match_rule();
        assert!(rule.test("https://example.com/"));
        assert!(!rule.test("https://example.com/admin"));
    }
}
