//! URL include/exclude rules.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Include/exclude rule sets tested against a URL.
///
/// A rule wrapped in slashes (`/^https:\/\/demo/`) is a regular expression;
/// any other rule matches when it is a substring of the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRule {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl MatchRule {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Excludes win over includes. Without include rules, every URL that is
    /// not excluded matches.
    pub fn test(&self, url: &str) -> bool {
        if self.exclude.iter().any(|rule| rule_matches(rule, url)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|rule| rule_matches(rule, url))
    }
}

fn rule_matches(rule: &str, url: &str) -> bool {
    if rule.len() > 1 && rule.starts_with('/') && rule.ends_with('/') {
        return match Regex::new(&rule[1..rule.len() - 1]) {
            Ok(re) => re.is_match(url),
            Err(e) => {
                tracing::debug!(rule, error = %e, "ignoring invalid match rule");
                false
            }
        };
    }
    url.contains(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(include: &[&str], exclude: &[&str]) -> MatchRule {
        MatchRule::new(
            include.iter().map(|s| s.to_string()).collect(),
            exclude.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_substring_include() {
        let r = rule(&["example.com"], &[]);
        assert!(r.test("https://example.com/path"));
        assert!(!r.test("https://other.org/"));
    }

    #[test]
    fn test_exclude_wins() {
        let r = rule(&["example.com"], &["/admin"]);
        assert!(r.test("https://example.com/"));
        assert!(!r.test("https://example.com/admin"));
    }

    #[test]
    fn test_regex_rule() {
        let r = rule(&["/^https://demo\\.[a-z]+\\.com/"], &[]);
        assert!(r.test("https://demo.acme.com/x"));
        assert!(!r.test("http://demo.acme.com/x"));
    }

    #[test]
    fn test_exclude_only() {
        let r = rule(&[], &["secret"]);
        assert!(r.test("https://example.com/"));
        assert!(!r.test("https://example.com/secret"));
    }

    #[test]
    fn test_invalid_regex_never_matches() {
        let r = rule(&["/([/"], &[]);
        assert!(!r.test("anything ([/"));
    }
}
