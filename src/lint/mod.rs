//! Static checks for configuration documents.
//!
//! Produces row-addressed annotations for the problems an author can fix:
//! ambiguous separators, inline comments, imports that do not resolve,
//! commands that compile to a no-op, and documents that can never apply.

mod report;

pub use report::LintReport;

use serde::{Deserialize, Serialize};

use crate::builder::{BuildError, CommandBuilder};
use crate::configuration::Configuration;
use crate::repository::Repository;
use crate::variable::{self, BoundVariable};
use mnky_ini::ParseWarning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// One finding, addressed by zero-based row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub row: usize,
    pub column: usize,
    pub text: String,
    pub severity: Severity,
}

impl Annotation {
    fn new(row: usize, severity: Severity, text: impl Into<String>) -> Self {
        Self {
            row,
            column: 0,
            text: text.into(),
            severity,
        }
    }
}

/// Lint a configuration. Imports are checked against `repository`.
pub fn lint(configuration: &Configuration<'_>, repository: &Repository) -> Vec<Annotation> {
    let mut annotations: Vec<Annotation> = configuration
        .warnings()
        .iter()
        .map(parse_warning)
        .collect();

    // Namespaces first, so commands of declared namespaces resolve
    let options = configuration.options();
    let builder = CommandBuilder::new(options.namespaces().to_vec(), options.match_rule());
    let variables = default_variables(configuration);

    for (key, value, row) in configuration.document().leaves() {
        if let Some(name) = key.strip_prefix('+') {
            let name = name.trim();
            if !name.is_empty() && !repository.has_by_name(name) {
                annotations.push(Annotation::new(
                    row,
                    Severity::Warning,
                    format!(
                        "There is no configuration called \"{}\", compilation will fail.",
                        name
                    ),
                ));
            }
            continue;
        }

        if key.len() > 1 && key.starts_with('!') {
            let value = variable::substitute(&variables, value.as_text().unwrap_or(""));
            if let Err(e) = builder.try_build(key, &value) {
                annotations.push(Annotation::new(row, Severity::Error, build_error_text(key, &e)));
            }
        }
    }

    if !configuration.is_restricted() && !configuration.is_template() {
        annotations.push(Annotation::new(
            0,
            Severity::Warning,
            "This configuration has no @include or @exclude rule and is not a @template.\n\
             It will not be applied to any page.",
        ));
    }

    annotations.sort_by_key(|a| a.row);
    annotations
}

/// Variables bound to their defaults; imports are ignored if they do not
/// resolve, since that is reported separately.
fn default_variables(configuration: &Configuration<'_>) -> Vec<BoundVariable> {
    let mut bound: Vec<BoundVariable> = configuration
        .declared_variables()
        .iter()
        .map(|v| v.bind(None))
        .collect();
    variable::sort_for_substitution(&mut bound);
    bound
}

fn parse_warning(warning: &ParseWarning) -> Annotation {
    match warning {
        ParseWarning::MultipleSeparators(row) => Annotation::new(
            *row,
            Severity::Warning,
            "Your line contains multiple equals signs (=)!\n\
             The first will be used to separate search and replacement.\n\
             Quote the equal signs that are part of your patterns.",
        ),
        ParseWarning::InlineComment(row) => Annotation::new(
            *row,
            Severity::Info,
            "Semi-colon (;) and hash (#) are interpreted as inline comments.\n\
             Make sure to quote your patterns to use them properly.",
        ),
        ParseWarning::UnterminatedQuote(row) => {
            Annotation::new(*row, Severity::Warning, "A quote is opened but never closed.")
        }
        ParseWarning::EmptyKey(row) => {
            Annotation::new(*row, Severity::Warning, "This line has no search pattern and will be ignored.")
        }
    }
}

fn build_error_text(key: &str, error: &BuildError) -> String {
    match error {
        BuildError::UnknownCommand { .. } | BuildError::Malformed { .. } => format!(
            "Command \"{}\" not found.\n\
             Please check the spelling and\n\
             if all required namespaces are loaded.",
            key
        ),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lint_text(text: &str) -> Vec<Annotation> {
        lint(&Configuration::new("test", text), &Repository::new())
    }

    fn severities(annotations: &[Annotation]) -> Vec<(usize, Severity)> {
        annotations.iter().map(|a| (a.row, a.severity)).collect()
    }

    #[test]
    fn test_clean_document() {
        assert!(lint_text("@include=example.com\nHello = Hi").is_empty());
    }

    #[test]
    fn test_unrestricted_warning() {
        let annotations = lint_text("Hello = Hi");
        assert_eq!(severities(&annotations), vec![(0, Severity::Warning)]);
        assert!(lint_text("@template\nHello = Hi").is_empty());
    }

    #[test]
    fn test_multiple_separators() {
        let annotations = lint_text("@include=x\na = b = c");
        assert_eq!(severities(&annotations), vec![(1, Severity::Warning)]);
        assert!(annotations[0].text.contains("multiple equals signs"));
    }

    #[test]
    fn test_inline_comment_info() {
        let annotations = lint_text("@include=x\na = b ; note");
        assert_eq!(severities(&annotations), vec![(1, Severity::Info)]);
    }

    #[test]
    fn test_missing_import() {
        let annotations = lint_text("@include=x\n+shared");
        assert_eq!(severities(&annotations), vec![(1, Severity::Warning)]);
        assert!(annotations[0].text.contains("\"shared\""));
        assert!(annotations[0].text.ends_with("compilation will fail."));

        let mut repo = Repository::new();
        repo.insert(Configuration::new("shared", "a = b"));
        assert!(lint(&Configuration::new("t", "@include=x\n+shared"), &repo).is_empty());
    }

    #[test]
    fn test_unknown_command_error() {
        let annotations = lint_text("@include=x\n!doesNotExist() = y");
        assert_eq!(severities(&annotations), vec![(1, Severity::Error)]);
        assert!(annotations[0].text.starts_with("Command \"!doesNotExist()\" not found."));
    }

    #[test]
    fn test_namespace_declared_later_still_counts() {
        let annotations = lint_text("@include=x\n!hideApplication(Shop)\n@namespace=appdynamics");
        assert!(annotations.is_empty());
    }

    #[test]
    fn test_invalid_parameter_error() {
        let annotations = lint_text("@include=x\n$wait=soon\n!delayUrl(/api) = $wait");
        assert_eq!(severities(&annotations), vec![(2, Severity::Error)]);
        assert!(annotations[0].text.contains("not a number"));
    }
}
