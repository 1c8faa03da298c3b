use serde::{Deserialize, Serialize};

use super::{Annotation, Severity};

/// Lint output for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintReport {
    /// Configuration name or file path
    pub name: String,

    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,

    pub annotations: Vec<Annotation>,
}

impl LintReport {
    pub fn new(name: impl Into<String>, annotations: Vec<Annotation>) -> Self {
        let count = |s: Severity| annotations.iter().filter(|a| a.severity == s).count();
        Self {
            name: name.into(),
            errors: count(Severity::Error),
            warnings: count(Severity::Warning),
            infos: count(Severity::Info),
            annotations,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// One block per annotation, `name:row: severity: text`, rows one-based.
    pub fn to_human(&self) -> String {
        let mut output = String::new();
        for annotation in &self.annotations {
            let mut lines = annotation.text.lines();
            output.push_str(&format!(
                "{}:{}: {}: {}\n",
                self.name,
                annotation.row + 1,
                annotation.severity.as_str(),
                lines.next().unwrap_or("")
            ));
            for line in lines {
                output.push_str(&format!("    {}\n", line));
            }
        }
        output.push_str(&format!(
            "{} error(s), {} warning(s), {} info\n",
            self.errors, self.warnings, self.infos
        ));
        output
    }
}
