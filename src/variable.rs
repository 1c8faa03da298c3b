//! Configuration variables (`$name=default//transform`).

use serde::{Deserialize, Serialize};

/// Separator between a variable's default value and its transform.
const TRANSFORM_SEPARATOR: &str = "//";

/// How a bound value is rewritten when it is substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "lowercase")]
pub enum Transform {
    Upper,
    Lower,
    Trim,
    Capitalize,
    UrlEncode,
    /// Free text (usually a description for the editor); leaves the value as is.
    Describe(String),
}

impl Transform {
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "upper" | "uppercase" => Transform::Upper,
            "lower" | "lowercase" => Transform::Lower,
            "trim" => Transform::Trim,
            "capitalize" => Transform::Capitalize,
            "urlencode" => Transform::UrlEncode,
            _ => Transform::Describe(text.to_string()),
        }
    }

    pub fn apply(&self, value: &str) -> String {
        match self {
            Transform::Upper => value.to_uppercase(),
            Transform::Lower => value.to_lowercase(),
            Transform::Trim => value.trim().to_string(),
            Transform::Capitalize => {
                let mut chars = value.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            Transform::UrlEncode => url_encode(value),
            Transform::Describe(_) => value.to_string(),
        }
    }
}

fn url_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// A declared variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub default_value: String,
    pub transform: Transform,
}

impl Variable {
    /// Build from a `$name` key (without `$`) and its raw `default//transform` value.
    pub fn parse(name: &str, raw: &str) -> Self {
        let (default_value, transform) = match raw.split_once(TRANSFORM_SEPARATOR) {
            Some((d, t)) => (d, Transform::parse(t)),
            None => (raw, Transform::Describe(String::new())),
        };
        Self {
            name: name.to_string(),
            default_value: default_value.to_string(),
            transform,
        }
    }

    /// Bind to an override value. The effective value is the override, else
    /// the default, else the variable's own name.
    pub fn bind(&self, value: Option<&str>) -> BoundVariable {
        let effective = match value {
            Some(v) if !v.is_empty() => v.to_string(),
            _ if !self.default_value.is_empty() => self.default_value.clone(),
            _ => self.name.clone(),
        };
        BoundVariable {
            variable: self.clone(),
            value: effective,
        }
    }
}

/// A variable with its effective value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundVariable {
    #[serde(flatten)]
    pub variable: Variable,
    pub value: String,
}

impl BoundVariable {
    pub fn name(&self) -> &str {
        &self.variable.name
    }

    /// Replace `${name}` and `$name` in `text` with the transformed value.
    pub fn apply(&self, text: &str) -> String {
        let name = &self.variable.name;
        if !text.contains('$') || !text.contains(name.as_str()) {
            return text.to_string();
        }
        let value = self.variable.transform.apply(&self.value);
        text.replace(&format!("${{{}}}", name), &value)
            .replace(&format!("${}", name), &value)
    }
}

/// Sort longest name first, so `$ab` is substituted before `$a`.
pub fn sort_for_substitution(variables: &mut [BoundVariable]) {
    variables.sort_by(|a, b| b.name().len().cmp(&a.name().len()));
}

/// Substitute every variable into `text`, in the given order.
pub fn substitute(variables: &[BoundVariable], text: &str) -> String {
    variables
        .iter()
        .fold(text.to_string(), |acc, variable| variable.apply(&acc))
}
