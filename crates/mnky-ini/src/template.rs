//! Template interpolation for parsed values.
//!
//! Used for live previews, where values may refer to the environment with
//! `{{ location.host }}` style placeholders.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Template engine switch and the variables it can see.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateOptions {
    /// When false, values pass through untouched.
    #[serde(default)]
    pub enabled: bool,

    /// Lookup root for placeholders.
    #[serde(default)]
    pub variables: Json,
}

impl TemplateOptions {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_variables(variables: Json) -> Self {
        Self {
            enabled: true,
            variables,
        }
    }

    /// Interpolate `text` if the engine is enabled.
    pub fn render(&self, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        interpolate(text, &self.variables)
    }
}

/// Replace every `{{ path }}` whose dotted path resolves to a scalar in
/// `variables`. Unresolved placeholders are kept verbatim.
pub fn interpolate(text: &str, variables: &Json) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let placeholder = &rest[start..start + 2 + end + 2];
        match lookup(variables, after[..end].trim()) {
            Some(value) => out.push_str(&value),
            None => out.push_str(placeholder),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

fn lookup(root: &Json, path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let mut current = root;
    for part in path.split('.') {
        current = match current {
            Json::Object(map) => map.get(part)?,
            Json::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    match current {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
