//! Command invocation syntax: `namespace.command(arg, "a,b", 'c')`.

use mnky_ini::strip_quotes;
use serde::{Deserialize, Serialize};

/// A command key split into its parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Empty when the command was written without a namespace.
    pub namespace: String,
    pub command: String,
    pub parameters: Vec<String>,
}

impl Invocation {
    /// `ns.command` or `command`.
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.command.clone()
        } else {
            format!("{}.{}", self.namespace, self.command)
        }
    }
}

/// Split a command key (without the leading `!`).
///
/// Returns `None` for an empty key and for a key that opens a parameter list
/// without closing it at the very end.
pub fn extract(key: &str) -> Option<Invocation> {
    if key.is_empty() {
        return None;
    }

    let (name, parameters) = match key.find('(') {
        Some(open) => {
            if !key.ends_with(')') {
                return None;
            }
            (&key[..open], split_parameters(&key[open + 1..key.len() - 1]))
        }
        None => (key, Vec::new()),
    };

    let (namespace, command) = match name.rfind('.') {
        Some(dot) => (&name[..dot], &name[dot + 1..]),
        None => ("", name),
    };

    Some(Invocation {
        namespace: namespace.to_string(),
        command: command.to_string(),
        parameters,
    })
}

/// Split on commas outside quotes, then trim and unquote each parameter.
fn split_parameters(body: &str) -> Vec<String> {
    let mut parameters = vec![String::new()];
    let mut open: Option<char> = None;

    for c in body.chars() {
        match (open, c) {
            (None, '"' | '\'') => open = Some(c),
            (Some(q), _) if q == c => open = None,
            (None, ',') => {
                parameters.push(String::new());
                continue;
            }
            _ => {}
        }
        if let Some(current) = parameters.last_mut() {
            current.push(c);
        }
    }

    parameters
        .iter()
        .map(|p| strip_quotes(p.trim()).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(key: &str) -> Vec<String> {
        extract(key).unwrap().parameters
    }

    #[test]
    fn test_quote_aware_split() {
        let inv = extract("ns.cmd(\"a,b\", 'c')").unwrap();
        assert_eq!(inv.namespace, "ns");
        assert_eq!(inv.command, "cmd");
        assert_eq!(inv.parameters, vec!["a,b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_nested_quotes() {
        assert_eq!(params("cmd(\"it's\", 'say \"hi\"')"), vec!["it's", "say \"hi\""]);
    }

    #[test]
    fn test_no_parentheses() {
        let inv = extract("hideApplication").unwrap();
        assert_eq!(inv.command, "hideApplication");
        assert!(inv.namespace.is_empty());
        assert!(inv.parameters.is_empty());
    }

    #[test]
    fn test_empty_parentheses_has_one_empty_parameter() {
        assert_eq!(params("replace()"), vec![String::new()]);
    }

    #[test]
    fn test_unbalanced_is_not_extracted() {
        assert!(extract("replace(a, b").is_none());
        assert!(extract("replace(a) x").is_none());
        assert!(extract("").is_none());
    }

    #[test]
    fn test_namespace_uses_last_dot() {
        let inv = extract("a.b.cmd(x.y)").unwrap();
        assert_eq!(inv.namespace, "a.b");
        assert_eq!(inv.command, "cmd");
        assert_eq!(inv.parameters, vec!["x.y"]);
        assert_eq!(inv.qualified_name(), "a.b.cmd");
    }

    #[test]
    fn test_parameters_trimmed() {
        assert_eq!(params("style( Hello , color ,  2 )"), vec!["Hello", "color", "2"]);
    }
}
