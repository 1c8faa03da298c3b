//! Outbound request commands.
//!
//! These never touch the tree. A host that intercepts requests asks each
//! command applicable for the `ajax` group what to do through
//! [`Command::intercept`].

use mnky_tree::{NodeId, Tree, UndoRecord};
use serde::{Deserialize, Serialize};

use super::{is_ajax_group, Command, CommandKind};
use crate::match_rule::MatchRule;

/// A request about to leave the page.
#[derive(Debug, Clone, Copy)]
pub struct UrlRequest<'a> {
    pub url: &'a str,
    /// Resource type (`xmlhttprequest`, `image`, `script`, ...).
    pub resource_type: &'a str,
    /// Location of the page issuing the request.
    pub page_url: &'a str,
}

/// What the host should do with an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UrlAction {
    Block,
    Delay { milliseconds: u64 },
    Redirect { url: String },
}

/// Shared request filter of the URL commands.
#[derive(Debug, Clone)]
struct UrlFilter {
    url: String,
    /// Empty or `*` means any resource type.
    resource_type: String,
    /// Pages of the owning configuration.
    pages: MatchRule,
}

impl UrlFilter {
    fn new(url: &str, resource_type: &str, pages: MatchRule) -> Self {
        Self {
            url: url.to_string(),
            resource_type: resource_type.to_string(),
            pages,
        }
    }

    fn matches(&self, request: &UrlRequest<'_>) -> bool {
        if self.url.is_empty() {
            return false;
        }
        let type_ok = self.resource_type.is_empty()
            || self.resource_type == "*"
            || self.resource_type.eq_ignore_ascii_case(request.resource_type);
        let url_ok = if self.url.contains(['*', '?']) {
            super::wildcard_matches(&self.url, request.url)
        } else {
            request.url.contains(&self.url)
        };
        type_ok && url_ok && self.pages.test(request.page_url)
    }
}

macro_rules! url_command {
    ($name:ident, $kind:ident) => {
        impl Command for $name {
            fn kind(&self) -> CommandKind {
                CommandKind::$kind
            }

            fn is_applicable_for_group(&self, group: &str) -> bool {
                is_ajax_group(group)
            }

            fn apply(&self, _tree: &mut dyn Tree, _node: NodeId, _key: &str) -> Vec<UndoRecord> {
                Vec::new()
            }

            fn describe(&self) -> String {
                self.description()
            }

            fn intercept(&self, request: &UrlRequest<'_>) -> Option<UrlAction> {
                if self.filter.matches(request) {
                    Some(self.action())
                } else {
                    None
                }
            }
        }
    };
}

/// Cancel matching requests.
#[derive(Debug, Clone)]
pub struct BlockUrl {
    filter: UrlFilter,
}

impl BlockUrl {
    pub fn new(url: &str, resource_type: &str, pages: MatchRule) -> Self {
        Self {
            filter: UrlFilter::new(url, resource_type, pages),
        }
    }

    fn action(&self) -> UrlAction {
        UrlAction::Block
    }

    fn description(&self) -> String {
        format!("block {}", self.filter.url)
    }
}

url_command!(BlockUrl, BlockUrl);

/// Hold matching requests back.
#[derive(Debug, Clone)]
pub struct DelayUrl {
    filter: UrlFilter,
    milliseconds: u64,
}

impl DelayUrl {
    pub fn new(url: &str, milliseconds: u64, resource_type: &str, pages: MatchRule) -> Self {
        Self {
            filter: UrlFilter::new(url, resource_type, pages),
            milliseconds,
        }
    }

    fn action(&self) -> UrlAction {
        UrlAction::Delay {
            milliseconds: self.milliseconds,
        }
    }

    fn description(&self) -> String {
        format!("delay {} by {}ms", self.filter.url, self.milliseconds)
    }
}

url_command!(DelayUrl, DelayUrl);

/// Redirect matching requests.
#[derive(Debug, Clone)]
pub struct ReplaceUrl {
    filter: UrlFilter,
    replacement: String,
}

impl ReplaceUrl {
    pub fn new(url: &str, replacement: &str, resource_type: &str, pages: MatchRule) -> Self {
        Self {
            filter: UrlFilter::new(url, resource_type, pages),
            replacement: replacement.to_string(),
        }
    }

    fn action(&self) -> UrlAction {
        UrlAction::Redirect {
            url: self.replacement.clone(),
        }
    }

    fn description(&self) -> String {
        format!("redirect {} to {}", self.filter.url, self.replacement)
    }
}

url_command!(ReplaceUrl, ReplaceUrl);

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(url: &'a str, resource_type: &'a str) -> UrlRequest<'a> {
        UrlRequest {
            url,
            resource_type,
            page_url: "https://app.example.com/",
        }
    }

    #[test]
    fn test_block_any_type() {
        let cmd = BlockUrl::new("tracking.js", "", MatchRule::default());
        assert_eq!(
            cmd.intercept(&request("https://cdn.test/tracking.js", "script")),
            Some(UrlAction::Block)
        );
        assert_eq!(cmd.intercept(&request("https://cdn.test/app.js", "script")), None);
        assert!(cmd.is_applicable_for_group("ajax"));
        assert!(!cmd.is_applicable_for_group("text"));
    }

    #[test]
    fn test_delay_type_filter() {
        let cmd = DelayUrl::new("/api/*", 2000, "xmlhttprequest", MatchRule::default());
        assert_eq!(cmd.intercept(&request("/api/users", "image")), None);
        assert_eq!(
            cmd.intercept(&request("/api/users", "xmlhttprequest")),
            Some(UrlAction::Delay { milliseconds: 2000 })
        );
    }

    #[test]
    fn test_redirect_only_on_configured_pages() {
        let pages = MatchRule::new(vec!["other.example.com".into()], vec![]);
        let cmd = ReplaceUrl::new("logo.png", "https://acme.test/logo.png", "", pages);
        assert_eq!(cmd.intercept(&request("https://cdn.test/logo.png", "image")), None);
    }

    #[test]
    fn test_apply_is_inert() {
        let mut tree = mnky_tree::MemoryTree::new("about:blank");
        let text = tree.append_text(tree.root(), "x");
        let cmd = BlockUrl::new("x", "", MatchRule::default());
        assert!(cmd.apply(&mut tree, text, "value").is_empty());
    }
}
