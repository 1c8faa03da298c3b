//! Built-in settings (layer 1).

use std::collections::BTreeMap;

use serde_json::json;

/// Text of a freshly created configuration.
pub const DEFAULT_BASE_TEMPLATE: &str = "\
; Pages this configuration applies to
@include = example.com

; Variables can be overridden per demo
$name = World//Who to greet

Hello = Hello $name
";

/// Re-application interval in milliseconds.
pub const DEFAULT_MONKEY_INTERVAL: u64 = 100;

/// Upper bound for `monkey_interval`.
pub const MAX_MONKEY_INTERVAL: u64 = 60_000;

/// Parser template interpolation with the page location.
pub const FEATURE_TEMPLATE_ENGINE: &str = "withTemplateEngine";

/// Report and revert undo records.
pub const FEATURE_UNDO: &str = "undo";

pub fn default_features() -> BTreeMap<String, bool> {
    BTreeMap::from([
        (FEATURE_TEMPLATE_ENGINE.to_string(), false),
        (FEATURE_UNDO.to_string(), true),
    ])
}

/// The built-in layer as a mergeable value.
pub fn builtin_layer() -> serde_json::Value {
    json!({
        "base_template": DEFAULT_BASE_TEMPLATE,
        "monkey_interval": DEFAULT_MONKEY_INTERVAL,
        "debug_mode": false,
        "optional_features": default_features(),
        "connectors": {}
    })
}
