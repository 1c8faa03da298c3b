//! Layer merging.
//!
//! Tables merge key by key, recursively. Everything else, arrays included,
//! is replaced by the later layer.

use serde_json::Value;

/// Lay `overlay` over `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    let (Value::Object(mut merged), Value::Object(overlay)) = (base, overlay.clone()) else {
        return overlay;
    };
    for (key, value) in overlay {
        let combined = match merged.remove(&key) {
            Some(existing) => deep_merge(existing, value),
            None => value,
        };
        merged.insert(key, combined);
    }
    Value::Object(merged)
}

/// Merge layers in precedence order, lowest first.
pub fn merge_layers(layers: impl IntoIterator<Item = Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_replaced() {
        let merged = deep_merge(json!({"monkey_interval": 100}), json!({"monkey_interval": 250}));
        assert_eq!(merged["monkey_interval"], 250);
    }

    #[test]
    fn test_features_merge_by_key() {
        let merged = deep_merge(
            json!({"optional_features": {"undo": true, "withTemplateEngine": false}}),
            json!({"optional_features": {"withTemplateEngine": true}}),
        );
        assert_eq!(merged["optional_features"]["undo"], true);
        assert_eq!(merged["optional_features"]["withTemplateEngine"], true);
    }

    #[test]
    fn test_array_replaced() {
        let merged = deep_merge(json!({"hotkeys": [1, 2, 3]}), json!({"hotkeys": [9]}));
        assert_eq!(merged["hotkeys"], json!([9]));
    }

    #[test]
    fn test_layers_in_order() {
        let merged = merge_layers(vec![
            json!({"debug_mode": false, "repository": "builtin"}),
            json!({"repository": "user"}),
            json!({"debug_mode": true}),
        ]);
        assert_eq!(merged["debug_mode"], true);
        assert_eq!(merged["repository"], "user");
    }

    #[test]
    fn test_object_over_scalar() {
        let merged = deep_merge(json!({"connectors": null}), json!({"connectors": {"github": {}}}));
        assert!(merged["connectors"]["github"].is_object());
    }
}
