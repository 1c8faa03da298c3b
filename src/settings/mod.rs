//! Tool settings.
//!
//! Four layers, later ones win:
//! 1. Built-in defaults
//! 2. User settings (~/.config/mnky/settings.toml)
//! 3. Project settings (.mnky/settings.toml)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::{
    builtin_layer, DEFAULT_BASE_TEMPLATE, DEFAULT_MONKEY_INTERVAL, FEATURE_TEMPLATE_ENGINE,
    FEATURE_UNDO, MAX_MONKEY_INTERVAL,
};
pub use effective::{
    project_settings_path, toml_to_json, user_settings_path, EffectiveSettings, Settings,
    SettingsError, SettingsOrigin, SettingsSource, SCHEMA_ID,
};
pub use merge::{deep_merge, merge_layers};
