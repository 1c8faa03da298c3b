//! Effective settings with provenance.
//!
//! Records the merged result together with every file that contributed to
//! it, so `mnky settings` can show where a value came from.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::defaults::{self, builtin_layer, MAX_MONKEY_INTERVAL};
use super::merge::merge_layers;

pub const SCHEMA_VERSION: u32 = 1;

pub const SCHEMA_ID: &str = "mnky/effective_settings@1";

/// File name of both the user and the project settings file.
pub const SETTINGS_FILE: &str = "settings.toml";

const SECRET_KEYS: &[&str] = &["password", "token", "secret", "api_key", "credential"];

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid settings: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Builtin,
    User,
    Project,
    Cli,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSource {
    pub origin: SettingsOrigin,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Typed view of the merged settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Content of configurations created with `mnky new`
    pub base_template: String,

    /// Milliseconds between re-application passes
    pub monkey_interval: u64,

    pub debug_mode: bool,

    #[serde(default)]
    pub optional_features: BTreeMap<String, bool>,

    /// Default repository directory
    #[serde(default)]
    pub repository: Option<String>,

    /// Remote configuration sources, by name
    #[serde(default)]
    pub connectors: BTreeMap<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_template: defaults::DEFAULT_BASE_TEMPLATE.to_string(),
            monkey_interval: defaults::DEFAULT_MONKEY_INTERVAL,
            debug_mode: false,
            optional_features: defaults::default_features(),
            repository: None,
            connectors: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Unknown features are disabled.
    pub fn is_feature_enabled(&self, feature: &str) -> bool {
        self.optional_features.get(feature).copied().unwrap_or(false)
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.debug_mode
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveSettings {
    pub schema_version: u32,
    pub schema_id: String,
    pub created_at: DateTime<Utc>,

    /// Not serialized: holds unredacted connector credentials
    #[serde(skip)]
    pub settings: Settings,

    /// Merged settings with secrets redacted
    pub config: Value,

    /// Contributing sources, lowest precedence first
    pub sources: Vec<SettingsSource>,

    pub redactions: Vec<String>,
}

impl EffectiveSettings {
    /// Merge built-in defaults, the user file, the project file and CLI
    /// overrides. Missing files are skipped.
    pub fn build(
        user_path: Option<&Path>,
        project_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, SettingsError> {
        let mut layers = vec![builtin_layer()];
        let mut sources = vec![SettingsSource {
            origin: SettingsOrigin::Builtin,
            path: None,
            digest: None,
        }];

        for (origin, path) in [
            (SettingsOrigin::User, user_path),
            (SettingsOrigin::Project, project_path),
        ] {
            let Some(path) = path.filter(|p| p.exists()) else {
                continue;
            };
            let (value, digest) = load_toml_file(path)?;
            tracing::debug!(path = %path.display(), %digest, "loaded settings");
            layers.push(value);
            sources.push(SettingsSource {
                origin,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(SettingsSource {
                origin: SettingsOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        validate(&merged)?;
        let settings: Settings = serde_json::from_value(merged.clone())
            .map_err(|e| SettingsError::ValidationError(e.to_string()))?;

        let mut config = merged;
        let redactions = redact_secrets(&mut config);

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            settings,
            config,
            sources,
            redactions,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// `$XDG_CONFIG_HOME/mnky/settings.toml`, falling back to `~/.config`.
pub fn user_settings_path() -> Option<PathBuf> {
    let base = match env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(env::var_os("HOME")?).join(".config"),
    };
    Some(base.join("mnky").join(SETTINGS_FILE))
}

/// `.mnky/settings.toml` below `dir`.
pub fn project_settings_path(dir: &Path) -> PathBuf {
    dir.join(".mnky").join(SETTINGS_FILE)
}

fn load_toml_file(path: &Path) -> Result<(Value, String), SettingsError> {
    let bytes = fs::read(path).map_err(|e| SettingsError::IoError(e.to_string()))?;
    let digest = hex::encode(Sha256::digest(&bytes));

    let contents = String::from_utf8(bytes)
        .map_err(|e| SettingsError::ParseError(format!("Invalid UTF-8: {}", e)))?;
    let table: toml::Value = toml::from_str(&contents)
        .map_err(|e| SettingsError::ParseError(format!("{}: {}", path.display(), e)))?;

    Ok((toml_to_json(table), digest))
}

pub fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            Value::Object(table.into_iter().map(|(k, v)| (k, toml_to_json(v))).collect())
        }
    }
}

fn validate(config: &Value) -> Result<(), SettingsError> {
    if let Some(interval) = config.get("monkey_interval") {
        match interval.as_u64() {
            Some(ms) if ms > 0 && ms <= MAX_MONKEY_INTERVAL => {}
            _ => {
                return Err(SettingsError::ValidationError(format!(
                    "monkey_interval must be in (0, {}]",
                    MAX_MONKEY_INTERVAL
                )))
            }
        }
    }
    if let Some(features) = config.get("optional_features") {
        let all_bool = features
            .as_object()
            .is_some_and(|map| map.values().all(Value::is_boolean));
        if !all_bool {
            return Err(SettingsError::ValidationError(
                "optional_features must map feature names to true or false".to_string(),
            ));
        }
    }
    Ok(())
}

fn redact_secrets(value: &mut Value) -> Vec<String> {
    let mut redactions = Vec::new();
    redact_recursive(value, "", &mut redactions);
    redactions
}

fn redact_recursive(value: &mut Value, path: &str, redactions: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, item) in map.iter_mut() {
                let current = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                let lower = key.to_lowercase();
                let secret = SECRET_KEYS.iter().any(|s| lower.contains(s));
                if secret && !item.is_object() && !item.is_array() {
                    *item = Value::String("[REDACTED]".to_string());
                    redactions.push(current);
                } else {
                    redact_recursive(item, &current, redactions);
                }
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                redact_recursive(item, &format!("{}[{}]", path, i), redactions);
            }
        }
        _ => {}
    }
}
