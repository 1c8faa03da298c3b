//! Named configurations that imports resolve against.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use walkdir::WalkDir;

use crate::configuration::Configuration;

/// File extension of configuration documents.
pub const EXTENSION: &str = "mnky";

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("There is no configuration called \"{name}\"")]
    NotFound { name: String },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to walk {path}: {message}")]
    WalkError { path: PathBuf, message: String },
}

/// Name → configuration lookup. Configurations are owned here and
/// referenced by everything that imports them.
#[derive(Debug, Default)]
pub struct Repository {
    configurations: IndexMap<String, Configuration<'static>>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.mnky` file below `root`. Names are the relative path
    /// without extension, `/`-separated.
    pub fn from_dir(root: &Path) -> Result<Self, RepositoryError> {
        let mut repository = Self::new();
        let mut entries = Vec::new();

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = entry.map_err(|e| RepositoryError::WalkError {
                path: root.to_path_buf(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == EXTENSION) {
                entries.push(path.to_path_buf());
            }
        }
        entries.sort();

        for path in entries {
            let Some(name) = configuration_name(root, &path) else {
                continue;
            };
            let content = fs::read_to_string(&path)?;
            tracing::debug!(name = %name, path = %path.display(), "loaded configuration");
            repository.insert(Configuration::new(name, content));
        }
        Ok(repository)
    }

    /// Add or replace a configuration under its own name.
    pub fn insert(&mut self, configuration: Configuration<'static>) {
        self.configurations
            .insert(configuration.name().to_string(), configuration);
    }

    pub fn find_by_name(&self, name: &str) -> Result<&Configuration<'static>, RepositoryError> {
        self.configurations
            .get(name)
            .ok_or_else(|| RepositoryError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn has_by_name(&self, name: &str) -> bool {
        self.configurations.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configurations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }
}

fn configuration_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
