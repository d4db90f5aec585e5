//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Project-local config file, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = ".schemaform.yaml";

/// schemaform configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Default schema document path
    pub schema: Option<PathBuf>,

    /// Default prefill locator
    pub prefill: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Run the meta-schema pre-check when loading schemas
    pub strict_schema: Option<bool>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/schemaform/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (./.schemaform.yaml)
        if let Ok(cwd) = std::env::current_dir() {
            if let Some(project) = Self::read_file(&cwd.join(PROJECT_CONFIG_FILE)) {
                config.merge(project);
            }
        }

        // 4. Environment variables
        config.apply_env(|key| std::env::var(key).ok());

        config
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "schemaform")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Read one config layer; a missing or malformed file contributes nothing
    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    /// Overlay environment variables read through `lookup`
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(schema) = lookup("SCHEMAFORM_SCHEMA") {
            self.schema = Some(PathBuf::from(schema));
        }
        if let Some(prefill) = lookup("SCHEMAFORM_PREFILL") {
            self.prefill = Some(prefill);
        }
        if let Some(format) = lookup("SCHEMAFORM_FORMAT") {
            self.default_format = Some(format);
        }
        if let Some(strict) = lookup("SCHEMAFORM_STRICT_SCHEMA") {
            self.strict_schema = Some(!matches!(strict.to_lowercase().as_str(), "0" | "false" | "no" | "off"));
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.schema.is_some() {
            self.schema = other.schema;
        }
        if other.prefill.is_some() {
            self.prefill = other.prefill;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.strict_schema.is_some() {
            self.strict_schema = other.strict_schema;
        }
    }

    /// Whether the meta-schema pre-check is enabled (default: yes)
    pub fn strict_schema(&self) -> bool {
        self.strict_schema.unwrap_or(true)
    }
}
