//! Serializable engine settings.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{RefactorError, Result};
use crate::refactor::DEFAULT_PLACEHOLDER;

/// Settings for the introduce-variable refactoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Name given to the new binding before it is renamed.
    pub placeholder_name: String,

    /// Skip the target chooser when only one expression is extractable.
    pub auto_select_single_candidate: bool,

    /// Lines of context around each hunk in diff previews.
    pub diff_context_lines: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            placeholder_name: DEFAULT_PLACEHOLDER.to_string(),
            auto_select_single_candidate: true,
            diff_context_lines: 3,
        }
    }
}

impl ExtractConfig {
    pub fn with_placeholder(mut self, name: impl Into<String>) -> Self {
        self.placeholder_name = name.into();
        self
    }

    /// Always show the chooser, even for a single candidate.
    pub fn always_choose(mut self) -> Self {
        self.auto_select_single_candidate = false;
        self
    }

    pub fn with_diff_context(mut self, lines: usize) -> Self {
        self.diff_context_lines = lines;
        self
    }

    /// Load config from a file, picking the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(path),
            Some("json") => Self::from_json(path),
            other => Err(RefactorError::InvalidConfig(format!(
                "Unsupported config format: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    /// Load config from a YAML file.
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_yaml::from_str(&content).map_err(|e| {
            RefactorError::InvalidConfig(format!("Failed to parse YAML config: {}", e))
        })
    }

    /// Load config from a JSON file.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_json::from_str(&content).map_err(|e| {
            RefactorError::InvalidConfig(format!("Failed to parse JSON config: {}", e))
        })
    }

    /// Save config to a YAML file.
    pub fn to_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(|e| {
            RefactorError::InvalidConfig(format!("Failed to serialize config: {}", e))
        })?;
        write_config(path.as_ref(), &content)
    }

    /// Save config to a JSON file.
    pub fn to_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        write_config(path.as_ref(), &content)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        RefactorError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read config file: {}", e),
        ))
    })
}

fn write_config(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| {
        RefactorError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to write config file: {}", e),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ExtractConfig::default();
        assert_eq!(config.placeholder_name, "i");
        assert!(config.auto_select_single_candidate);
        assert_eq!(config.diff_context_lines, 3);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: ExtractConfig = serde_yaml::from_str("placeholder_name: value\n").unwrap();
        assert_eq!(config.placeholder_name, "value");
        assert!(config.auto_select_single_candidate);
    }

    #[test]
    fn test_load_by_extension() {
        let dir = TempDir::new().unwrap();
        let config = ExtractConfig::default()
            .with_placeholder("tmp")
            .always_choose()
            .with_diff_context(1);

        let yaml = dir.path().join("introduce.yaml");
        config.to_yaml(&yaml).unwrap();
        assert_eq!(ExtractConfig::load(&yaml).unwrap(), config);

        let json = dir.path().join("introduce.json");
        config.to_json(&json).unwrap();
        assert_eq!(ExtractConfig::load(&json).unwrap(), config);
    }

    #[test]
    fn test_load_unknown_format() {
        let result = ExtractConfig::load("introduce.toml");
        assert!(matches!(result, Err(RefactorError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yml");
        std::fs::write(&path, "placeholder_name: [unclosed").unwrap();

        let result = ExtractConfig::load(&path);
        assert!(matches!(result, Err(RefactorError::InvalidConfig(_))));
    }
}
