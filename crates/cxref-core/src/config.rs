//! Persistent configuration for cxref.
//!
//! Loads/saves a TOML config at `~/.cxref/config.toml`.

use crate::IndexError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Indexing configuration shared by the driver and the directory pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Drop declarations that come from system headers instead of indexing
    /// them. References into system headers still record usages.
    pub skip_system_symbols: bool,
    /// File extensions the pipeline treats as C-family translation units.
    pub extensions: Vec<String>,
    /// Whether the directory walk respects `.gitignore` rules.
    pub follow_gitignore: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            skip_system_symbols: false,
            extensions: ["c", "h", "cc", "cpp", "cxx", "hpp", "hxx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            follow_gitignore: true,
        }
    }
}

impl IndexConfig {
    /// Load configuration from the given path.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| IndexError::Config(e.to_string()))
    }

    /// Save configuration to the given path, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        let content = toml::to_string_pretty(self).map_err(|e| IndexError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default path, or return defaults if the file doesn't
    /// exist or fails to parse.
    pub fn load_or_default() -> Self {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Default config path: `~/.cxref/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cxref")
            .join("config.toml")
    }

    /// Whether `ext` names a supported translation-unit extension.
    pub fn supports_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrips_through_toml() {
        let config = IndexConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).expect("default config should serialize to TOML");
        let parsed: IndexConfig = toml::from_str(&toml_str).expect("serialized TOML should parse");
        assert!(!parsed.skip_system_symbols);
        assert!(parsed.supports_extension("cc"));
        assert!(!parsed.supports_extension("rs"));
    }

    #[test]
    fn partial_toml_uses_defaults_for_missing_fields() {
        let partial = "skip_system_symbols = true\n";
        let config: IndexConfig = toml::from_str(partial).expect("partial TOML should parse");
        assert!(config.skip_system_symbols);
        assert!(config.follow_gitignore);
        assert!(config.supports_extension("hpp"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("cxref_config_test");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.toml");

        let mut config = IndexConfig::default();
        config.skip_system_symbols = true;
        config.extensions.push("ixx".to_string());

        config.save(&path).expect("save should succeed");
        let loaded = IndexConfig::load(&path).expect("load should succeed");

        assert!(loaded.skip_system_symbols);
        assert!(loaded.supports_extension("ixx"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_nonexistent_returns_error() {
        let result = IndexConfig::load(Path::new("/tmp/nonexistent_cxref_config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn default_path_ends_with_config_toml() {
        let path = IndexConfig::default_path();
        assert!(path.ends_with("config.toml"));
    }
}
