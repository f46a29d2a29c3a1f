//! Select configuration
//!
//! Names of the embedded skeleton sub-object and its fields. Every stored
//! document carries the skeleton under `skeleton_key`; the dotted paths
//! derived here are what the operator registry and the tree query generator
//! treat as reserved boundary fields.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Select pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectConfig {
    /// Key of the skeleton sub-object (default: "_digger")
    #[serde(default = "default_skeleton_key")]
    pub skeleton_key: String,

    /// Unique id field inside the skeleton (default: "diggerid")
    #[serde(default = "default_id_key")]
    pub id_key: String,

    /// Parent id field inside the skeleton (default: "diggerparentid")
    #[serde(default = "default_parent_key")]
    pub parent_key: String,

    /// Left nested-set bound (default: "left")
    #[serde(default = "default_left_key")]
    pub left_key: String,

    /// Right nested-set bound (default: "right")
    #[serde(default = "default_right_key")]
    pub right_key: String,

    /// Prefix passed to the tree query generator (default: "")
    #[serde(default)]
    pub tree_prefix: String,
}

fn default_skeleton_key() -> String {
    "_digger".to_string()
}

fn default_id_key() -> String {
    "diggerid".to_string()
}

fn default_parent_key() -> String {
    "diggerparentid".to_string()
}

fn default_left_key() -> String {
    "left".to_string()
}

fn default_right_key() -> String {
    "right".to_string()
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            skeleton_key: default_skeleton_key(),
            id_key: default_id_key(),
            parent_key: default_parent_key(),
            left_key: default_left_key(),
            right_key: default_right_key(),
            tree_prefix: String::new(),
        }
    }
}

impl SelectConfig {
    /// Parse a config from a JSON string. Missing keys take their defaults.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a config from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Dotted path of the left boundary field, e.g. `_digger.left`
    pub fn left_field(&self) -> String {
        self.skeleton_path(&self.left_key)
    }

    /// Dotted path of the right boundary field, e.g. `_digger.right`
    pub fn right_field(&self) -> String {
        self.skeleton_path(&self.right_key)
    }

    /// Dotted path of the id field
    pub fn id_field(&self) -> String {
        self.skeleton_path(&self.id_key)
    }

    fn skeleton_path(&self, key: &str) -> String {
        format!("{}.{}", self.skeleton_key, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SelectConfig::default();
        assert_eq!(config.skeleton_key, "_digger");
        assert_eq!(config.left_field(), "_digger.left");
        assert_eq!(config.right_field(), "_digger.right");
        assert_eq!(config.id_field(), "_digger.diggerid");
        assert!(config.tree_prefix.is_empty());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = SelectConfig::from_json(r#"{"skeleton_key": "_meta"}"#).unwrap();
        assert_eq!(config.skeleton_key, "_meta");
        assert_eq!(config.id_key, "diggerid");
        assert_eq!(config.left_field(), "_meta.left");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"left_key": "lft", "right_key": "rgt"}}"#).unwrap();

        let config = SelectConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.left_field(), "_digger.lft");
        assert_eq!(config.right_field(), "_digger.rgt");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = SelectConfig::from_json_file(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = SelectConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
