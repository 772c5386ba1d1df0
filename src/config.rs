use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::traits::FileSystem;

/// Optional per-project settings file, looked up in the project root
pub const CONFIG_FILE: &str = ".migrate-import.yaml";

/// Importer settings; every key is optional in the YAML file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImporterConfig {
    /// Destination directory, relative to the project root
    pub migrations_dir: String,

    /// Directory looked up under every package source root and module
    pub source_dir: String,

    /// Project-local modules directory, relative to the project root
    pub modules_dir: String,

    /// Case-sensitive substrings; matching file names are never imported
    pub exclude: Vec<String>,

    /// External migrations tool
    pub tool: ToolConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolConfig {
    pub enabled: bool,

    /// Executable path, relative to the vendor directory
    pub binary: String,

    /// Tool configuration file, relative to the project root
    pub config_file: String,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            migrations_dir: "db/migrations".to_string(),
            source_dir: "db/migrations".to_string(),
            modules_dir: "modules".to_string(),
            exclude: vec!["_mysql.php".to_string()],
            tool: ToolConfig::default(),
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            binary: "robmorgan/phinx/bin/phinx".to_string(),
            config_file: "phinx.yml".to_string(),
        }
    }
}

impl ImporterConfig {
    /// Load `.migrate-import.yaml` from the project root, or defaults if absent
    pub fn load(fs: &dyn FileSystem, project_root: &Path) -> Result<Self> {
        let path = project_root.join(CONFIG_FILE);
        if !fs.exists(&path) {
            return Ok(Self::default());
        }

        let content = fs.read_to_string(&path)?;
        // An empty file deserializes to null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    pub fn migrations_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.migrations_dir)
    }

    pub fn modules_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.modules_dir)
    }
}
