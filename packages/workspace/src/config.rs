use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use blockpad_editor::DEFAULT_HISTORY_LIMIT;

use crate::WorkspaceResult;

pub const DEFAULT_CONFIG_NAME: &str = "blockpad.config.json";

/// Blockpad workspace configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Directory (relative to the workspace root) holding saved documents
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Store key of the document this workspace edits
    #[serde(default = "default_document_key")]
    pub document_key: String,

    /// Maximum number of undo entries (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Quiet period before a change is written to the store
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,
}

fn default_store_dir() -> String {
    ".blockpad".to_string()
}

fn default_document_key() -> String {
    "document".to_string()
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_autosave_delay_ms() -> u64 {
    2000
}

impl WorkspaceConfig {
    /// Load config from a directory, falling back to defaults
    pub fn load(dir: &Path) -> WorkspaceResult<Self> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: WorkspaceConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(WorkspaceConfig::default())
        }
    }

    /// Write config into a directory
    pub fn save(&self, dir: &Path) -> WorkspaceResult<PathBuf> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);
        std::fs::write(&config_path, serde_json::to_string_pretty(self)?)?;
        Ok(config_path)
    }

    /// Get absolute path to the store directory
    pub fn get_store_dir(&self, dir: &Path) -> PathBuf {
        dir.join(&self.store_dir)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            document_key: default_document_key(),
            history_limit: default_history_limit(),
            autosave_delay_ms: default_autosave_delay_ms(),
        }
    }
}
