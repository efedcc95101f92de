use pagecraft_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

/// Pagecraft configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding the page store and local snapshots
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Default user when neither --user nor PAGECRAFT_USER is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Session tuning
    #[serde(default)]
    pub editor: EditorConfig,
}

fn default_data_dir() -> String {
    ".pagecraft".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the data directory
    pub fn get_data_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.data_dir)
    }

    /// Root of the file-backed document store
    pub fn get_store_dir(&self, cwd: &str) -> PathBuf {
        self.get_data_dir(cwd).join("store")
    }

    /// File backing the device-local snapshot store
    pub fn get_local_store_path(&self, cwd: &str) -> PathBuf {
        self.get_data_dir(cwd).join("local.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            user: None,
            editor: EditorConfig::default(),
        }
    }
}
