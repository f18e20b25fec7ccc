use crate::error::{PadError, PadResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "PngPadder";
const CONFIG_FILE_NAME: &str = "config.json";
const MAX_RECENT_DIRECTORIES: usize = 10;

pub const DEFAULT_MULTIPLE: u32 = 4;
pub const DEFAULT_PATTERN: &str = "*.png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub multiple: u32,
    pub centered: bool,
    pub pattern: String,
    /// Most recent first.
    pub recent_directories: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            multiple: DEFAULT_MULTIPLE,
            centered: false,
            pattern: DEFAULT_PATTERN.to_string(),
            recent_directories: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Missing or unreadable config is not an error; callers fall back to defaults.
    pub fn load(path: &Path) -> Option<Self> {
        if !path.exists() {
            log::debug!("Config file does not exist at {}", path.display());
            return None;
        }
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
                Ok(config) => {
                    log::debug!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read config {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> PadResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| PadError::ConfigWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| PadError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn remember_directory(&mut self, dir: &Path) {
        let dir = dir.to_string_lossy().to_string();
        self.recent_directories.retain(|existing| *existing != dir);
        self.recent_directories.insert(0, dir);
        self.recent_directories.truncate(MAX_RECENT_DIRECTORIES);
    }

    pub fn last_directory(&self) -> Option<PathBuf> {
        self.recent_directories.first().map(PathBuf::from)
    }
}
