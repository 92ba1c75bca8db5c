//! User preferences.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

use crate::{
    error::StorageError,
    storage::{project_dirs, write_json_atomically},
};

/// Overrides the configured yt-dlp path when set.
pub const YTDLP_PATH_ENV: &str = "YT_MP3_YTDLP_PATH";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Explicit path to the yt-dlp executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yt_dlp_path: Option<String>,
}

impl Preferences {
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("preferences.json"))
    }

    /// Reads the preference file; missing or broken files give defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "ignoring malformed preferences");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        write_json_atomically(path, &serde_json::to_value(self)?)
    }

    /// The path the locator should try first, env var before file value.
    pub fn effective_yt_dlp_path(&self, env_override: Option<String>) -> Option<String> {
        env_override
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.yt_dlp_path.clone())
            .filter(|v| !v.trim().is_empty())
    }
}
