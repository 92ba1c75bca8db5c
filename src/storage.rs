//! Small persistent key-value store backed by one JSON file.

use directories::ProjectDirs;
use serde_json::{Map, Value};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

use crate::error::StorageError;

/// Per-user directories for this app.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "yt-mp3-downloader")
}

/// String slots that survive restarts. Every write goes straight to disk.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl LocalStorage {
    /// Opens `storage.json` in the per-user data directory.
    pub fn open_default() -> Result<Self, StorageError> {
        let dirs = project_dirs().ok_or(StorageError::NoDataDir)?;
        Ok(Self::open(dirs.data_dir().join("storage.json")))
    }

    /// A missing or unreadable file starts out empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Map<String, Value>>(&text) {
                Ok(map) => map,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "local storage is corrupt, starting empty");
                    Map::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "local storage unreadable, starting empty");
                Map::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        write_json_atomically(&self.path, &Value::Object(self.entries.clone()))
    }

    fn flush_or_warn(&self) {
        if let Err(err) = self.flush() {
            warn!(path = %self.path.display(), error = %err, "failed to write local storage");
        }
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key)?.as_str().map(str::to_owned)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), Value::String(value.to_owned()));
        self.flush_or_warn();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.flush_or_warn();
        }
    }
}

/// Writes to a sibling temp file and renames it over the target.
pub fn write_json_atomically(path: &Path, value: &Value) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
pub mod fake {
    use super::KeyValueStore;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    pub struct MemoryStore(pub HashMap<String, String>);

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }

        fn set(&mut self, key: &str, value: &str) {
            self.0.insert(key.to_owned(), value.to_owned());
        }

        fn remove(&mut self, key: &str) {
            self.0.remove(key);
        }
    }
}
