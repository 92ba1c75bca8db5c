//! The remembered output folder.
//!
//! The stored path is only trusted after checking it still exists; a folder
//! that vanished is cleared from both the form and storage, and the reset key
//! is bumped so the picker widget forgets its selection.

use std::path::Path;
use tracing::info;

use crate::{probe::PathProbe, storage::KeyValueStore};

pub const STORAGE_KEY: &str = "downloadDirectory";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputDirectory {
    current: String,
    reset_key: u64,
}

impl OutputDirectory {
    pub fn load<S, P>(store: &mut S, probe: &P) -> Self
    where
        S: KeyValueStore + ?Sized,
        P: PathProbe + ?Sized,
    {
        let mut dir = Self::default();
        match store.get(STORAGE_KEY) {
            Some(saved) if !saved.is_empty() && probe.is_dir(Path::new(&saved)) => {
                dir.current = saved;
            }
            Some(saved) => {
                info!(path = %saved, "saved download folder is gone, forgetting it");
                store.remove(STORAGE_KEY);
            }
            None => {}
        }
        dir
    }

    /// Applies a new selection from the picker (empty means cleared).
    pub fn set<S, P>(&mut self, value: &str, store: &mut S, probe: &P)
    where
        S: KeyValueStore + ?Sized,
        P: PathProbe + ?Sized,
    {
        if value.is_empty() {
            self.current.clear();
            store.remove(STORAGE_KEY);
            self.reset_key += 1;
        } else if probe.is_dir(Path::new(value)) {
            self.current = value.to_owned();
            store.set(STORAGE_KEY, value);
        } else {
            info!(path = %value, "picked folder does not exist");
            self.current.clear();
            store.remove(STORAGE_KEY);
            self.reset_key += 1;
        }
    }

    /// Re-checks the live value against disk and self-heals if it vanished.
    /// Returns the folder when it is still usable.
    pub fn revalidate<S, P>(&mut self, store: &mut S, probe: &P) -> Option<&str>
    where
        S: KeyValueStore + ?Sized,
        P: PathProbe + ?Sized,
    {
        if self.current.is_empty() {
            return None;
        }
        if !probe.is_dir(Path::new(&self.current)) {
            let stale = std::mem::take(&mut self.current);
            self.set(&stale, store, probe);
            return None;
        }
        Some(&self.current)
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn reset_key(&self) -> u64 {
        self.reset_key
    }
}
