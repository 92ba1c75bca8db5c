use std::path::Path;

/// Existence checks against the live filesystem.
///
/// Every stored or resolved path is re-checked through this on each read;
/// tests swap in a fixed set of paths.
pub trait PathProbe {
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OsProbe;

impl PathProbe for OsProbe {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
