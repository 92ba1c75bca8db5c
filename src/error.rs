use thiserror::Error;

/// Reasons a download is refused before anything is spawned.
///
/// The `Display` text is shown verbatim in the HUD.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("yt-dlp not found. Install it or set its path in Preferences")]
    ToolUnavailable,

    #[error("Paste a YouTube link first")]
    EmptyUrl,

    #[error("Choose an existing download folder")]
    InvalidDirectory,

    #[error("That link doesn't look valid")]
    InvalidUrl,

    #[error("A download is already running")]
    Busy,
}

/// Failures of the on-disk key-value store and preference file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no per-user data directory available")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
