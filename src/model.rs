/// Toast style of a download notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownloadStatus {
    /// yt-dlp is still running
    InProgress,
    /// Process exited with code 0
    Success,
    /// Non-zero exit, signal, or the process never started
    Failure,
}

/// The notification that tracks one download from spawn to exit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadToast {
    /// Title line ("Downloading…", "Download complete", ...)
    pub title: String,
    /// Latest progress percentage or error text
    pub message: Option<String>,
    pub status: DownloadStatus,
}

/// What the download task reports back to the UI thread
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadEvent {
    /// A raw chunk from stdout or stderr
    Output(String),
    /// Process finished; `None` when killed by a signal
    Exited(Option<i32>),
    /// The process could not be started at all
    SpawnFailed(String),
}

/// Title and uploader as reported by yt-dlp's JSON dump
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub uploader_id: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl VideoMetadata {
    /// First non-blank of uploader, uploader_id, channel
    pub fn uploader_name(&self) -> Option<&str> {
        [&self.uploader, &self.uploader_id, &self.channel]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|name| !name.is_empty())
    }
}
