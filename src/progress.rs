use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{DownloadEvent, DownloadStatus, DownloadToast};

static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,3}(?:\.\d+)?%").unwrap());

/// Last percentage in a chunk of yt-dlp output, e.g. `"45.0%"`.
pub fn parse_percent(chunk: &str) -> Option<&str> {
    PERCENT.find_iter(chunk).last().map(|m| m.as_str())
}

impl DownloadToast {
    pub fn started() -> Self {
        Self {
            title: "Downloading…".to_owned(),
            message: None,
            status: DownloadStatus::InProgress,
        }
    }

    /// Folds one event into the notification. Later percentages overwrite
    /// earlier ones, even if smaller.
    pub fn apply(&mut self, event: &DownloadEvent) {
        if self.status != DownloadStatus::InProgress {
            return;
        }
        match event {
            DownloadEvent::Output(chunk) => {
                if let Some(pct) = parse_percent(chunk) {
                    self.message = Some(pct.to_owned());
                }
            }
            DownloadEvent::Exited(Some(0)) => {
                self.status = DownloadStatus::Success;
                self.title = "Download complete".to_owned();
                self.message = None;
            }
            DownloadEvent::Exited(_) => {
                self.status = DownloadStatus::Failure;
                self.title = "Download failed".to_owned();
                self.message = None;
            }
            DownloadEvent::SpawnFailed(err) => {
                self.status = DownloadStatus::Failure;
                self.title = "Download failed".to_owned();
                self.message = Some(err.clone());
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status != DownloadStatus::InProgress
    }
}
