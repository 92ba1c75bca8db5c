//! State behind the launcher form, kept free of egui so it can be tested.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{
    directory::OutputDirectory,
    downloader::{self, DownloadRequest},
    error::PreconditionError,
    locator,
    metadata::{FetchedTitle, TITLE_PLACEHOLDER},
    probe::PathProbe,
    storage::KeyValueStore,
    validation::is_youtube_url,
};

/// A title lookup the UI should start in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleFetch {
    pub generation: u64,
    pub tool: PathBuf,
    pub url: String,
}

#[derive(Debug)]
pub struct LauncherForm {
    pub url: String,
    title: String,
    generation: u64,
    pub output_dir: OutputDirectory,
    tool: Option<PathBuf>,
    busy: bool,
}

impl LauncherForm {
    pub fn new(output_dir: OutputDirectory, tool: Option<PathBuf>) -> Self {
        Self {
            url: String::new(),
            title: TITLE_PLACEHOLDER.to_owned(),
            generation: 0,
            output_dir,
            tool,
            busy: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Bumped on every URL edit; tags title and thumbnail lookups.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tool(&self) -> Option<&Path> {
        self.tool.as_deref()
    }

    pub fn set_tool(&mut self, tool: Option<PathBuf>) {
        self.tool = tool;
    }

    /// True while a download process is running; submit is disabled then.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Call after the URL field changed. Returns the lookup to run, if the
    /// link looks like YouTube and the tool is available.
    pub fn url_changed<P: PathProbe + ?Sized>(&mut self, probe: &P) -> Option<TitleFetch> {
        self.generation += 1;
        self.title = TITLE_PLACEHOLDER.to_owned();
        if !is_youtube_url(&self.url) {
            return None;
        }
        let tool = locator::available(self.tool.as_deref(), probe)?;
        Some(TitleFetch {
            generation: self.generation,
            tool: tool.to_path_buf(),
            url: self.url.trim().to_owned(),
        })
    }

    /// Applies a finished lookup. Answers for an older URL are dropped;
    /// returns whether this one was applied.
    pub fn title_fetched(&mut self, generation: u64, fetched: &FetchedTitle) -> bool {
        if generation != self.generation {
            debug!(generation, latest = self.generation, "dropping stale title");
            return false;
        }
        self.title = fetched
            .display
            .clone()
            .unwrap_or_else(|| TITLE_PLACEHOLDER.to_owned());
        true
    }

    /// Picker changed (empty string when cleared).
    pub fn set_directory<S, P>(&mut self, value: &str, store: &mut S, probe: &P)
    where
        S: KeyValueStore + ?Sized,
        P: PathProbe + ?Sized,
    {
        self.output_dir.set(value, store, probe);
    }

    /// Validates everything and marks the form busy on success.
    pub fn submit<S, P>(&mut self, store: &mut S, probe: &P) -> Result<DownloadRequest, PreconditionError>
    where
        S: KeyValueStore + ?Sized,
        P: PathProbe + ?Sized,
    {
        if self.busy {
            return Err(PreconditionError::Busy);
        }
        let dir = self
            .output_dir
            .revalidate(store, probe)
            .unwrap_or_default()
            .to_owned();
        let req = downloader::check_preconditions(self.tool.as_deref(), &self.url, &dir, probe)?;
        self.busy = true;
        Ok(req)
    }

    pub fn download_finished(&mut self) {
        self.busy = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{directory::STORAGE_KEY, probe::fake::FakeProbe, storage::fake::MemoryStore};

    const TOOL: &str = "/usr/bin/yt-dlp";
    const URL: &str = "https://www.youtube.com/watch?v=abc";

    fn ready_form(probe: &FakeProbe, store: &mut MemoryStore) -> LauncherForm {
        let mut form = LauncherForm::new(OutputDirectory::load(store, probe), Some(PathBuf::from(TOOL)));
        form.set_directory("/music", store, probe);
        form
    }

    fn probe() -> FakeProbe {
        FakeProbe::default().with_file(TOOL).with_dir("/music")
    }

    fn fetched(title: &str) -> FetchedTitle {
        FetchedTitle {
            display: Some(title.to_owned()),
            thumbnail_url: None,
        }
    }

    #[test]
    fn non_urls_never_trigger_a_fetch() {
        let probe = probe();
        let mut store = MemoryStore::default();
        let mut form = ready_form(&probe, &mut store);

        for input in ["", "hello", "youtube.com/watch?v=1", "https://vimeo.com/1"] {
            form.url = input.to_owned();
            assert_eq!(form.url_changed(&probe), None, "{input}");
            assert_eq!(form.title(), TITLE_PLACEHOLDER);
        }
    }

    #[test]
    fn youtube_url_triggers_fetch_only_with_tool() {
        let probe = probe();
        let mut store = MemoryStore::default();
        let mut form = ready_form(&probe, &mut store);
        form.url = format!(" {URL} ");

        let fetch = form.url_changed(&probe).unwrap();
        assert_eq!(fetch.url, URL);
        assert_eq!(fetch.tool, PathBuf::from(TOOL));

        form.set_tool(None);
        assert_eq!(form.url_changed(&probe), None);
    }

    #[test]
    fn stale_titles_are_dropped() {
        let probe = probe();
        let mut store = MemoryStore::default();
        let mut form = ready_form(&probe, &mut store);

        form.url = URL.to_owned();
        let first = form.url_changed(&probe).unwrap();
        form.url = "https://youtu.be/other".to_owned();
        let second = form.url_changed(&probe).unwrap();

        assert!(form.title_fetched(second.generation, &fetched("U - Second")));
        assert!(!form.title_fetched(first.generation, &fetched("U - First")));
        assert_eq!(form.title(), "U - Second");
    }

    #[test]
    fn failed_fetch_shows_placeholder() {
        let probe = probe();
        let mut store = MemoryStore::default();
        let mut form = ready_form(&probe, &mut store);
        form.url = URL.to_owned();
        let fetch = form.url_changed(&probe).unwrap();

        form.title_fetched(fetch.generation, &FetchedTitle { display: None, thumbnail_url: None });

        assert_eq!(form.title(), TITLE_PLACEHOLDER);
    }

    #[test]
    fn submit_without_tool_fails_once_and_stays_idle() {
        let probe = probe();
        let mut store = MemoryStore::default();
        let mut form = ready_form(&probe, &mut store);
        form.set_tool(None);
        form.url = URL.to_owned();

        let err = form.submit(&mut store, &probe).unwrap_err();

        assert_eq!(err, PreconditionError::ToolUnavailable);
        assert!(err.to_string().contains("yt-dlp"));
        assert!(!form.is_busy());
    }

    #[test]
    fn submit_guards_against_reentry() {
        let probe = probe();
        let mut store = MemoryStore::default();
        let mut form = ready_form(&probe, &mut store);
        form.url = URL.to_owned();

        let req = form.submit(&mut store, &probe).unwrap();
        assert_eq!(req.directory, PathBuf::from("/music"));
        assert!(form.is_busy());
        assert_eq!(form.submit(&mut store, &probe), Err(PreconditionError::Busy));

        form.download_finished();
        assert!(form.submit(&mut store, &probe).is_ok());
    }

    #[test]
    fn submit_heals_deleted_folder() {
        let probe = probe();
        let mut store = MemoryStore::default();
        let mut form = ready_form(&probe, &mut store);
        form.url = URL.to_owned();
        let key = form.output_dir.reset_key();

        probe.remove_dir("/music");

        assert_eq!(form.submit(&mut store, &probe), Err(PreconditionError::InvalidDirectory));
        assert_eq!(form.output_dir.current(), "");
        assert_eq!(form.output_dir.reset_key(), key + 1);
        assert_eq!(store.get(STORAGE_KEY), None);
    }
}
