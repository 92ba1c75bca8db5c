//! Fetches the display title ("uploader - title") for a pasted link.
//!
//! Failures here never reach the user; the label just falls back to the
//! placeholder.

use std::path::Path;
use tracing::{debug, warn};

use crate::{model::VideoMetadata, runner::CommandRunner};

pub const TITLE_PLACEHOLDER: &str = "Paste a link to fetch the title…";

/// What a finished fetch reports to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedTitle {
    /// `None` means the title could not be determined
    pub display: Option<String>,
    pub thumbnail_url: Option<String>,
}

pub fn json_query_args(url: &str) -> Vec<String> {
    ["--dump-single-json", "--no-playlist", "--skip-download", "--no-warnings", url]
        .map(str::to_owned)
        .to_vec()
}

pub fn print_query_args(field: &str, url: &str) -> Vec<String> {
    ["--no-playlist", "--skip-download", "--no-warnings", "--print", field, url]
        .map(str::to_owned)
        .to_vec()
}

pub fn display_title(title: &str, uploader: Option<&str>) -> String {
    match uploader {
        Some(uploader) => format!("{uploader} - {title}"),
        None => title.to_owned(),
    }
}

/// Parses the first stdout line as the tool's JSON record.
pub fn parse_metadata(stdout: &str) -> Option<VideoMetadata> {
    let first = stdout.lines().next()?;
    match serde_json::from_str::<VideoMetadata>(first) {
        Ok(meta) => Some(meta),
        Err(err) => {
            debug!(error = %err, "metadata JSON did not parse");
            None
        }
    }
}

/// JSON query first; on failure, separate plain-text title and uploader
/// queries.
pub async fn fetch_title<R>(tool: &Path, url: &str, runner: &R) -> FetchedTitle
where
    R: CommandRunner + ?Sized,
{
    match runner.run(tool, &json_query_args(url)).await {
        Ok(out) if out.success() => {
            if let Some(meta) = parse_metadata(&out.stdout) {
                if let Some(title) = non_blank(meta.title.as_deref()) {
                    return FetchedTitle {
                        display: Some(display_title(title, meta.uploader_name())),
                        thumbnail_url: meta.thumbnail.clone(),
                    };
                }
            }
        }
        Ok(out) => debug!(code = ?out.code, "metadata query failed"),
        Err(err) => warn!(error = %err, "could not run metadata query"),
    }

    let title = print_field(tool, "title", url, runner).await;
    let uploader = print_field(tool, "uploader", url, runner).await;
    FetchedTitle {
        display: title.map(|t| display_title(&t, uploader.as_deref())),
        thumbnail_url: None,
    }
}

async fn print_field<R>(tool: &Path, field: &str, url: &str, runner: &R) -> Option<String>
where
    R: CommandRunner + ?Sized,
{
    let out = runner.run(tool, &print_query_args(field, url)).await.ok()?;
    if !out.success() {
        return None;
    }
    // yt-dlp prints "NA" for fields it doesn't know
    non_blank(out.stdout.lines().next())
        .filter(|v| *v != "NA")
        .map(str::to_owned)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::ScriptedRunner;
    use std::io;

    const URL: &str = "https://www.youtube.com/watch?v=abc";

    async fn fetch(runner: &ScriptedRunner) -> FetchedTitle {
        fetch_title(Path::new("/usr/bin/yt-dlp"), URL, runner).await
    }

    #[tokio::test]
    async fn json_with_uploader() {
        let runner = ScriptedRunner::new().answer(0, r#"{"title":"T","uploader":"U"}"#);
        assert_eq!(fetch(&runner).await.display.as_deref(), Some("U - T"));
        assert_eq!(runner.call_count(), 1);
        assert_eq!(runner.args_of(0), json_query_args(URL));
    }

    #[tokio::test]
    async fn json_without_uploader() {
        let runner = ScriptedRunner::new().answer(0, r#"{"title":"T"}"#);
        assert_eq!(fetch(&runner).await.display.as_deref(), Some("T"));
    }

    #[tokio::test]
    async fn uploader_preference_order() {
        let runner = ScriptedRunner::new()
            .answer(0, r#"{"title":"T","uploader_id":"@id","channel":"Chan"}"#);
        assert_eq!(fetch(&runner).await.display.as_deref(), Some("@id - T"));

        let runner = ScriptedRunner::new().answer(0, r#"{"title":"T","uploader":"","channel":"Chan"}"#);
        assert_eq!(fetch(&runner).await.display.as_deref(), Some("Chan - T"));
    }

    #[tokio::test]
    async fn only_first_line_is_parsed() {
        let runner = ScriptedRunner::new()
            .answer(0, "{\"title\":\"T\",\"thumbnail\":\"https://i.ytimg.com/x.jpg\"}\nWARNING: junk\n");
        let fetched = fetch(&runner).await;
        assert_eq!(fetched.display.as_deref(), Some("T"));
        assert_eq!(fetched.thumbnail_url.as_deref(), Some("https://i.ytimg.com/x.jpg"));
    }

    #[tokio::test]
    async fn failed_json_issues_exactly_two_fallbacks() {
        let runner = ScriptedRunner::new()
            .answer(1, "")
            .answer(0, "Fallback Title\n")
            .answer(0, "Someone\n");

        let fetched = fetch(&runner).await;

        assert_eq!(runner.call_count(), 3);
        assert_eq!(runner.args_of(1), print_query_args("title", URL));
        assert_eq!(runner.args_of(2), print_query_args("uploader", URL));
        assert_eq!(fetched.display.as_deref(), Some("Someone - Fallback Title"));
        assert_eq!(fetched.thumbnail_url, None);
    }

    #[tokio::test]
    async fn unparsable_json_falls_back() {
        let runner = ScriptedRunner::new()
            .answer(0, "not json\n")
            .answer(0, "T\n")
            .answer(0, "NA\n");
        assert_eq!(fetch(&runner).await.display.as_deref(), Some("T"));
        assert_eq!(runner.call_count(), 3);
    }

    #[tokio::test]
    async fn everything_failing_degrades_to_none() {
        let runner = ScriptedRunner::new()
            .answer(1, "")
            .answer(1, "")
            .fail(io::ErrorKind::PermissionDenied);
        let fetched = fetch(&runner).await;
        assert_eq!(fetched.display, None);
        assert_eq!(runner.call_count(), 3);
    }
}
