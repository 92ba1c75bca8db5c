//! Finds the yt-dlp executable.
//!
//! Resolution order, first hit wins:
//! 1. the user's configured path,
//! 2. the usual install location for the platform,
//! 3. a `where`/`which` lookup run as a child process.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::{probe::PathProbe, runner::CommandRunner};

pub const TOOL_NAME: &str = "yt-dlp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Where package managers usually drop the binary.
    pub fn default_install_path(self) -> &'static str {
        match self {
            Platform::MacOs => "/opt/homebrew/bin/yt-dlp",
            Platform::Windows => r"C:\ProgramData\chocolatey\bin\yt-dlp.exe",
            Platform::Linux => "/usr/local/bin/yt-dlp",
        }
    }

    fn lookup_program(self) -> &'static str {
        match self {
            Platform::Windows => "where",
            Platform::MacOs | Platform::Linux => "which",
        }
    }
}

/// Resolves the executable, or `None` when every step misses.
pub async fn locate<P, R>(
    configured: Option<&str>,
    platform: Platform,
    probe: &P,
    runner: &R,
) -> Option<PathBuf>
where
    P: PathProbe + ?Sized,
    R: CommandRunner + ?Sized,
{
    if let Some(path) = configured.map(str::trim).filter(|p| !p.is_empty()) {
        let path = PathBuf::from(path);
        if probe.is_file(&path) {
            info!(path = %path.display(), "using configured yt-dlp");
            return Some(path);
        }
        debug!(path = %path.display(), "configured yt-dlp path does not exist");
    }

    let default = PathBuf::from(platform.default_install_path());
    if probe.is_file(&default) {
        info!(path = %default.display(), "using default yt-dlp location");
        return Some(default);
    }

    let found = system_lookup(platform, probe, runner).await;
    match &found {
        Some(path) => info!(path = %path.display(), "found yt-dlp on PATH"),
        None => info!("yt-dlp could not be located"),
    }
    found
}

async fn system_lookup<P, R>(platform: Platform, probe: &P, runner: &R) -> Option<PathBuf>
where
    P: PathProbe + ?Sized,
    R: CommandRunner + ?Sized,
{
    let program = Path::new(platform.lookup_program());
    let output = match runner.run(program, &[TOOL_NAME.to_owned()]).await {
        Ok(output) => output,
        Err(err) => {
            debug!(error = %err, "PATH lookup could not run");
            return None;
        }
    };
    if !output.success() {
        return None;
    }
    let candidate = output
        .stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(PathBuf::from)?;
    probe.is_file(&candidate).then_some(candidate)
}

/// `None`, or a resolved path that has gone missing since, both mean the
/// tool is unavailable.
pub fn available<'a, P: PathProbe + ?Sized>(resolved: Option<&'a Path>, probe: &P) -> Option<&'a Path> {
    resolved.filter(|p| !p.as_os_str().is_empty() && probe.is_file(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{probe::fake::FakeProbe, runner::fake::ScriptedRunner};
    use std::io;

    #[tokio::test]
    async fn configured_path_wins() {
        let probe = FakeProbe::default()
            .with_file("/home/me/bin/yt-dlp")
            .with_file("/opt/homebrew/bin/yt-dlp");
        let runner = ScriptedRunner::new();

        let found = locate(Some("/home/me/bin/yt-dlp"), Platform::MacOs, &probe, &runner).await;

        assert_eq!(found, Some(PathBuf::from("/home/me/bin/yt-dlp")));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_configured_path_falls_through_to_default() {
        let probe = FakeProbe::default().with_file("/opt/homebrew/bin/yt-dlp");
        let runner = ScriptedRunner::new();

        let found = locate(Some("/nope/yt-dlp"), Platform::MacOs, &probe, &runner).await;

        assert_eq!(found, Some(PathBuf::from("/opt/homebrew/bin/yt-dlp")));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn blank_configured_path_is_ignored() {
        let probe = FakeProbe::default().with_file("/usr/local/bin/yt-dlp");
        let runner = ScriptedRunner::new();

        let found = locate(Some("   "), Platform::Linux, &probe, &runner).await;

        assert_eq!(found, Some(PathBuf::from("/usr/local/bin/yt-dlp")));
    }

    #[tokio::test]
    async fn windows_uses_where_and_first_line() {
        let probe = FakeProbe::default().with_file(r"C:\tools\yt-dlp.exe");
        let runner = ScriptedRunner::new().answer(0, "C:\\tools\\yt-dlp.exe\r\nC:\\other\\yt-dlp.exe\r\n");

        let found = locate(None, Platform::Windows, &probe, &runner).await;

        assert_eq!(found, Some(PathBuf::from(r"C:\tools\yt-dlp.exe")));
        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[0].0, "where");
        assert_eq!(calls[0].1, vec!["yt-dlp".to_string()]);
    }

    #[tokio::test]
    async fn lookup_result_must_exist() {
        let probe = FakeProbe::default();
        let runner = ScriptedRunner::new().answer(0, "/ghost/yt-dlp\n");

        assert_eq!(locate(None, Platform::Linux, &probe, &runner).await, None);
    }

    #[tokio::test]
    async fn lookup_failures_resolve_to_none() {
        let probe = FakeProbe::default();

        let not_found = ScriptedRunner::new().answer(1, "");
        assert_eq!(locate(None, Platform::Linux, &probe, &not_found).await, None);

        let no_which = ScriptedRunner::new().fail(io::ErrorKind::NotFound);
        assert_eq!(locate(None, Platform::MacOs, &probe, &no_which).await, None);
    }

    #[test]
    fn availability_rechecks_the_filesystem() {
        let probe = FakeProbe::default().with_file("/usr/bin/yt-dlp");
        assert!(available(Some(Path::new("/usr/bin/yt-dlp")), &probe).is_some());
        assert!(available(Some(Path::new("/gone/yt-dlp")), &probe).is_none());
        assert!(available(Some(Path::new("")), &probe).is_none());
        assert!(available(None, &probe).is_none());
    }

    #[test]
    fn default_paths_differ_per_platform() {
        let paths = [Platform::MacOs, Platform::Windows, Platform::Linux]
            .map(Platform::default_install_path);
        assert_ne!(paths[0], paths[1]);
        assert_ne!(paths[1], paths[2]);
        assert_ne!(paths[0], paths[2]);
    }
}
