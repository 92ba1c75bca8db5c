use std::{
    path::{Path, PathBuf},
    process::Stdio,
};
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Command,
    sync::mpsc::UnboundedSender,
};
use tracing::{debug, info, warn};

use crate::{
    error::PreconditionError,
    locator,
    model::DownloadEvent,
    probe::PathProbe,
    runner::hide_console,
    validation::sanitize_url,
};

/// Everything needed to start yt-dlp, already checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub tool: PathBuf,
    pub url: String,
    pub directory: PathBuf,
}

/// Checks, in order: tool, URL present, folder, URL shape. Nothing is
/// spawned unless all pass.
pub fn check_preconditions<P: PathProbe + ?Sized>(
    tool: Option<&Path>,
    url: &str,
    directory: &str,
    probe: &P,
) -> Result<DownloadRequest, PreconditionError> {
    let tool = locator::available(tool, probe).ok_or(PreconditionError::ToolUnavailable)?;
    if url.trim().is_empty() {
        return Err(PreconditionError::EmptyUrl);
    }
    if directory.is_empty() || !probe.is_dir(Path::new(directory)) {
        return Err(PreconditionError::InvalidDirectory);
    }
    let url = sanitize_url(url).ok_or(PreconditionError::InvalidUrl)?;
    Ok(DownloadRequest {
        tool: tool.to_path_buf(),
        url,
        directory: PathBuf::from(directory),
    })
}

/// `<dir>/%(title)s.%(ext)s`, using yt-dlp's own substitution syntax.
pub fn output_template(directory: &Path) -> String {
    directory.join("%(title)s.%(ext)s").to_string_lossy().into_owned()
}

pub fn download_args(req: &DownloadRequest) -> Vec<String> {
    vec![
        "--no-playlist".to_owned(),
        "-x".to_owned(),
        "--audio-format".to_owned(),
        "mp3".to_owned(),
        "--audio-quality".to_owned(),
        "320k".to_owned(),
        "-o".to_owned(),
        output_template(&req.directory),
        req.url.clone(),
    ]
}

/// Runs the download to completion, streaming stdout and stderr chunks to
/// `events`. The last event is always `Exited` or `SpawnFailed`.
pub async fn spawn_download(req: DownloadRequest, events: UnboundedSender<DownloadEvent>) {
    let args = download_args(&req);
    info!(url = %req.url, dir = %req.directory.display(), "starting download");

    let mut cmd = Command::new(&req.tool);
    cmd.args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    hide_console(&mut cmd);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            warn!(tool = %req.tool.display(), error = %err, "yt-dlp failed to start");
            let _ = events.send(DownloadEvent::SpawnFailed(err.to_string()));
            return;
        }
    };

    let stdout = child.stdout.take().map(|out| tokio::spawn(forward(out, events.clone())));
    let stderr = child.stderr.take().map(|err| tokio::spawn(forward(err, events.clone())));

    let status = child.wait().await;
    // drain both pipes before reporting the exit
    for reader in [stdout, stderr].into_iter().flatten() {
        let _ = reader.await;
    }

    let event = match status {
        Ok(status) => {
            info!(code = ?status.code(), "yt-dlp exited");
            DownloadEvent::Exited(status.code())
        }
        Err(err) => {
            warn!(error = %err, "lost track of yt-dlp");
            DownloadEvent::SpawnFailed(err.to_string())
        }
    };
    let _ = events.send(event);
}

/// Progress lines are rewritten with `\r`, so read raw chunks, not lines.
async fn forward<R>(mut pipe: R, events: UnboundedSender<DownloadEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 4096];
    loop {
        match pipe.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let chunk = String::from_utf8_lossy(&buf[..n]).into_owned();
                debug!("yt-dlp> {}", chunk.trim_end());
                if events.send(DownloadEvent::Output(chunk)).is_err() {
                    break;
                }
            }
            Err(err) => {
                debug!(error = %err, "pipe read failed");
                break;
            }
        }
    }
}
