//! Desktop form that downloads a YouTube video's audio as MP3 through yt-dlp

// Link checks for pasted URLs
mod validation;
// Finds the yt-dlp executable
mod locator;
// Collected-output child processes
mod runner;
// Filesystem existence checks
mod probe;
// Title/uploader lookup
mod metadata;
// Thumbnail fetching module
mod thumbnail;
// Remembered output folder
mod directory;
// JSON-backed key-value storage
mod storage;
// User preferences
mod config;
// yt-dlp download spawning logic
mod downloader;
// Progress parsing utilities
mod progress;
// Data models for downloads, events and metadata
mod model;
// Form state
mod form;
// Toasts and HUD
mod notify;
// Error types
mod error;

use config::{Preferences, YTDLP_PATH_ENV};
use directory::OutputDirectory;
use form::{LauncherForm, TitleFetch};
use locator::{Platform, locate};
use metadata::{FetchedTitle, fetch_title};
use model::{DownloadEvent, DownloadToast};
use notify::{Hud, Toasts};
use probe::OsProbe;
use runner::TokioRunner;
use storage::LocalStorage;

// eframe/egui for GUI application framework
use eframe::{App, Frame, egui};
use egui::{ColorImage, TextureOptions, Visuals};
// FileDialog for folder selection dialogs
use rfd::FileDialog;
use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{
    runtime::Runtime,
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
};
use tracing::{info, warn};

/// Program entry point: initializes logging and runtime, then launches the GUI
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yt_mp3_downloader=info".into()),
        )
        .init();

    let rt = Arc::new(Runtime::new()?);

    let prefs_path = Preferences::default_path();
    let prefs = Preferences::load(prefs_path.as_deref());
    let configured = prefs.effective_yt_dlp_path(std::env::var(YTDLP_PATH_ENV).ok());
    // resolve once before the window exists so the first frame already knows
    let tool = rt.block_on(locate(configured.as_deref(), Platform::current(), &OsProbe, &TokioRunner));

    let mut storage = LocalStorage::open_default().unwrap_or_else(|err| {
        warn!(error = %err, "falling back to storage in the working directory");
        LocalStorage::open("storage.json")
    });
    info!(path = %storage.path().display(), "local storage");
    let output_dir = OutputDirectory::load(&mut storage, &OsProbe);

    let app = LauncherApp::new(rt, LauncherForm::new(output_dir, tool), storage, prefs, prefs_path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([480.0, 340.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Download YouTube Audio",
        options,
        Box::new(|cc| {
            // Use dark theme visuals
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(app)
        }),
    )
    .map_err(|err| anyhow::anyhow!("window failed: {err}"))
}

/// Application state for the GUI
struct LauncherApp {
    rt: Arc<Runtime>,
    form: LauncherForm,
    storage: LocalStorage,
    prefs: Preferences,
    prefs_path: Option<PathBuf>,
    /// Text field contents for the yt-dlp path preference
    prefs_draft: String,
    /// Thumbnail for the current URL, if one loaded
    thumbnail: Option<egui::TextureHandle>,
    toasts: Toasts,
    hud: Hud,
    /// Toast id and event stream of the running download
    download: Option<(u64, UnboundedReceiver<DownloadEvent>)>,
    title_tx: UnboundedSender<(u64, FetchedTitle)>,
    title_rx: UnboundedReceiver<(u64, FetchedTitle)>,
    thumb_tx: UnboundedSender<(u64, ColorImage)>,
    thumb_rx: UnboundedReceiver<(u64, ColorImage)>,
    tool_tx: UnboundedSender<Option<PathBuf>>,
    tool_rx: UnboundedReceiver<Option<PathBuf>>,
}

impl LauncherApp {
    fn new(
        rt: Arc<Runtime>,
        form: LauncherForm,
        storage: LocalStorage,
        prefs: Preferences,
        prefs_path: Option<PathBuf>,
    ) -> Self {
        let (title_tx, title_rx) = unbounded_channel();
        let (thumb_tx, thumb_rx) = unbounded_channel();
        let (tool_tx, tool_rx) = unbounded_channel();
        Self {
            rt,
            form,
            storage,
            prefs_draft: prefs.yt_dlp_path.clone().unwrap_or_default(),
            prefs,
            prefs_path,
            thumbnail: None,
            toasts: Toasts::default(),
            hud: Hud::default(),
            download: None,
            title_tx,
            title_rx,
            thumb_tx,
            thumb_rx,
            tool_tx,
            tool_rx,
        }
    }

    /// Pulls everything background tasks reported since the last frame.
    fn poll_background(&mut self, ctx: &egui::Context, now: Instant) {
        while let Ok(tool) = self.tool_rx.try_recv() {
            self.form.set_tool(tool);
        }

        while let Ok((generation, fetched)) = self.title_rx.try_recv() {
            if self.form.title_fetched(generation, &fetched) {
                if let Some(url) = fetched.thumbnail_url {
                    self.spawn_thumbnail_fetch(generation, url);
                }
            }
        }

        while let Ok((generation, img)) = self.thumb_rx.try_recv() {
            if generation == self.form.generation() {
                self.thumbnail = Some(ctx.load_texture("thumbnail", img, TextureOptions::default()));
            }
        }

        if let Some((id, rx)) = &mut self.download {
            let id = *id;
            let mut finished = false;
            while let Ok(event) = rx.try_recv() {
                self.toasts.update(id, now, |toast| toast.apply(&event));
                finished |= matches!(event, DownloadEvent::Exited(_) | DownloadEvent::SpawnFailed(_));
            }
            if finished {
                self.download = None;
                self.form.download_finished();
            }
        }
        self.toasts.expire(now);
    }

    fn spawn_title_fetch(&self, fetch: TitleFetch, ctx: &egui::Context) {
        let tx = self.title_tx.clone();
        let ctx = ctx.clone();
        self.rt.spawn(async move {
            let fetched = fetch_title(&fetch.tool, &fetch.url, &TokioRunner).await;
            let _ = tx.send((fetch.generation, fetched));
            ctx.request_repaint();
        });
    }

    fn spawn_thumbnail_fetch(&self, generation: u64, url: String) {
        let tx = self.thumb_tx.clone();
        self.rt.spawn_blocking(move || {
            if let Some(img) = thumbnail::fetch_thumbnail(&url) {
                let _ = tx.send((generation, img));
            }
        });
    }

    fn start_download(&mut self, now: Instant) {
        match self.form.submit(&mut self.storage, &OsProbe) {
            Err(err) => {
                info!(reason = %err, "download refused");
                self.hud.flash(err.to_string(), now);
            }
            Ok(req) => {
                let id = self.toasts.push(DownloadToast::started());
                let (tx, rx) = unbounded_channel();
                self.download = Some((id, rx));
                self.rt.spawn(downloader::spawn_download(req, tx));
            }
        }
    }

    fn save_preferences(&mut self) {
        let draft = self.prefs_draft.trim();
        self.prefs.yt_dlp_path = (!draft.is_empty()).then(|| draft.to_owned());
        if let Some(path) = &self.prefs_path {
            if let Err(err) = self.prefs.save(path) {
                warn!(error = %err, "failed to save preferences");
            }
        }

        let configured = self
            .prefs
            .effective_yt_dlp_path(std::env::var(YTDLP_PATH_ENV).ok());
        let tx = self.tool_tx.clone();
        self.rt.spawn(async move {
            let tool = locate(configured.as_deref(), Platform::current(), &OsProbe, &TokioRunner).await;
            let _ = tx.send(tool);
        });
    }

    fn folder_picker(&mut self, ui: &mut egui::Ui) {
        let current = self.form.output_dir.current().to_owned();
        let mut picked = None;
        // a new reset key gives the picker fresh widget state
        ui.push_id(("folder_picker", self.form.output_dir.reset_key()), |ui| {
            ui.horizontal(|ui| {
                ui.label("Save to:");
                if current.is_empty() {
                    ui.weak("No folder selected");
                } else {
                    ui.monospace(&current);
                }
            });
            ui.horizontal(|ui| {
                if ui.button("Browse…").clicked() {
                    let mut dialog = FileDialog::new();
                    if !current.is_empty() {
                        dialog = dialog.set_directory(&current);
                    }
                    if let Some(folder) = dialog.pick_folder() {
                        picked = Some(folder.display().to_string());
                    }
                }
                if ui.add_enabled(!current.is_empty(), egui::Button::new("Clear")).clicked() {
                    picked = Some(String::new());
                }
            });
        });
        if let Some(value) = picked {
            self.form.set_directory(&value, &mut self.storage, &OsProbe);
        }
    }
}

/// GUI update loop: called each frame to redraw and handle interactions
impl App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let now = Instant::now();
        self.poll_background(ctx, now);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Download YouTube Audio");
            ui.add_space(6.0);

            // URL input field
            ui.label("YouTube URL:");
            if ui.text_edit_singleline(&mut self.form.url).changed() {
                self.thumbnail = None;
                if let Some(fetch) = self.form.url_changed(&OsProbe) {
                    self.spawn_title_fetch(fetch, ctx);
                }
            }

            // Title and fixed audio quality
            ui.horizontal(|ui| {
                if let Some(tex) = &self.thumbnail {
                    ui.image(tex);
                }
                ui.vertical(|ui| {
                    ui.label(self.form.title());
                    ui.weak("MP3 · 320 kbps");
                });
            });
            ui.add_space(6.0);

            self.folder_picker(ui);
            ui.add_space(6.0);

            let label = if self.form.is_busy() { "Downloading…" } else { "Download MP3" };
            if ui.add_enabled(!self.form.is_busy(), egui::Button::new(label)).clicked() {
                self.start_download(now);
            }

            ui.add_space(10.0);
            egui::CollapsingHeader::new("Preferences").show(ui, |ui| {
                ui.label("yt-dlp path (optional):");
                ui.text_edit_singleline(&mut self.prefs_draft);
                match self.form.tool() {
                    Some(tool) => ui.weak(format!("Using {}", tool.display())),
                    None => ui.colored_label(egui::Color32::LIGHT_RED, "yt-dlp not found"),
                };
                if ui.button("Save").clicked() {
                    self.save_preferences();
                }
            });
        });

        self.toasts.show(ctx);
        self.hud.show(ctx, now);

        // Request periodic repaint for progress updates
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
