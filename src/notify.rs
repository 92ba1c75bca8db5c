//! Toast notifications and the short-lived HUD line, drawn as overlays.

use eframe::egui::{self, Align2, Color32, RichText};
use std::time::{Duration, Instant};

use crate::model::{DownloadStatus, DownloadToast};

const FINISHED_TOAST_TTL: Duration = Duration::from_secs(6);
const HUD_TTL: Duration = Duration::from_secs(2);

struct Entry {
    id: u64,
    toast: DownloadToast,
    finished_at: Option<Instant>,
}

/// Download toasts, newest last. In-progress toasts stay until their
/// download ends; finished ones expire after a few seconds.
#[derive(Default)]
pub struct Toasts {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Toasts {
    pub fn push(&mut self, toast: DownloadToast) -> u64 {
        self.next_id += 1;
        self.entries.push(Entry {
            id: self.next_id,
            toast,
            finished_at: None,
        });
        self.next_id
    }

    /// Mutates a toast in place; stamps the finish time once it leaves the
    /// in-progress state.
    pub fn update(&mut self, id: u64, now: Instant, f: impl FnOnce(&mut DownloadToast)) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            f(&mut entry.toast);
            if entry.toast.is_finished() && entry.finished_at.is_none() {
                entry.finished_at = Some(now);
            }
        }
    }

    pub fn dismiss(&mut self, id: u64) {
        self.entries.retain(|e| e.id != id);
    }

    pub fn expire(&mut self, now: Instant) {
        self.entries.retain(|e| match e.finished_at {
            Some(at) => now.duration_since(at) < FINISHED_TOAST_TTL,
            None => true,
        });
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let mut dismissed = Vec::new();
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .show(ctx, |ui| {
                for entry in &self.entries {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.set_min_width(240.0);
                        ui.horizontal(|ui| {
                            let (icon, color) = match entry.toast.status {
                                DownloadStatus::InProgress => ("⏳", Color32::LIGHT_BLUE),
                                DownloadStatus::Success => ("✅", Color32::LIGHT_GREEN),
                                DownloadStatus::Failure => ("❌", Color32::LIGHT_RED),
                            };
                            ui.label(RichText::new(icon).color(color));
                            ui.vertical(|ui| {
                                ui.strong(&entry.toast.title);
                                if let Some(msg) = &entry.toast.message {
                                    ui.label(msg);
                                }
                            });
                            if entry.toast.is_finished() && ui.small_button("✖").clicked() {
                                dismissed.push(entry.id);
                            }
                        });
                    });
                }
            });
        for id in dismissed {
            self.dismiss(id);
        }
    }
}

/// Blocking-style one-line message for refused submits.
#[derive(Default)]
pub struct Hud {
    current: Option<(String, Instant)>,
}

impl Hud {
    pub fn flash(&mut self, text: impl Into<String>, now: Instant) {
        self.current = Some((text.into(), now + HUD_TTL));
    }

    pub fn text(&self, now: Instant) -> Option<&str> {
        match &self.current {
            Some((text, until)) if now < *until => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, now: Instant) {
        let Some(text) = self.text(now).map(str::to_owned) else {
            self.current = None;
            return;
        };
        egui::Area::new(egui::Id::new("hud"))
            .anchor(Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(RichText::new(text).size(16.0));
                });
            });
    }
}
