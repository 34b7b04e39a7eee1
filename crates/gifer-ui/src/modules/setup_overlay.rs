// crates/gifer-ui/src/modules/setup_overlay.rs
//
// First-run overlay shown when no ffmpeg executable could be found.
//
// Stages:
//   Missing      → "Download" starts gifer_media::download on its own thread
//                  (or, with GIFER_NO_DOWNLOAD, just explains what to install)
//   Downloading  → DownloadEvents are folded into DownloadStatus each frame
//   Failed       → error text + Retry
//   Restart      → binary is in place; GIFer picks it up on the next start
//
// "Not now" hides the overlay; Generate then stays disabled.

use std::path::PathBuf;

use crossbeam_channel::{unbounded, Receiver};
use egui::{Align2, Color32, Context, CornerRadius, Margin, ProgressBar, RichText, Stroke};

use gifer_core::commands::GiferCommand;
use gifer_media::download::{download_url, spawn_download};
use gifer_media::paths::{app_ffmpeg_dir, downloaded_ffmpeg};
use gifer_media::DownloadEvent;

use crate::theme::{ACCENT, BG_CARD, BORDER, ERROR_RED, OK_GREEN, TEXT_DIM};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DownloadStatus {
    pub url:           String,
    pub downloaded:    u64,
    pub total_bytes:   Option<u64>,
    pub bytes_per_sec: f64,
}

impl DownloadStatus {
    pub fn fraction(&self) -> Option<f32> {
        self.total_bytes
            .filter(|t| *t > 0)
            .map(|t| (self.downloaded as f64 / t as f64).clamp(0.0, 1.0) as f32)
    }

    pub fn summary(&self) -> String {
        let mb = |b: u64| b as f64 / 1_000_000.0;
        let mut s = match (self.total_bytes, self.fraction()) {
            (Some(t), Some(f)) => format!(
                "{:.1} / {:.1} MB   {:.0}%", mb(self.downloaded), mb(t), f * 100.0
            ),
            _ => format!("{:.1} MB", mb(self.downloaded)),
        };
        if self.bytes_per_sec > 0.0 {
            s.push_str(&format!("   {:.1} MB/s", self.bytes_per_sec / 1_000_000.0));
        }
        s
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SetupStage {
    Hidden,
    Missing,
    Downloading(DownloadStatus),
    Failed(String),
    Restart(PathBuf),
}

impl SetupStage {
    /// Fold one event from the download thread into the stage.
    pub fn apply(&mut self, event: DownloadEvent) {
        match event {
            DownloadEvent::Started { url, total_bytes } => {
                *self = SetupStage::Downloading(DownloadStatus {
                    url,
                    total_bytes,
                    ..Default::default()
                });
            }
            DownloadEvent::Progress { downloaded, total_bytes, bytes_per_sec } => {
                if let SetupStage::Downloading(s) = self {
                    s.downloaded    = downloaded;
                    s.total_bytes   = total_bytes.or(s.total_bytes);
                    s.bytes_per_sec = bytes_per_sec;
                }
            }
            DownloadEvent::Finished { path } => *self = SetupStage::Restart(path),
            DownloadEvent::Failed { msg }    => *self = SetupStage::Failed(msg),
        }
    }
}

pub struct SetupOverlay {
    stage:          SetupStage,
    allow_download: bool,
    rx:             Option<Receiver<DownloadEvent>>,
}

impl SetupOverlay {
    pub fn new(ffmpeg_found: bool, allow_download: bool) -> Self {
        Self {
            stage: if ffmpeg_found { SetupStage::Hidden } else { SetupStage::Missing },
            allow_download,
            rx: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.stage != SetupStage::Hidden
    }

    pub fn is_downloading(&self) -> bool {
        matches!(self.stage, SetupStage::Downloading(_))
    }

    pub fn start_download(&mut self) {
        if !self.allow_download || self.is_downloading() {
            return;
        }
        let (tx, rx) = unbounded();
        match spawn_download(downloaded_ffmpeg(), tx) {
            Ok(_) => {
                self.stage = SetupStage::Downloading(DownloadStatus::default());
                self.rx    = Some(rx);
            }
            Err(e) => self.stage = SetupStage::Failed(format!("cannot start download thread: {e}")),
        }
    }

    /// Drain download events. Returns the installed binary once, when the
    /// download finishes.
    pub fn poll(&mut self) -> Option<PathBuf> {
        let rx = self.rx.as_ref()?;
        let events: Vec<DownloadEvent> = rx.try_iter().collect();
        let mut installed = None;
        for ev in events {
            if let DownloadEvent::Finished { path } = &ev {
                installed = Some(path.clone());
            }
            self.stage.apply(ev);
        }
        if matches!(self.stage, SetupStage::Restart(_) | SetupStage::Failed(_)) {
            self.rx = None;
        }
        installed
    }

    pub fn ui(&mut self, ctx: &Context, cmd: &mut Vec<GiferCommand>) {
        if !self.is_visible() {
            return;
        }

        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background, egui::Id::new("setup_bg"),
        ));
        painter.rect_filled(ctx.screen_rect(), 0.0, Color32::from_black_alpha(220));

        let mut hide = false;
        egui::Area::new(egui::Id::new("setup_card"))
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(BG_CARD)
                    .stroke(Stroke::new(1.0, BORDER))
                    .corner_radius(CornerRadius::same(10))
                    .inner_margin(Margin::same(28))
                    .show(ui, |ui| {
                        ui.set_min_width(400.0);
                        ui.vertical_centered(|ui| {
                            ui.label(RichText::new("ffmpeg required").size(18.0).strong().color(ACCENT));
                            ui.add_space(6.0);
                            ui.label(
                                RichText::new("GIFer uses the ffmpeg program to cut and resize video.")
                                    .size(12.0).color(TEXT_DIM),
                            );
                        });
                        ui.add_space(16.0);

                        match &self.stage {
                            SetupStage::Hidden => {}
                            SetupStage::Missing => {
                                if self.allow_download && download_url().is_some() {
                                    ui.label("ffmpeg was not found. Download a static build now?");
                                    ui.label(
                                        RichText::new(format!("📁  {}", app_ffmpeg_dir().display()))
                                            .size(10.0).color(TEXT_DIM),
                                    );
                                    ui.add_space(10.0);
                                    ui.horizontal(|ui| {
                                        if ui.button("⬇ Download").clicked() {
                                            cmd.push(GiferCommand::StartFfmpegDownload);
                                        }
                                        if ui.button("Not now").clicked() {
                                            hide = true;
                                        }
                                    });
                                } else {
                                    ui.label(
                                        "ffmpeg was not found. Install it and make sure it is on \
                                         PATH, or point GIFER_FFMPEG_EXE at the executable.",
                                    );
                                    ui.add_space(10.0);
                                    if ui.button("Continue").clicked() {
                                        hide = true;
                                    }
                                }
                            }
                            SetupStage::Downloading(status) => {
                                let label = if status.url.is_empty() { "Connecting…" } else { "Downloading ffmpeg…" };
                                ui.label(RichText::new(label).size(12.0).color(TEXT_DIM));
                                ui.add_space(8.0);
                                ui.add(
                                    ProgressBar::new(status.fraction().unwrap_or(0.0))
                                        .desired_width(344.0)
                                        .fill(ACCENT)
                                        .animate(status.fraction().is_none()),
                                );
                                ui.add_space(6.0);
                                ui.label(RichText::new(status.summary()).monospace().size(11.0));
                            }
                            SetupStage::Failed(msg) => {
                                ui.colored_label(ERROR_RED, "❌  Download failed:");
                                egui::ScrollArea::vertical().max_height(60.0).show(ui, |ui| {
                                    ui.label(RichText::new(msg).size(11.0).color(TEXT_DIM));
                                });
                                ui.add_space(10.0);
                                ui.horizontal(|ui| {
                                    if ui.button("↺ Retry").clicked() {
                                        cmd.push(GiferCommand::StartFfmpegDownload);
                                    }
                                    if ui.button("Not now").clicked() {
                                        hide = true;
                                    }
                                });
                            }
                            SetupStage::Restart(path) => {
                                ui.colored_label(OK_GREEN, "✅  ffmpeg installed.");
                                ui.label(RichText::new(path.display().to_string()).size(10.0).color(TEXT_DIM));
                                ui.add_space(6.0);
                                ui.label("Please restart GIFer to finish setup.");
                                ui.add_space(10.0);
                                if ui.button("Quit GIFer").clicked() {
                                    cmd.push(GiferCommand::Quit);
                                }
                            }
                        }
                    });
            });

        if hide {
            self.stage = SetupStage::Hidden;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_fold_into_progress() {
        let mut stage = SetupStage::Missing;
        stage.apply(DownloadEvent::Started { url: "u".into(), total_bytes: Some(2_000_000) });
        stage.apply(DownloadEvent::Progress {
            downloaded: 500_000, total_bytes: None, bytes_per_sec: 1_000_000.0,
        });
        let SetupStage::Downloading(s) = &stage else { panic!("expected Downloading") };
        assert_eq!(s.total_bytes, Some(2_000_000));
        assert_eq!(s.fraction(), Some(0.25));
        assert_eq!(s.summary(), "0.5 / 2.0 MB   25%   1.0 MB/s");
    }

    #[test]
    fn progress_outside_download_is_ignored() {
        let mut stage = SetupStage::Missing;
        stage.apply(DownloadEvent::Progress { downloaded: 1, total_bytes: None, bytes_per_sec: 0.0 });
        assert_eq!(stage, SetupStage::Missing);
    }

    #[test]
    fn terminal_events_end_the_download() {
        let mut stage = SetupStage::Downloading(DownloadStatus::default());
        stage.apply(DownloadEvent::Failed { msg: "offline".into() });
        assert_eq!(stage, SetupStage::Failed("offline".into()));

        stage.apply(DownloadEvent::Started { url: "u".into(), total_bytes: None });
        stage.apply(DownloadEvent::Finished { path: PathBuf::from("/x/ffmpeg") });
        assert_eq!(stage, SetupStage::Restart(PathBuf::from("/x/ffmpeg")));
    }

    #[test]
    fn unknown_size_has_no_fraction() {
        let s = DownloadStatus { downloaded: 3_000_000, ..Default::default() };
        assert_eq!(s.fraction(), None);
        assert_eq!(s.summary(), "3.0 MB");
    }

    #[test]
    fn found_ffmpeg_hides_overlay() {
        assert!(!SetupOverlay::new(true, true).is_visible());
        assert!(SetupOverlay::new(false, false).is_visible());
    }
}
