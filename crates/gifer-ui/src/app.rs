// crates/gifer-ui/src/app.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use eframe::egui;
use egui::{Key, KeyboardShortcut, Modifiers, RichText};
use rfd::FileDialog;
use uuid::Uuid;

use gifer_core::commands::GiferCommand;
use gifer_core::error::ParamError;
use gifer_core::params::ClipParameters;
use gifer_media::ffmpeg_cli::locate_ffmpeg;
use gifer_media::render::CANCELLED;
use gifer_media::{ExportSpec, MediaResult, MediaWorker};

use crate::modules::{
    GiferModule,
    params_panel::ParamsPanel,
    player_module::PlayerModule,
    setup_overlay::SetupOverlay,
};
use crate::settings::Settings;
use crate::state::{ExportState, SessionState};
use crate::theme::{configure_style, ACCENT, TEXT_DIM};

const OPEN_VIDEO: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::O);
const OPEN_GIF:   KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::G);
const QUIT:       KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Q);

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "m4v", "mkv", "webm", "avi", "wmv", "flv", "mpg", "mpeg", "3gp", "ts",
];

/// While a background job is pending the UI polls at this interval; the
/// worker has no handle on the egui context to wake it.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ── App ───────────────────────────────────────────────────────────────────────

pub struct GiferApp {
    state:          SessionState,
    worker:         MediaWorker,
    params:         ParamsPanel,
    player:         PlayerModule,
    setup:          SetupOverlay,
    /// Directories remembered for this session only.
    last_video_dir: Option<PathBuf>,
    last_gif_dir:   Option<PathBuf>,
    /// Commands emitted by panels each frame, processed after the UI pass
    pending_cmds:   Vec<GiferCommand>,
}

impl GiferApp {
    pub fn new(
        cc:         &eframe::CreationContext<'_>,
        settings:   Settings,
        init_error: Option<String>,
    ) -> Self {
        configure_style(&cc.egui_ctx);

        let ffmpeg = locate_ffmpeg(settings.ffmpeg_override.as_deref());
        let setup  = SetupOverlay::new(ffmpeg.is_some(), settings.allow_download);

        let mut state = SessionState::new(ffmpeg);
        if let Some(e) = init_error {
            state.status = format!("FFmpeg libraries failed to load: {e}");
        }

        Self {
            state,
            worker:         MediaWorker::new(),
            params:         ParamsPanel::new(),
            player:         PlayerModule::new(),
            setup,
            last_video_dir: None,
            last_gif_dir:   None,
            pending_cmds:   Vec::new(),
        }
    }

    /// Apply a parameter edit; a rejected edit leaves the model untouched
    /// and explains itself in the status bar.
    fn edit(&mut self, f: impl FnOnce(&mut ClipParameters) -> Result<(), ParamError>) {
        if let Err(e) = f(&mut self.state.params) {
            log::debug!("[params] rejected: {e}");
            self.state.status = e.to_string();
        }
    }

    fn process_command(&mut self, ctx: &egui::Context, cmd: GiferCommand) {
        match cmd {
            // ── File ─────────────────────────────────────────────────────────
            GiferCommand::ShowOpenVideoDialog => self.open_video_dialog(),
            GiferCommand::ShowOpenGifDialog   => self.open_gif_dialog(),
            GiferCommand::Quit => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }

            // ── Parameters ───────────────────────────────────────────────────
            GiferCommand::SetTrimStart(Some(v)) => self.edit(|p| p.set_trim(Some(v), None)),
            GiferCommand::SetTrimEnd(Some(v))   => self.edit(|p| p.set_trim(None, Some(v))),
            GiferCommand::SetTrimStart(None) | GiferCommand::SetTrimEnd(None) => {
                self.state.status = "Start and end times cannot be empty".into();
            }
            GiferCommand::SetTargetDimension { axis, value } => {
                self.edit(|p| p.set_target_dimension(axis, value));
            }
            GiferCommand::SetScaleEnabled(on) => {
                self.state.scale_enabled = on;
                if on {
                    self.state.params.use_source_dimensions();
                } else {
                    self.edit(|p| p.set_scale(None));
                }
            }
            GiferCommand::SetScale(v)         => self.edit(|p| p.set_scale(v)),
            GiferCommand::SetOutputFps(v)     => self.edit(|p| p.set_output_fps(v)),
            GiferCommand::SetPlaybackSpeed(v) => self.edit(|p| p.set_playback_speed(v)),
            GiferCommand::SetMirrored(on)     => self.state.params.set_mirrored(on),
            GiferCommand::SetColorFuzz(v)     => self.edit(|p| p.set_color_fuzz(v)),
            GiferCommand::ResetParameters => {
                self.state.params.reset(true);
                self.state.scale_enabled = false;
                self.state.status = "Parameters reset".into();
            }
            GiferCommand::ReportInvalidField { field, text } => {
                self.state.status = format!("{field}: \"{text}\" is not a number");
            }

            // ── Export ───────────────────────────────────────────────────────
            GiferCommand::Generate => self.generate(),
            GiferCommand::CancelExport(job_id) => {
                log::info!("[export] cancel requested for {job_id}");
                self.worker.cancel_export(job_id);
                self.state.status = "Cancelling…".into();
            }

            // ── Player ───────────────────────────────────────────────────────
            GiferCommand::Play      => self.player.play(),
            GiferCommand::Pause     => self.player.pause(),
            GiferCommand::Stop      => self.player.stop(),
            GiferCommand::NextFrame => self.player.next_frame(),

            // ── ffmpeg setup ─────────────────────────────────────────────────
            GiferCommand::StartFfmpegDownload => self.setup.start_download(),
        }
    }

    fn open_video_dialog(&mut self) {
        let mut dialog = FileDialog::new()
            .set_title("Open video")
            .add_filter("Video", VIDEO_EXTENSIONS)
            .add_filter("All files", &["*"]);
        if let Some(dir) = &self.last_video_dir {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.pick_file() else { return };

        self.last_video_dir = path.parent().map(Path::to_path_buf);
        let id = Uuid::new_v4();
        self.state.pending_probe = Some(id);
        self.state.status = format!("Opening {}…", path.display());
        self.worker.probe_source(id, path);
    }

    fn open_gif_dialog(&mut self) {
        let mut dialog = FileDialog::new()
            .set_title("Open GIF")
            .add_filter("GIF", &["gif"]);
        if let Some(dir) = &self.last_gif_dir {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.pick_file() else { return };

        self.last_gif_dir = path.parent().map(Path::to_path_buf);
        self.state.gif_loading = true;
        self.worker.load_gif(path);
    }

    fn generate(&mut self) {
        if self.state.export.is_running() {
            return;
        }
        if !self.state.params.is_render_ready() {
            self.state.status = "Open a video and set start and end times first".into();
            return;
        }
        let plan = match self.state.params.render_plan() {
            Ok(plan) => plan,
            Err(e)   => {
                self.state.status = e.to_string();
                return;
            }
        };
        let Some(ffmpeg) = self.state.ffmpeg.clone() else {
            self.state.status = "ffmpeg was not found; install it or restart after downloading".into();
            return;
        };

        let stem = plan.source.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip".into());
        let mut dialog = FileDialog::new()
            .set_title("Save GIF")
            .add_filter("GIF", &["gif"])
            .set_file_name(format!("{stem}.gif"));
        if let Some(dir) = self.last_gif_dir.as_ref().or(self.last_video_dir.as_ref()) {
            dialog = dialog.set_directory(dir);
        }
        let Some(mut output) = dialog.save_file() else { return };
        if output.extension().is_none() {
            output.set_extension("gif");
        }
        self.last_gif_dir = output.parent().map(Path::to_path_buf);

        let job_id = Uuid::new_v4();
        log::info!(
            "[export] {job_id}: {}x{} @ {} fps, {:.2}s → {}",
            plan.width, plan.height, plan.fps, plan.output_duration(), output.display()
        );
        self.state.export = ExportState::Running { job_id, output: output.clone(), progress: None };
        self.state.status = format!("Exporting {}…", output.display());
        self.worker.start_export(ExportSpec { job_id, plan, output, ffmpeg });
    }

    fn poll_media(&mut self) {
        if let Some(path) = self.setup.poll() {
            self.state.ffmpeg = Some(path);
        }

        while let Ok(result) = self.worker.rx.try_recv() {
            match result {
                MediaResult::SourceProbed { id, path, info } => {
                    if self.state.pending_probe != Some(id) {
                        continue;
                    }
                    self.state.pending_probe = None;
                    let loaded = self.state.params
                        .set_source(path.clone(), info.duration, info.width, info.height, info.fps);
                    match loaded {
                        Ok(()) => {
                            self.state.params.reset(true);
                            self.state.scale_enabled = false;
                            self.state.status = format!("Selected: {}", path.display());
                        }
                        Err(e) => self.state.status = format!("Cannot use {}: {e}", path.display()),
                    }
                }
                MediaResult::ProbeError { id, path, msg } => {
                    if self.state.pending_probe == Some(id) {
                        self.state.pending_probe = None;
                        self.state.status = format!("Cannot open {}: {msg}", path.display());
                    }
                }
                MediaResult::ExportProgress { job_id, progress: p } => {
                    if let ExportState::Running { job_id: running, progress, .. } = &mut self.state.export {
                        if *running == job_id {
                            *progress = Some(p);
                            self.state.status = p.message();
                        }
                    }
                }
                MediaResult::ExportDone { job_id, path } => {
                    self.finish_export(job_id);
                    self.state.status = format!("Saved {}", path.display());
                    self.state.gif_loading = true;
                    self.worker.load_gif(path);
                }
                MediaResult::ExportError { job_id, msg } => {
                    self.finish_export(job_id);
                    self.state.status = if msg == CANCELLED {
                        "Export cancelled".into()
                    } else {
                        format!("Export failed: {msg}")
                    };
                }
                MediaResult::GifLoaded { path, gif } => {
                    self.state.gif_loading = false;
                    self.state.status = format!(
                        "Loaded {} ({}×{}, {} frames)",
                        path.display(), gif.width, gif.height, gif.frames.len()
                    );
                    self.player.load(path, gif);
                }
                MediaResult::GifError { path, msg } => {
                    self.state.gif_loading = false;
                    self.state.status = format!("Cannot open {}: {msg}", path.display());
                }
            }
        }
    }

    fn finish_export(&mut self, job_id: Uuid) {
        if matches!(self.state.export, ExportState::Running { job_id: running, .. } if running == job_id) {
            self.state.export = ExportState::Idle;
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        ctx.input_mut(|i| {
            if i.consume_shortcut(&OPEN_VIDEO) {
                self.pending_cmds.push(GiferCommand::ShowOpenVideoDialog);
            }
            if i.consume_shortcut(&OPEN_GIF) {
                self.pending_cmds.push(GiferCommand::ShowOpenGifDialog);
            }
            if i.consume_shortcut(&QUIT) {
                self.pending_cmds.push(GiferCommand::Quit);
            }
        });
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    let idle = !self.state.export.is_running();
                    let item = |label: &str, sc: &KeyboardShortcut| {
                        egui::Button::new(label).shortcut_text(ctx.format_shortcut(sc))
                    };
                    if ui.add_enabled(idle, item("Open Video…", &OPEN_VIDEO)).clicked() {
                        self.pending_cmds.push(GiferCommand::ShowOpenVideoDialog);
                        ui.close_menu();
                    }
                    if ui.add(item("Open GIF…", &OPEN_GIF)).clicked() {
                        self.pending_cmds.push(GiferCommand::ShowOpenGifDialog);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.add(item("Exit", &QUIT)).clicked() {
                        self.pending_cmds.push(GiferCommand::Quit);
                        ui.close_menu();
                    }
                });
                ui.separator();
                ui.label(RichText::new("GIFer").strong().color(ACCENT));
            });
        });
    }

    fn status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(24.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(RichText::new(&self.state.status).size(12.0));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if let Some(frame) = self.player.status() {
                            ui.label(RichText::new(frame).monospace().size(11.0).color(TEXT_DIM));
                        }
                    });
                });
            });
    }
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for GiferApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.worker.shutdown();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_media();

        if self.setup.is_visible() {
            self.setup.ui(ctx, &mut self.pending_cmds);
        } else {
            self.handle_shortcuts(ctx);
            self.menu_bar(ctx);
            self.status_bar(ctx);

            egui::SidePanel::left(self.params.name())
                .resizable(true)
                .default_width(300.0)
                .min_width(260.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        self.params.ui(ui, &self.state, &mut self.pending_cmds);
                    });
                });

            egui::CentralPanel::default().show(ctx, |ui| {
                self.player.ui(ui, &self.state, &mut self.pending_cmds);
            });
        }

        // ── Process commands emitted by panels this frame ────────────────────
        let cmds: Vec<GiferCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(ctx, cmd);
        }

        let dt = ctx.input(|i| i.stable_dt as f64);
        if self.player.tick(dt) || self.player.is_playing() {
            ctx.request_repaint();
        } else if self.state.is_busy() || self.setup.is_downloading() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}
