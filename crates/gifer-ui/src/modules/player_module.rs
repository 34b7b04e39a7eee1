// crates/gifer-ui/src/modules/player_module.rs
//
// PlayerModule: central GIF viewer with a small transport bar.
//
// Frames arrive fully composed from gifer-media (DecodedGif), so playback is
// a texture swap driven by PlaybackClock. Textures are uploaded lazily the
// first time a frame is shown and kept until the next GIF is loaded.
//
// The image is letterboxed into whatever space the panel has with
// `gifer_core::helpers::geometry::fit`, recomputed on every layout pass.

use std::path::{Path, PathBuf};

use egui::{Color32, ColorImage, Pos2, Rect, RichText, Sense, TextureHandle, TextureOptions, Ui, Vec2};

use gifer_core::commands::GiferCommand;
use gifer_core::helpers::geometry::fit;
use gifer_core::media_types::DecodedGif;

use super::GiferModule;
use crate::state::SessionState;
use crate::theme::{BG_VIEWER, BORDER, TEXT_DIM};

const BAR_H: f32 = 32.0;

/// Frame position and play state. Pure so it can be tested without egui.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackClock {
    frame:      usize,
    frames:     usize,
    playing:    bool,
    /// Time already spent on `frame`, in milliseconds.
    elapsed_ms: f64,
}

impl PlaybackClock {
    pub fn new(frames: usize) -> Self {
        Self { frame: 0, frames, playing: false, elapsed_ms: 0.0 }
    }

    pub fn frame(&self)      -> usize { self.frame }
    pub fn is_playing(&self) -> bool  { self.playing }

    pub fn play(&mut self) {
        self.playing = self.frames > 0;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Pause and rewind to the first frame.
    pub fn stop(&mut self) {
        self.playing    = false;
        self.frame      = 0;
        self.elapsed_ms = 0.0;
    }

    /// Pause and step one frame, wrapping at the end.
    pub fn next_frame(&mut self) {
        self.playing = false;
        if self.frames > 0 {
            self.frame      = (self.frame + 1) % self.frames;
            self.elapsed_ms = 0.0;
        }
    }

    /// Advance by `dt_ms` honouring each frame's delay. Loops forever.
    /// Returns true when the visible frame changed.
    pub fn advance(&mut self, dt_ms: f64, delays_ms: &[u32]) -> bool {
        if !self.playing || self.frames == 0 {
            return false;
        }
        self.elapsed_ms += dt_ms.max(0.0);

        // A long stall (window hidden, debugger) must not spin here.
        let cycle: f64 = delays_ms.iter().map(|d| (*d).max(1) as f64).sum();
        if cycle > 0.0 && self.elapsed_ms > cycle {
            self.elapsed_ms %= cycle;
        }

        let mut changed = false;
        loop {
            let delay = delays_ms.get(self.frame).copied().unwrap_or(100).max(1) as f64;
            if self.elapsed_ms < delay {
                break;
            }
            self.elapsed_ms -= delay;
            self.frame = (self.frame + 1) % self.frames;
            changed = true;
        }
        changed
    }

    /// Status-bar text, e.g. `Frame: 3/40`.
    pub fn status(&self) -> String {
        format!("Frame: {}/{}", self.frame + 1, self.frames)
    }
}

struct LoadedGif {
    path:     PathBuf,
    gif:      DecodedGif,
    delays:   Vec<u32>,
    textures: Vec<Option<TextureHandle>>,
}

pub struct PlayerModule {
    loaded: Option<LoadedGif>,
    clock:  PlaybackClock,
}

impl PlayerModule {
    pub fn new() -> Self {
        Self { loaded: None, clock: PlaybackClock::new(0) }
    }

    /// Replace the current GIF and start playing it.
    pub fn load(&mut self, path: PathBuf, gif: DecodedGif) {
        let n = gif.frames.len();
        let delays = gif.frames.iter().map(|f| f.delay_ms).collect();
        self.loaded = Some(LoadedGif { path, gif, delays, textures: vec![None; n] });
        self.clock  = PlaybackClock::new(n);
        self.clock.play();
    }

    pub fn path(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|l| l.path.as_path())
    }

    pub fn play(&mut self)       { self.clock.play(); }
    pub fn pause(&mut self)      { self.clock.pause(); }
    pub fn stop(&mut self)       { self.clock.stop(); }
    pub fn next_frame(&mut self) { self.clock.next_frame(); }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    /// Advance playback by `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> bool {
        match &self.loaded {
            Some(l) => self.clock.advance(dt * 1000.0, &l.delays),
            None    => false,
        }
    }

    pub fn status(&self) -> Option<String> {
        self.loaded.as_ref().map(|_| self.clock.status())
    }

    fn transport(&self, ui: &mut Ui, cmd: &mut Vec<GiferCommand>) {
        let has_gif = self.loaded.is_some();
        ui.horizontal(|ui| {
            ui.set_height(BAR_H);
            if self.clock.is_playing() {
                if ui.add_enabled(has_gif, egui::Button::new("⏸ Pause")).clicked() {
                    cmd.push(GiferCommand::Pause);
                }
            } else if ui.add_enabled(has_gif, egui::Button::new("▶ Play")).clicked() {
                cmd.push(GiferCommand::Play);
            }
            if ui.add_enabled(has_gif, egui::Button::new("⏹ Stop")).clicked() {
                cmd.push(GiferCommand::Stop);
            }
            if ui.add_enabled(has_gif, egui::Button::new("⏭ Next")).clicked() {
                cmd.push(GiferCommand::NextFrame);
            }
            ui.separator();
            if ui.button("Open GIF…").clicked() {
                cmd.push(GiferCommand::ShowOpenGifDialog);
            }
            if let Some(path) = self.path() {
                ui.label(RichText::new(path.display().to_string()).size(11.0).color(TEXT_DIM));
            }
        });
    }

    fn texture_for_current(&mut self, ui: &Ui) -> Option<TextureHandle> {
        let frame = self.clock.frame();
        let l = self.loaded.as_mut()?;
        if l.textures.get(frame)?.is_none() {
            let data  = &l.gif.frames.get(frame)?.data;
            let image = ColorImage::from_rgba_unmultiplied(
                [l.gif.width as usize, l.gif.height as usize], data,
            );
            l.textures[frame] = Some(ui.ctx().load_texture(
                format!("gif-frame-{frame}"),
                image,
                TextureOptions::LINEAR,
            ));
        }
        l.textures[frame].clone()
    }
}

impl GiferModule for PlayerModule {
    fn name(&self) -> &str { "Player" }

    fn ui(&mut self, ui: &mut Ui, state: &SessionState, cmd: &mut Vec<GiferCommand>) {
        self.transport(ui, cmd);
        ui.add_space(4.0);

        let size = ui.available_size().max(Vec2::splat(1.0));
        let (viewer, _) = ui.allocate_exact_size(size, Sense::hover());
        ui.painter().rect_filled(viewer, 2.0, BG_VIEWER);
        ui.painter().rect_stroke(viewer, 2.0, egui::Stroke::new(1.0, BORDER), egui::StrokeKind::Inside);

        let dims = self.loaded.as_ref().map(|l| (l.gif.width, l.gif.height));
        let Some((gw, gh)) = dims else {
            let hint = if state.gif_loading { "Loading GIF…" } else { "Generate or open a GIF to preview it here" };
            ui.painter().text(
                viewer.center(),
                egui::Align2::CENTER_CENTER,
                hint,
                egui::FontId::proportional(13.0),
                TEXT_DIM,
            );
            return;
        };

        // Zero-sized viewer (collapsed window): nothing to draw.
        let Ok((w, h)) = fit(gw as f64, gh as f64, viewer.width() as f64, viewer.height() as f64) else {
            return;
        };
        let rect = Rect::from_center_size(viewer.center(), Vec2::new(w as f32, h as f32));
        if let Some(tex) = self.texture_for_current(ui) {
            ui.painter().image(
                tex.id(),
                rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_clock_never_plays() {
        let mut c = PlaybackClock::new(0);
        c.play();
        assert!(!c.is_playing());
        assert!(!c.advance(1000.0, &[]));
        c.next_frame();
        assert_eq!(c.frame(), 0);
    }

    #[test]
    fn advance_honours_per_frame_delays() {
        let mut c = PlaybackClock::new(3);
        c.play();
        let delays = [100, 50, 200];
        assert!(!c.advance(99.0, &delays));
        assert!(c.advance(1.0, &delays));
        assert_eq!(c.frame(), 1);
        assert!(c.advance(50.0, &delays));
        assert_eq!(c.frame(), 2);
        assert!(c.advance(200.0, &delays));
        assert_eq!(c.frame(), 0);
    }

    #[test]
    fn long_stall_wraps_instead_of_spinning() {
        let mut c = PlaybackClock::new(2);
        c.play();
        c.advance(1_000_000.0 + 150.0, &[100, 100]);
        assert!(c.frame() < 2);
    }

    #[test]
    fn pause_holds_frame_and_stop_rewinds() {
        let mut c = PlaybackClock::new(4);
        c.play();
        c.advance(250.0, &[100; 4]);
        assert_eq!(c.frame(), 2);

        c.pause();
        assert!(!c.advance(500.0, &[100; 4]));
        assert_eq!(c.frame(), 2);

        c.stop();
        assert_eq!(c.frame(), 0);
        assert!(!c.is_playing());
    }

    #[test]
    fn next_frame_pauses_and_wraps() {
        let mut c = PlaybackClock::new(2);
        c.play();
        c.next_frame();
        assert!(!c.is_playing());
        assert_eq!(c.frame(), 1);
        c.next_frame();
        assert_eq!(c.frame(), 0);
        assert_eq!(c.status(), "Frame: 1/2");
    }
}
