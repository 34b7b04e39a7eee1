// crates/gifer-core/src/media_types.rs
//
// Types that flow across the channels between gifer-media and gifer-ui.
// No egui, no ffmpeg - just plain data.

use std::path::PathBuf;
use uuid::Uuid;

use crate::params::SourceInfo;

/// Results sent from MediaWorker background threads to the UI.
pub enum MediaResult {
    SourceProbed   { id: Uuid, path: PathBuf, info: SourceInfo },
    ProbeError     { id: Uuid, path: PathBuf, msg: String },
    ExportProgress { job_id: Uuid, progress: ExportProgress },
    ExportDone     { job_id: Uuid, path: PathBuf },
    /// Also sent with `msg == "cancelled"` when the user aborts.
    ExportError    { job_id: Uuid, msg: String },
    GifLoaded      { path: PathBuf, gif: DecodedGif },
    GifError       { path: PathBuf, msg: String },
}

/// Export progress handed to the caller-supplied callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportProgress {
    pub frame:        u64,
    /// Estimate from the render plan; the real count can differ by a frame
    /// or two depending on how the source timestamps line up.
    pub total_frames: u64,
}

impl ExportProgress {
    /// 0.0–1.0, clamped because `total_frames` is only an estimate.
    pub fn fraction(&self) -> f32 {
        if self.total_frames == 0 {
            return 0.0;
        }
        (self.frame as f32 / self.total_frames as f32).clamp(0.0, 1.0)
    }

    /// Status-bar text.
    pub fn message(&self) -> String {
        format!(
            "Writing GIF: frame {}/{} ({:.0}%)",
            self.frame,
            self.total_frames.max(self.frame),
            self.fraction() * 100.0,
        )
    }
}

/// One fully composed GIF frame, RGBA, `width * height * 4` bytes.
#[derive(Clone)]
pub struct GifFrame {
    pub data:     Vec<u8>,
    pub delay_ms: u32,
}

/// A GIF decoded for the player.
#[derive(Clone)]
pub struct DecodedGif {
    pub width:  u32,
    pub height: u32,
    pub frames: Vec<GifFrame>,
}

/// Messages from the ffmpeg download thread. `Finished` or `Failed` is sent
/// exactly once and is always the last event.
#[derive(Clone, Debug, PartialEq)]
pub enum DownloadEvent {
    Started  { url: String, total_bytes: Option<u64> },
    Progress { downloaded: u64, total_bytes: Option<u64>, bytes_per_sec: f64 },
    Finished { path: PathBuf },
    Failed   { msg: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_fraction_is_clamped() {
        let p = ExportProgress { frame: 12, total_frames: 10 };
        assert_eq!(p.fraction(), 1.0);
        assert_eq!(p.message(), "Writing GIF: frame 12/12 (100%)");
    }

    #[test]
    fn progress_with_unknown_total() {
        let p = ExportProgress { frame: 3, total_frames: 0 };
        assert_eq!(p.fraction(), 0.0);
    }
}
