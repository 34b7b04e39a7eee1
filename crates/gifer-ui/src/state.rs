// crates/gifer-ui/src/state.rs
//
// Everything the panels read each frame. Panels get `&SessionState` and emit
// GiferCommands; only app.rs mutates it.

use std::path::PathBuf;

use gifer_core::media_types::ExportProgress;
use gifer_core::params::ClipParameters;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq)]
pub enum ExportState {
    Idle,
    Running { job_id: Uuid, output: PathBuf, progress: Option<ExportProgress> },
}

impl ExportState {
    pub fn is_running(&self) -> bool {
        matches!(self, ExportState::Running { .. })
    }
}

pub struct SessionState {
    pub params:        ClipParameters,
    /// The "Scale" checkbox. While set, width/height are read-only and the
    /// scale field drives the output size.
    pub scale_enabled: bool,
    pub export:        ExportState,
    /// Status-bar message.
    pub status:        String,
    /// Resolved at startup or after a download; `None` disables Generate.
    pub ffmpeg:        Option<PathBuf>,
    /// A probe is in flight for this request id.
    pub pending_probe: Option<Uuid>,
    pub gif_loading:   bool,
}

impl SessionState {
    pub fn new(ffmpeg: Option<PathBuf>) -> Self {
        Self {
            params:        ClipParameters::new(),
            scale_enabled: false,
            export:        ExportState::Idle,
            status:        "Open a video to start (Ctrl+O)".into(),
            ffmpeg,
            pending_probe: None,
            gif_loading:   false,
        }
    }

    /// Any background work whose result the UI is waiting for.
    pub fn is_busy(&self) -> bool {
        self.export.is_running() || self.pending_probe.is_some() || self.gif_loading
    }
}
