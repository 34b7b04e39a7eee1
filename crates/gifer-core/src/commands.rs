// crates/gifer-core/src/commands.rs
//
// Every user action in GIFer is expressed as a GiferCommand.
// Panels emit these; app.rs applies them after the UI pass.
// Adding a new feature = add a variant here + one match arm in app.rs.

use uuid::Uuid;
use crate::params::Axis;

#[derive(Debug, Clone, PartialEq)]
pub enum GiferCommand {
    // ── File ─────────────────────────────────────────────────────────────────
    ShowOpenVideoDialog,
    ShowOpenGifDialog,
    Quit,

    // ── Parameters ───────────────────────────────────────────────────────────
    // `None` means the field was emptied.
    SetTrimStart(Option<f64>),
    SetTrimEnd(Option<f64>),
    SetTargetDimension { axis: Axis, value: Option<f64> },
    /// The "Scale" checkbox. Enabling seeds width/height from the source;
    /// disabling clears the scale.
    SetScaleEnabled(bool),
    SetScale(Option<f64>),
    SetOutputFps(Option<f64>),
    SetPlaybackSpeed(Option<f64>),
    SetMirrored(bool),
    SetColorFuzz(Option<f64>),
    /// Reset to the opened video's defaults (or blank if none is open).
    ResetParameters,
    /// A field held text that is not a number. Surfaced in the status bar.
    ReportInvalidField { field: &'static str, text: String },

    // ── Export ───────────────────────────────────────────────────────────────
    /// Validate parameters, ask for a destination and start the export.
    Generate,
    CancelExport(Uuid),

    // ── Player ───────────────────────────────────────────────────────────────
    Play,
    Pause,
    Stop,
    NextFrame,

    // ── ffmpeg setup ─────────────────────────────────────────────────────────
    StartFfmpegDownload,
}
