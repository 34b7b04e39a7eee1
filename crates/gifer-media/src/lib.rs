// crates/gifer-media/src/lib.rs
//
// No egui dependency - communicates with gifer-ui via channels only.
//
// To add a new media capability:
//   1. Create a new module file here
//   2. Add `pub mod mymodule;` below
//   3. Call it from worker.rs (a new MediaWorker method)

pub mod download;
pub mod ffmpeg_cli;
pub mod gif_reader;
pub mod gif_writer;
pub mod paths;
pub mod probe;
pub mod render;
pub mod worker;

use anyhow::Context;

// Re-export the main public API so gifer-ui imports are simple.
pub use worker::MediaWorker;
pub use render::ExportSpec;
pub use gifer_core::media_types::{DecodedGif, DownloadEvent, ExportProgress, MediaResult};

/// Initialise the in-process FFmpeg libraries used by the probe.
/// Call once from `main` before creating a `MediaWorker`.
pub fn init() -> anyhow::Result<()> {
    ffmpeg_the_third::init().context("FFmpeg init failed")
}
