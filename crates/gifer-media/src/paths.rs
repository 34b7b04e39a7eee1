// crates/gifer-media/src/paths.rs
// Single source of truth for where GIFer keeps a downloaded ffmpeg binary.

use std::path::PathBuf;

/// `<data dir>/GIFer/ffmpeg`: `%APPDATA%` on Windows, `$XDG_DATA_HOME` (or
/// `~/.local/share`) on Linux, `~/Library/Application Support` on macOS.
/// Falls back to the temp dir when the platform reports none.
pub fn app_ffmpeg_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("GIFer")
        .join("ffmpeg")
}

pub fn ffmpeg_exe_name() -> &'static str {
    if cfg!(target_os = "windows") { "ffmpeg.exe" } else { "ffmpeg" }
}

/// Where the download helper puts the binary (and where lookup checks last).
pub fn downloaded_ffmpeg() -> PathBuf {
    app_ffmpeg_dir().join(ffmpeg_exe_name())
}
