// crates/gifer-media/src/ffmpeg_cli.rs
//
// Locating and spawning the ffmpeg executable.
//
// The probe runs in-process through ffmpeg-the-third; the export pipeline
// shells out to the CLI, which is why a missing binary is fatal for
// "Generate" and the UI offers to download one.
//
// Lookup order:
//   1. explicit override (GIFER_FFMPEG_EXE) - trusted as given
//   2. `ffmpeg` on PATH, if `ffmpeg -version` succeeds
//   3. the binary previously fetched by the download helper

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::paths::downloaded_ffmpeg;

/// A `Command` for `exe` that never flashes a console window on Windows.
pub fn command(exe: impl AsRef<OsStr>) -> Command {
    #[allow(unused_mut)]
    let mut cmd = Command::new(exe);
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    cmd
}

fn runs(exe: impl AsRef<OsStr>) -> bool {
    command(exe)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Find a usable ffmpeg, or `None` if the download helper is needed.
pub fn locate_ffmpeg(override_exe: Option<&Path>) -> Option<PathBuf> {
    if let Some(exe) = override_exe {
        log::info!("[setup] using ffmpeg override {}", exe.display());
        return Some(exe.to_path_buf());
    }
    if runs("ffmpeg") {
        log::info!("[setup] ffmpeg found on PATH");
        return Some(PathBuf::from("ffmpeg"));
    }
    let downloaded = downloaded_ffmpeg();
    if downloaded.is_file() && runs(&downloaded) {
        log::info!("[setup] using downloaded ffmpeg {}", downloaded.display());
        return Some(downloaded);
    }
    log::warn!("[setup] ffmpeg not found");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_is_returned_verbatim() {
        let p = Path::new("/opt/custom/ffmpeg");
        assert_eq!(locate_ffmpeg(Some(p)), Some(p.to_path_buf()));
    }

    #[test]
    fn nonexistent_binary_does_not_run() {
        assert!(!runs("/definitely/not/here/ffmpeg"));
    }
}
