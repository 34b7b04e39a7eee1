// crates/gifer-media/src/download.rs
//
// First-run helper: fetch a static ffmpeg build for the current platform.
//
// The binary is streamed to `<dest>.part` and renamed into place once the
// body has been fully written, so an interrupted download never looks like a
// usable executable. Progress goes out on a channel; the UI folds it into its
// overlay. Exactly one terminal event (Finished or Failed) is sent per run.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::Sender;

use gifer_core::media_types::DownloadEvent;

pub const BINARY_BASE_URL: &str = "https://github.com/imageio/imageio-binaries/raw/master/ffmpeg/";

const REPORT_INTERVAL: Duration = Duration::from_millis(250);

/// Name of the prebuilt binary for `os`/`arch` (values of `std::env::consts`).
///
/// Only x86 builds are published. Apple silicon runs the macOS one under
/// Rosetta; other ARM systems get `None` and must install ffmpeg themselves.
pub fn platform_binary_name(os: &str, arch: &str) -> Option<&'static str> {
    match (os, arch) {
        ("linux", "x86_64")              => Some("ffmpeg-linux64-v3.3.1"),
        ("linux", "x86")                 => Some("ffmpeg-linux32-v3.3.1"),
        ("windows", "x86_64")            => Some("ffmpeg-win64-v3.2.4.exe"),
        ("windows", "x86")               => Some("ffmpeg-win32-v3.2.4.exe"),
        ("macos", "x86_64" | "aarch64")  => Some("ffmpeg-osx64-v3.2.4"),
        _ => None,
    }
}

/// Download URL for the running platform, if one is published.
pub fn download_url() -> Option<String> {
    platform_binary_name(std::env::consts::OS, std::env::consts::ARCH)
        .map(|name| format!("{BINARY_BASE_URL}{name}"))
}

/// Download ffmpeg to `dest` on a background thread.
pub fn spawn_download(dest: PathBuf, tx: Sender<DownloadEvent>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("ffmpeg-download".into())
        .spawn(move || {
            let event = match run_download(&dest, &tx) {
                Ok(()) => {
                    log::info!("[setup] ffmpeg installed at {}", dest.display());
                    DownloadEvent::Finished { path: dest }
                }
                Err(e) => {
                    log::warn!("[setup] download failed: {e:#}");
                    DownloadEvent::Failed { msg: format!("{e:#}") }
                }
            };
            let _ = tx.send(event);
        })
}

fn run_download(dest: &Path, tx: &Sender<DownloadEvent>) -> Result<()> {
    let url = download_url()
        .ok_or_else(|| anyhow!("no ffmpeg build is published for {}", std::env::consts::OS))?;
    if let Some(dir) = dest.parent() {
        fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }

    log::info!("[setup] GET {url}");
    log::info!("[setup] → {}", dest.display());

    let resp = ureq::get(&url).call().context("HTTP request failed")?;
    let total_bytes = resp.headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());
    let _ = tx.send(DownloadEvent::Started { url: url.clone(), total_bytes });

    let mut part_name = dest.as_os_str().to_owned();
    part_name.push(".part");
    let part = PathBuf::from(part_name);

    let result = stream_to(&part, resp.into_body().into_reader(), total_bytes, tx);
    if let Err(e) = result {
        let _ = fs::remove_file(&part);
        return Err(e);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&part, fs::Permissions::from_mode(0o755))
            .context("mark ffmpeg executable")?;
    }

    fs::rename(&part, dest).with_context(|| format!("move ffmpeg into {}", dest.display()))?;
    Ok(())
}

fn stream_to(
    part:        &Path,
    mut body:    impl Read,
    total_bytes: Option<u64>,
    tx:          &Sender<DownloadEvent>,
) -> Result<()> {
    let mut file = File::create(part).with_context(|| format!("cannot create {}", part.display()))?;
    let mut buf  = [0u8; 65536];
    let mut downloaded  = 0u64;
    let mut last_report = Instant::now();
    let mut last_bytes  = 0u64;

    loop {
        let n = match body.read(&mut buf) {
            Ok(0)  => break,
            Ok(n)  => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("download read error"),
        };
        file.write_all(&buf[..n]).context("write error")?;
        downloaded += n as u64;

        let elapsed = last_report.elapsed();
        if elapsed >= REPORT_INTERVAL {
            let bytes_per_sec = (downloaded - last_bytes) as f64 / elapsed.as_secs_f64();
            last_bytes  = downloaded;
            last_report = Instant::now();
            let _ = tx.try_send(DownloadEvent::Progress { downloaded, total_bytes, bytes_per_sec });
        }
    }
    file.flush().context("write error")?;

    if let Some(total) = total_bytes {
        if downloaded != total {
            return Err(anyhow!("download truncated: got {downloaded} of {total} bytes"));
        }
    }
    let _ = tx.try_send(DownloadEvent::Progress { downloaded, total_bytes, bytes_per_sec: 0.0 });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn every_desktop_platform_has_a_binary() {
        assert_eq!(platform_binary_name("linux", "x86_64"), Some("ffmpeg-linux64-v3.3.1"));
        assert_eq!(platform_binary_name("linux", "x86"), Some("ffmpeg-linux32-v3.3.1"));
        assert_eq!(platform_binary_name("windows", "x86_64"), Some("ffmpeg-win64-v3.2.4.exe"));
        assert_eq!(platform_binary_name("windows", "x86"), Some("ffmpeg-win32-v3.2.4.exe"));
        assert_eq!(platform_binary_name("macos", "aarch64"), Some("ffmpeg-osx64-v3.2.4"));
        assert_eq!(platform_binary_name("freebsd", "x86_64"), None);
    }

    #[test]
    fn arm_linux_and_windows_have_no_binary() {
        assert_eq!(platform_binary_name("linux", "aarch64"), None);
        assert_eq!(platform_binary_name("linux", "arm"), None);
        assert_eq!(platform_binary_name("windows", "aarch64"), None);
    }

    #[test]
    fn url_points_at_the_binary_store() {
        if let Some(url) = download_url() {
            assert!(url.starts_with(BINARY_BASE_URL));
        }
    }

    #[test]
    fn stream_writes_body_and_reports_final_progress() {
        let dir  = tempfile::tempdir().unwrap();
        let part = dir.path().join("ffmpeg.part");
        let (tx, rx) = unbounded();

        stream_to(&part, &b"binary"[..], Some(6), &tx).unwrap();

        assert_eq!(fs::read(&part).unwrap(), b"binary");
        let last = rx.try_iter().last().unwrap();
        assert_eq!(
            last,
            DownloadEvent::Progress { downloaded: 6, total_bytes: Some(6), bytes_per_sec: 0.0 }
        );
    }

    #[test]
    fn short_body_is_an_error() {
        let dir  = tempfile::tempdir().unwrap();
        let part = dir.path().join("ffmpeg.part");
        let (tx, _rx) = unbounded();
        assert!(stream_to(&part, &b"bin"[..], Some(6), &tx).is_err());
    }
}
