// crates/gifer-media/src/render.rs
//
// GIF export pipeline.
//
// Design:
//   • `ExportSpec`   - the job handed over by the UI: a validated RenderPlan,
//                      the destination and the ffmpeg executable to use.
//   • `export_gif()` - blocking; meant to run on its own thread. Progress is
//                      reported through the caller's callback, never through
//                      a shared stream.
//
// Stages:
//   1. ffmpeg trims (-ss/-t), changes speed (setpts), resamples to the output
//      frame rate (fps) and resizes (scale), writing raw RGBA frames to stdout.
//   2. Each frame is read off the pipe and handed to GifWriter immediately.
//   3. Mirrored exports keep every frame in indexed form (a quarter of the
//      RGBA size) and replay them reversed once the pipe is drained, so the
//      GIF plays forward then backward.
//
// The GIF is written to `<output>.part` and renamed into place on success, so
// a cancelled or failed export never leaves a truncated file behind.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{ChildStderr, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, bail, Context, Result};
use uuid::Uuid;

use gifer_core::media_types::ExportProgress;
use gifer_core::params::RenderPlan;

use crate::ffmpeg_cli::command;
use crate::gif_writer::{GifWriter, IndexedFrame};

/// Message used for user-initiated aborts; the UI matches on it.
pub const CANCELLED: &str = "cancelled";

/// Complete description of an export job.
#[derive(Clone, Debug)]
pub struct ExportSpec {
    pub job_id: Uuid,
    pub plan:   RenderPlan,
    /// Destination, including the `.gif` extension.
    pub output: PathBuf,
    pub ffmpeg: PathBuf,
}

/// The ffmpeg arguments that turn `plan` into a raw RGBA frame stream.
pub fn frame_pipe_args(plan: &RenderPlan) -> Vec<String> {
    let filters = format!(
        "setpts=PTS/{speed},fps={fps},scale={w}:{h}:flags=lanczos",
        speed = plan.speed,
        fps   = plan.fps,
        w     = plan.width,
        h     = plan.height,
    );
    vec![
        "-hide_banner".into(),
        "-loglevel".into(), "error".into(),
        "-nostdin".into(),
        "-ss".into(), format!("{:.3}", plan.start),
        "-t".into(),  format!("{:.3}", plan.end - plan.start),
        "-i".into(),  plan.source.to_string_lossy().into_owned(),
        "-an".into(), "-sn".into(),
        "-vf".into(), filters,
        "-pix_fmt".into(), "rgba".into(),
        "-f".into(), "rawvideo".into(),
        "pipe:1".into(),
    ]
}

fn part_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Run `write` against `<output>.part` and move the result into place, or
/// delete the part file if `write` fails.
fn write_via_part(output: &Path, write: impl FnOnce(&Path) -> Result<()>) -> Result<PathBuf> {
    let part = part_path(output);
    match write(&part) {
        Ok(()) => {
            fs::rename(&part, output)
                .with_context(|| format!("move GIF into place at {}", output.display()))?;
            Ok(output.to_path_buf())
        }
        Err(e) => {
            let _ = fs::remove_file(&part);
            Err(e)
        }
    }
}

/// Read ffmpeg's stderr on a helper thread so a chatty failure can never
/// fill the pipe and stall the frame stream.
fn drain_stderr(stderr: Option<ChildStderr>) -> Option<JoinHandle<String>> {
    let mut stderr = stderr?;
    thread::Builder::new()
        .name("ffmpeg-stderr".into())
        .spawn(move || {
            let mut text = String::new();
            let _ = stderr.read_to_string(&mut text);
            text
        })
        .ok()
}

/// Encode `spec` to disk. Blocking - run this on a dedicated thread.
///
/// `on_progress` is invoked after every written GIF frame.
pub fn export_gif(
    spec:        &ExportSpec,
    cancel:      &AtomicBool,
    on_progress: &mut dyn FnMut(ExportProgress),
) -> Result<PathBuf> {
    write_via_part(&spec.output, |part| run_export(spec, part, cancel, on_progress))
}

fn run_export(
    spec:        &ExportSpec,
    part:        &Path,
    cancel:      &AtomicBool,
    on_progress: &mut dyn FnMut(ExportProgress),
) -> Result<()> {
    let out = BufWriter::new(
        File::create(part).with_context(|| format!("create {}", part.display()))?,
    );

    let mut child = command(&spec.ffmpeg)
        .args(frame_pipe_args(&spec.plan))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawn {}", spec.ffmpeg.display()))?;

    let stderr = drain_stderr(child.stderr.take());
    let encoded = match child.stdout.take() {
        Some(stdout) => encode_clip(BufReader::new(stdout), out, &spec.plan, cancel, on_progress),
        None         => Err(anyhow!("ffmpeg stdout unavailable")),
    };

    // encode_clip has dropped the pipe by now, so ffmpeg exits on its next
    // write if it is still running. Only a cancel is worth killing it for.
    let cancelled = cancel.load(Ordering::Relaxed);
    if cancelled {
        let _ = child.kill();
    }
    let status = child.wait().context("wait for ffmpeg")?;
    let log = stderr.and_then(|h| h.join().ok()).unwrap_or_default();

    if !cancelled && !status.success() {
        let last = log.lines().last().unwrap_or("no output");
        let failed = format!("ffmpeg failed ({status}): {last}");
        return Err(match encoded {
            Ok(_)  => anyhow!(failed),
            Err(e) => e.context(failed),
        });
    }
    encoded?
        .into_inner()
        .map_err(|e| anyhow!("flush GIF: {}", e.error()))?;
    Ok(())
}

/// Encode a raw RGBA stream of `plan`-sized frames into `out`, appending the
/// frames reversed when the plan is mirrored. Returns `out` once the trailer
/// is written.
fn encode_clip<R: Read, W: Write>(
    mut frames:  R,
    out:         W,
    plan:        &RenderPlan,
    cancel:      &AtomicBool,
    on_progress: &mut dyn FnMut(ExportProgress),
) -> Result<W> {
    let total      = plan.estimated_frames();
    let mut writer = GifWriter::new(out, plan.width, plan.height, plan.fps, plan.fuzz)?;
    let mut frame  = vec![0u8; plan.width as usize * plan.height as usize * 4];
    let mut kept: Vec<IndexedFrame> = Vec::new();

    loop {
        if cancel.load(Ordering::Relaxed) {
            bail!(CANCELLED);
        }
        match frames.read_exact(&mut frame) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e).context("read frame from ffmpeg"),
        }
        if plan.mirrored {
            kept.push(writer.write_and_keep(&frame)?);
        } else {
            writer.write_frame(&frame)?;
        }
        on_progress(ExportProgress { frame: writer.frames_written(), total_frames: total });
    }

    if writer.frames_written() == 0 {
        bail!("ffmpeg produced no frames; check the start and end times");
    }

    while let Some(f) = kept.pop() {
        if cancel.load(Ordering::Relaxed) {
            bail!(CANCELLED);
        }
        writer.replay(&f)?;
        on_progress(ExportProgress { frame: writer.frames_written(), total_frames: total });
    }

    writer.finish()
}
