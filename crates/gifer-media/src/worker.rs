// crates/gifer-media/src/worker.rs
//
// MediaWorker: owns the result channel and every background job.
// All public API that gifer-ui calls lives here.
//
// Each job is a short-lived thread: probing a video, decoding a GIF for the
// player, or exporting. Results come back on `rx`, which the UI drains once
// per frame. Export jobs are keyed by job_id so a cancel reaches exactly the
// job it was meant for.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use uuid::Uuid;

use gifer_core::media_types::MediaResult;

use crate::gif_reader::load_gif;
use crate::probe::probe_source;
use crate::render::{export_gif, ExportSpec};

/// Only every Nth frame is forwarded as progress; the channel is shared with
/// probe results and a per-frame flood would delay them.
const PROGRESS_INTERVAL: u64 = 5;

pub struct MediaWorker {
    pub rx:   Receiver<MediaResult>,
    tx:       Sender<MediaResult>,
    shutdown: Arc<AtomicBool>,
    export_cancels: Arc<Mutex<HashMap<Uuid, Arc<AtomicBool>>>>,
}

impl Default for MediaWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaWorker {
    pub fn new() -> Self {
        let (tx, rx) = bounded(256);
        Self {
            rx,
            tx,
            shutdown:       Arc::new(AtomicBool::new(false)),
            export_cancels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Cancel every running export and stop accepting new results.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        for flag in self.export_cancels.lock().values() {
            flag.store(true, Ordering::Relaxed);
        }
    }

    /// Probe `path` in the background; answers with `SourceProbed` or
    /// `ProbeError` carrying the same `id`.
    pub fn probe_source(&self, id: Uuid, path: PathBuf) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) { return; }
            let result = match probe_source(&path) {
                Ok(info) => MediaResult::SourceProbed { id, path, info },
                Err(e)   => {
                    log::warn!("[media] probe failed: {e:#}");
                    MediaResult::ProbeError { id, path, msg: format!("{e:#}") }
                }
            };
            let _ = tx.send(result);
        });
    }

    /// Decode a GIF for the player.
    pub fn load_gif(&self, path: PathBuf) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) { return; }
            let result = match load_gif(&path) {
                Ok(gif) => MediaResult::GifLoaded { path, gif },
                Err(e)  => {
                    log::warn!("[media] GIF load failed: {e:#}");
                    MediaResult::GifError { path, msg: format!("{e:#}") }
                }
            };
            let _ = tx.send(result);
        });
    }

    /// Spawn a background thread to export `spec`.
    pub fn start_export(&self, spec: ExportSpec) {
        let job_id = spec.job_id;
        let cancel = Arc::new(AtomicBool::new(false));
        let tx     = self.tx.clone();
        let sd     = self.shutdown.clone();

        // Register before spawning so an immediate cancel_export finds it.
        self.export_cancels.lock().insert(job_id, Arc::clone(&cancel));

        let cancels = Arc::clone(&self.export_cancels);
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) {
                let _ = tx.send(MediaResult::ExportError {
                    job_id,
                    msg: "worker shutting down".into(),
                });
                return;
            }

            match serde_json::to_string(&spec.plan) {
                Ok(json) => log::info!("[export] {job_id} → {} {json}", spec.output.display()),
                Err(_)   => log::info!("[export] {job_id} → {}", spec.output.display()),
            }

            let progress_tx = tx.clone();
            let mut on_progress = |p: gifer_core::media_types::ExportProgress| {
                if p.frame % PROGRESS_INTERVAL == 0 || p.frame == 1 {
                    let _ = progress_tx.try_send(MediaResult::ExportProgress { job_id, progress: p });
                }
            };

            let result = match export_gif(&spec, &cancel, &mut on_progress) {
                Ok(path) => {
                    log::info!("[export] {job_id} done ✓ {}", path.display());
                    MediaResult::ExportDone { job_id, path }
                }
                Err(e) => {
                    log::warn!("[export] {job_id} failed: {e:#}");
                    MediaResult::ExportError { job_id, msg: format!("{e:#}") }
                }
            };
            let _ = tx.send(result);

            cancels.lock().remove(&job_id);
        });
    }

    /// Signal the export identified by `job_id` to stop. The job kills its
    /// ffmpeg child and reports `ExportError { msg: "cancelled" }`.
    pub fn cancel_export(&self, job_id: Uuid) {
        if let Some(flag) = self.export_cancels.lock().get(&job_id) {
            flag.store(true, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn probe_of_missing_file_reports_error_with_same_id() {
        let worker = MediaWorker::new();
        let id = Uuid::new_v4();
        worker.probe_source(id, PathBuf::from("/definitely/not/here.mp4"));
        match worker.rx.recv_timeout(Duration::from_secs(10)).unwrap() {
            MediaResult::ProbeError { id: got, .. } => assert_eq!(got, id),
            _ => panic!("expected ProbeError"),
        }
    }

    #[test]
    fn gif_load_error_is_reported() {
        let worker = MediaWorker::new();
        worker.load_gif(PathBuf::from("/definitely/not/here.gif"));
        assert!(matches!(
            worker.rx.recv_timeout(Duration::from_secs(10)).unwrap(),
            MediaResult::GifError { .. }
        ));
    }

    #[test]
    fn cancel_of_unknown_job_is_harmless() {
        let worker = MediaWorker::new();
        worker.cancel_export(Uuid::new_v4());
        worker.shutdown();
    }
}
