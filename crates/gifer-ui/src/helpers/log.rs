// crates/gifer-ui/src/helpers/log.rs
//
// Logger for the whole process.
//
// In release builds with `windows_subsystem = "windows"` (double-click launch)
// there is no console, so stderr output is discarded. Every record is also
// appended to a temp file so it survives regardless of launch mode.
//
// File: %TEMP%\gifer.log (or $TMPDIR/gifer.log), append-only.
//
// gifer-core and gifer-media only use the `log` facade; this is the one
// place that decides where records end up.

use std::io::Write;
use std::path::PathBuf;

use log::{LevelFilter, Log, Metadata, Record};

pub struct FileLogger {
    level: LevelFilter,
    path:  PathBuf,
}

impl FileLogger {
    pub fn new(level: LevelFilter, path: PathBuf) -> Self {
        Self { level, path }
    }

    /// Append one line to the log file. Never panics; a logger has nowhere
    /// to report its own failures.
    fn append(&self, line: &str) {
        if let Ok(mut f) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        {
            let ts = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            let _ = writeln!(f, "[{ts}] {line}");
        }
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("{:<5} {}", record.level(), record.args());
        eprintln!("{line}");
        self.append(&line);
    }

    fn flush(&self) {}
}

pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("gifer.log")
}

/// Install the process-wide logger. A second call is a no-op.
pub fn init(level: LevelFilter) {
    let logger: &'static FileLogger = Box::leak(Box::new(FileLogger::new(level, log_path())));
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at<'a>(level: log::Level, args: std::fmt::Arguments<'a>) -> Record<'a> {
        Record::builder().level(level).args(args).build()
    }

    #[test]
    fn writes_enabled_records_only() {
        let dir    = tempfile::tempdir().unwrap();
        let path   = dir.path().join("gifer.log");
        let logger = FileLogger::new(LevelFilter::Info, path.clone());

        logger.log(&record_at(log::Level::Info, format_args!("[media] probed")));
        logger.log(&record_at(log::Level::Debug, format_args!("too chatty")));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("INFO  [media] probed"));
        assert!(!text.contains("too chatty"));
        assert_eq!(text.lines().count(), 1);
    }
}
