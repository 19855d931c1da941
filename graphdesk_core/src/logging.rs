//! Best-effort file log sink.
//!
//! Startup and per-invocation breadcrumbs are appended to a plain text file.
//! Every write failure is swallowed: the sink must never affect control
//! flow. Structured stderr diagnostics go through `tracing` instead.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;

pub struct LogSink {
    file: Option<Mutex<File>>,
}

impl LogSink {
    /// Open the sink at `GRAPHDESK_LOG_FILE`, or the default location under
    /// the platform data directory. Falls back to a disabled sink when the
    /// file cannot be opened.
    pub fn from_env() -> Self {
        let path = std::env::var("GRAPHDESK_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_log_path());
        Self::at_path(&path)
    }

    pub fn at_path(path: &Path) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path).ok();
        Self {
            file: file.map(Mutex::new),
        }
    }

    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn append(&self, level: &str, message: &str) {
        if let Some(file) = &self.file {
            if let Ok(mut f) = file.lock() {
                let _ = writeln!(f, "{} [{}] {}", Utc::now().to_rfc3339(), level, message);
            }
        }
    }
}

fn default_log_path() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    let dir = base.join("graphdesk");
    std::fs::create_dir_all(&dir).ok();
    dir.join("graphdesk.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        let sink = LogSink::at_path(&path);
        sink.append("info", "server starting");
        sink.append("error", "something failed");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[info] server starting"));
        assert!(lines[1].contains("[error] something failed"));
    }

    #[test]
    fn disabled_sink_swallows_writes() {
        LogSink::disabled().append("info", "dropped");
    }

    #[test]
    fn unopenable_path_degrades_to_disabled() {
        let sink = LogSink::at_path(Path::new("/nonexistent-dir/graphdesk.log"));
        sink.append("info", "dropped");
    }
}
