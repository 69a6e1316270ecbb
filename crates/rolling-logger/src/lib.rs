//! Rolling File Logger
//!
//! Writes formatted `tracing` events (and `log` records, bridged through
//! `tracing-log`) to `<dir>/<app>.log`, rotating to `<app>.log.1`, `.2`, ...
//! once the file grows past a size limit. The most recent lines are also
//! kept in memory so the app can show them without touching the disk.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;

/// Rotate once the active file reaches this size
pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;
/// Rotated files kept next to the active one
pub const DEFAULT_KEEP_FILES: usize = 3;
/// Lines kept in the in-memory buffer
pub const DEFAULT_BUFFER_LINES: usize = 500;

static LOGGER: OnceLock<RollingWriter> = OnceLock::new();

/// Install the global subscriber writing under `log_dir`
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), String> {
    let writer = RollingWriter::open(
        log_dir.as_ref(),
        app_name,
        DEFAULT_MAX_BYTES,
        DEFAULT_KEEP_FILES,
        DEFAULT_BUFFER_LINES,
    )
    .map_err(|e| format!("Failed to open log file: {}", e))?;

    tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_timer(LocalTime)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| format!("Failed to install logger: {}", e))?;

    if let Some(path) = writer.path() {
        // Goes through the log -> tracing bridge installed above
        log::info!(target: "rolling_logger", "logging to {}", path.display());
    }

    LOGGER
        .set(writer)
        .map_err(|_| "Logger already initialized".to_string())
}

pub fn info(message: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::info!(target: "app", "{}", message);
    Ok(())
}

pub fn warn(message: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::warn!(target: "app", "{}", message);
    Ok(())
}

pub fn error(message: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::error!(target: "app", "{}", message);
    Ok(())
}

/// Most recent log lines, oldest first (empty before `init_logger`)
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(|w| w.recent_lines()).unwrap_or_default()
}

fn ensure_initialized() -> Result<(), String> {
    if LOGGER.get().is_none() {
        return Err("Logger not initialized".to_string());
    }
    Ok(())
}

/// `HH:MM:SS.mmm` in local time
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

struct RollingState {
    dir: PathBuf,
    name: String,
    file: File,
    size: u64,
    max_bytes: u64,
    keep: usize,
    recent: VecDeque<String>,
    capacity: usize,
    partial: String,
}

impl RollingState {
    fn active_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.name))
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.log.{}", self.name, index))
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.keep == 0 {
            self.file = File::create(self.active_path())?;
            self.size = 0;
            return Ok(());
        }

        let oldest = self.rotated_path(self.keep);
        if oldest.exists() {
            std::fs::remove_file(&oldest)?;
        }
        for index in (1..self.keep).rev() {
            let from = self.rotated_path(index);
            if from.exists() {
                std::fs::rename(&from, self.rotated_path(index + 1))?;
            }
        }
        std::fs::rename(self.active_path(), self.rotated_path(1))?;

        self.file = File::create(self.active_path())?;
        self.size = 0;
        Ok(())
    }

    fn remember(&mut self, buf: &[u8]) {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(end) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=end).collect();
            if self.recent.len() == self.capacity {
                self.recent.pop_front();
            }
            self.recent.push_back(line.trim_end().to_string());
        }
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.size > 0 && self.size + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.size += buf.len() as u64;
        if self.capacity > 0 {
            self.remember(buf);
        }
        Ok(buf.len())
    }
}

/// Size-rotated log file plus an in-memory ring of recent lines
///
/// Cheap to clone; all clones share the same file.
#[derive(Clone)]
pub struct RollingWriter {
    state: Arc<Mutex<RollingState>>,
}

impl RollingWriter {
    pub fn open(
        dir: &Path,
        name: &str,
        max_bytes: u64,
        keep: usize,
        capacity: usize,
    ) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.log", name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            state: Arc::new(Mutex::new(RollingState {
                dir: dir.to_path_buf(),
                name: name.to_string(),
                file,
                size,
                max_bytes,
                keep,
                recent: VecDeque::with_capacity(capacity),
                capacity,
                partial: String::new(),
            })),
        })
    }

    pub fn recent_lines(&self) -> Vec<String> {
        match self.state.lock() {
            Ok(state) => state.recent.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.state.lock().ok().map(|state| state.active_path())
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("log writer poisoned"))?;
        state.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("log writer poisoned"))?;
        state.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_writes_to_active_file() {
        let dir = tempdir().unwrap();
        let mut writer = RollingWriter::open(dir.path(), "Ideas", 1024, 2, 10).unwrap();

        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();

        let content = std::fs::read_to_string(dir.path().join("Ideas.log")).unwrap();
        assert_eq!(content, "hello\n");
    }

    #[test]
    fn test_rotates_past_size_limit() {
        let dir = tempdir().unwrap();
        let mut writer = RollingWriter::open(dir.path(), "Ideas", 10, 2, 10).unwrap();

        writer.write_all(b"first 123\n").unwrap();
        writer.write_all(b"second 45\n").unwrap();
        writer.write_all(b"third 678\n").unwrap();
        writer.flush().unwrap();

        let read = |name: &str| std::fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(read("Ideas.log"), "third 678\n");
        assert_eq!(read("Ideas.log.1"), "second 45\n");
        assert_eq!(read("Ideas.log.2"), "first 123\n");
    }

    #[test]
    fn test_keeps_only_configured_rotations() {
        let dir = tempdir().unwrap();
        let mut writer = RollingWriter::open(dir.path(), "Ideas", 4, 1, 10).unwrap();

        for line in [b"aaa\n", b"bbb\n", b"ccc\n"] {
            writer.write_all(line).unwrap();
        }

        assert!(dir.path().join("Ideas.log.1").exists());
        assert!(!dir.path().join("Ideas.log.2").exists());
    }

    #[test]
    fn test_buffer_keeps_most_recent_lines() {
        let dir = tempdir().unwrap();
        let mut writer = RollingWriter::open(dir.path(), "Ideas", 1024, 1, 2).unwrap();

        writer.write_all(b"one\ntwo\n").unwrap();
        writer.write_all(b"thr").unwrap();
        writer.write_all(b"ee\n").unwrap();

        assert_eq!(writer.recent_lines(), vec!["two", "three"]);
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Ideas.log"), "old\n").unwrap();

        let mut writer = RollingWriter::open(dir.path(), "Ideas", 1024, 1, 10).unwrap();
        writer.write_all(b"new\n").unwrap();

        let content = std::fs::read_to_string(dir.path().join("Ideas.log")).unwrap();
        assert_eq!(content, "old\nnew\n");
    }

    #[test]
    fn test_poisoned_writer_reports_io_error() {
        let dir = tempdir().unwrap();
        let mut writer = RollingWriter::open(dir.path(), "Ideas", 1024, 1, 10).unwrap();

        let state = Arc::clone(&writer.state);
        let _ = std::thread::spawn(move || {
            let _guard = state.lock().unwrap();
            panic!("writer thread died");
        })
        .join();

        let err = writer.write_all(b"lost\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(writer.flush().is_err());
    }

    #[test]
    fn test_helpers_fail_before_init() {
        // The global logger is never installed in unit tests
        assert!(info("not yet").is_err());
        assert!(recent_lines().is_empty());
    }
}
