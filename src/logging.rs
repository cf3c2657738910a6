//! Log file output
//!
//! `RotatingLogFile` is a `MakeWriter` for tracing-subscriber that appends
//! JSON lines to a file and rotates it once it grows past a size limit:
//! `forge.log` becomes `forge.log.1`, `.1` becomes `.2`, and the oldest
//! archive beyond `keep` is removed.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Rotate after 10 MB
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Archives kept next to the live file
pub const DEFAULT_KEEP: usize = 5;

#[derive(Debug, Clone)]
pub struct RotatingLogFile {
    state: Arc<Mutex<LogFileState>>,
}

#[derive(Debug)]
struct LogFileState {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    keep: usize,
}

impl RotatingLogFile {
    pub fn open(path: impl AsRef<Path>, max_bytes: u64, keep: usize) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let file = open_append(&path)?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            state: Arc::new(Mutex::new(LogFileState {
                path,
                file,
                written,
                max_bytes,
                keep,
            })),
        })
    }

    pub fn with_defaults(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::open(path, DEFAULT_MAX_BYTES, DEFAULT_KEEP)
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, LogFileState>> {
        self.state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl LogFileState {
    fn archive_path(&self, n: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{}", n));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.keep == 0 {
            self.file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path)?;
            self.written = 0;
            return Ok(());
        }

        let oldest = self.archive_path(self.keep);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for n in (1..self.keep).rev() {
            let from = self.archive_path(n);
            if from.exists() {
                fs::rename(&from, self.archive_path(n + 1))?;
            }
        }
        fs::rename(&self.path, self.archive_path(1))?;

        self.file = open_append(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock()?;
        if state.written > 0 && state.written + buf.len() as u64 > state.max_bytes {
            state.rotate()?;
        }
        let n = state.file.write(buf)?;
        state.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.file.flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for RotatingLogFile {
    type Writer = RotatingLogFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_creates_parent_and_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs/forge.log");

        RotatingLogFile::with_defaults(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("forge.log");

        let mut log = RotatingLogFile::with_defaults(&path).unwrap();
        log.write_all(b"first\n").unwrap();
        log.write_all(b"second\n").unwrap();
        log.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_rotates_and_prunes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("forge.log");

        let mut log = RotatingLogFile::open(&path, 64, 2).unwrap();
        for i in 0..20 {
            let line = format!("line {:02}: a request was logged here\n", i);
            log.write_all(line.as_bytes()).unwrap();
        }
        log.flush().unwrap();

        assert!(dir.path().join("forge.log.1").exists());
        assert!(dir.path().join("forge.log.2").exists());
        assert!(!dir.path().join("forge.log.3").exists());
        assert!(fs::read_to_string(&path).unwrap().contains("line 19"));
    }
}
