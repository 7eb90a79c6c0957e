//! Rotating log file writer with size-based rotation and backup retention.
//!
//! Plugged into the fmt layer as a [`MakeWriter`]. Each formatted event is
//! written through a shared, lazily opened file handle; when the file grows
//! past the size limit it is renamed with a timestamp suffix and old backups
//! beyond the retention count are removed.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

/// Maximum file size before rotation (10 MiB).
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Number of backup files to retain after rotation.
const MAX_BACKUP_FILES: usize = 3;

/// Thread-safe rotating file writer.
///
/// Backups are named `<file>.<unix_timestamp>`, e.g.
/// `feedback.log.1760862600`.
pub struct RotatingFileWriter {
    file_path: PathBuf,
    max_bytes: u64,
    file: Mutex<Option<File>>,
}

impl RotatingFileWriter {
    /// Creates a writer for `file_path`. The file is opened on first write.
    #[must_use]
    pub const fn new(file_path: PathBuf) -> Self {
        Self::with_limit(file_path, MAX_FILE_SIZE_BYTES)
    }

    /// Creates a writer that rotates once the file exceeds `max_bytes`.
    #[must_use]
    pub const fn with_limit(file_path: PathBuf, max_bytes: u64) -> Self {
        Self {
            file_path,
            max_bytes,
            file: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, Option<File>>> {
        self.file
            .lock()
            .map_err(|e| io::Error::other(format!("log writer mutex poisoned: {e}")))
    }

    fn write_all_rotating(&self, buf: &[u8]) -> io::Result<()> {
        let mut file = self.lock()?;

        if fs::metadata(&self.file_path).is_ok_and(|m| m.len() > self.max_bytes) {
            *file = None;
            self.rotate()?;
        }

        if file.is_none() {
            *file = Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.file_path)?,
            );
        }

        let handle = file
            .as_mut()
            .ok_or_else(|| io::Error::other("log file unavailable"))?;
        handle.write_all(buf)?;
        handle.flush()
    }

    fn rotate(&self) -> io::Result<()> {
        let timestamp = chrono::Utc::now().timestamp();
        let mut backup = self.file_path.clone().into_os_string();
        backup.push(format!(".{timestamp}"));

        if self.file_path.exists() {
            fs::rename(&self.file_path, PathBuf::from(backup))?;
        }
        self.cleanup_old_backups()
    }

    fn cleanup_old_backups(&self) -> io::Result<()> {
        let parent = self
            .file_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let Some(file_name) = self.file_path.file_name().and_then(|s| s.to_str()) else {
            return Err(io::Error::other("log file name is not valid UTF-8"));
        };
        let prefix = format!("{file_name}.");

        let mut backups: Vec<PathBuf> = fs::read_dir(parent)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| name.strip_prefix(&prefix))
                    .is_some_and(|suffix| suffix.bytes().all(|b| b.is_ascii_digit()))
            })
            .collect();

        // Newest first; the suffix is a unix timestamp.
        backups.sort_by(|a, b| b.cmp(a));

        for old_backup in backups.iter().skip(MAX_BACKUP_FILES) {
            let _ = fs::remove_file(old_backup);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RotatingFileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFileWriter")
            .field("file_path", &self.file_path)
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

/// Per-event writer handed out by [`RotatingFileWriter::make_writer`].
#[derive(Debug)]
pub struct RotatingWriterHandle<'a> {
    owner: &'a RotatingFileWriter,
}

impl Write for RotatingWriterHandle<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.owner.write_all_rotating(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingWriterHandle<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingWriterHandle { owner: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_append_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RotatingFileWriter::new(dir.path().join("feedback.log"));

        writer.make_writer().write_all(b"first\n").unwrap();
        writer.make_writer().write_all(b"second\n").unwrap();

        let contents = fs::read_to_string(writer.path()).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn oversized_file_is_rotated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.log");
        let writer = RotatingFileWriter::with_limit(path.clone(), 8);

        writer.make_writer().write_all(b"0123456789\n").unwrap();
        writer.make_writer().write_all(b"after\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "after\n");
        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with("feedback.log."))
            .collect();
        assert_eq!(backups.len(), 1);
    }

    #[test]
    fn only_recent_backups_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.log");
        for ts in 1..=5 {
            fs::write(dir.path().join(format!("feedback.log.{ts}")), b"old").unwrap();
        }

        let writer = RotatingFileWriter::new(path);
        writer.cleanup_old_backups().unwrap();

        let mut remaining: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(std::result::Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        remaining.sort();
        assert_eq!(remaining, vec!["feedback.log.3", "feedback.log.4", "feedback.log.5"]);
    }
}
