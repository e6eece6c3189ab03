use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Read the processed-path log into a set.
///
/// Lines are trimmed and blank lines skipped. A missing log is an empty set;
/// any other read failure is returned so the caller can warn about it.
pub fn load_processed_paths(path: &Path) -> Result<HashSet<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashSet::new()),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Append-only record of images that were already tagged.
///
/// Only used to warn the operator about duplicates; nothing is ever blocked
/// because of it, and it is written independently of the datasheet.
#[derive(Debug, Clone)]
pub struct ProcessedLog {
    path: PathBuf,
    paths: HashSet<String>,
}

impl ProcessedLog {
    /// An empty log backed by `path`; call [`ProcessedLog::reload`] to read it
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            paths: HashSet::new(),
        }
    }

    /// Replace the in-memory set with the file content.
    /// On failure the set is left empty.
    pub fn reload(&mut self) -> Result<usize> {
        self.paths.clear();
        self.paths = load_processed_paths(&self.path)?;
        debug!("Loaded {} processed paths from {}", self.paths.len(), self.path.display());
        Ok(self.paths.len())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Append `path` to the log unless it is already known.
    ///
    /// Returns whether a line was written. The path is remembered in memory
    /// even when the write fails, so the same session does not retry it.
    pub fn record_processed(&mut self, path: &str) -> Result<bool> {
        if !self.paths.insert(path.to_string()) {
            return Ok(false);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io(&self.path, e))?;
        writeln!(file, "{}", path).map_err(|e| {
            warn!("⚠️  Could not append to {}: {}", self.path.display(), e);
            Error::io(&self.path, e)
        })?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_log_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut log = ProcessedLog::new(dir.path().join("processed_log.txt"));
        assert_eq!(log.reload().unwrap(), 0);
        assert!(log.is_empty());
        assert!(!log.path().exists());
    }

    #[test]
    fn test_recorded_path_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed_log.txt");

        let mut log = ProcessedLog::new(&path);
        assert!(log.record_processed("images/goblin.png").unwrap());

        let mut fresh = ProcessedLog::new(&path);
        fresh.reload().unwrap();
        assert!(fresh.contains("images/goblin.png"));
    }

    #[test]
    fn test_recording_twice_writes_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed_log.txt");

        let mut log = ProcessedLog::new(&path);
        assert!(log.record_processed("images/elf.png").unwrap());
        assert!(!log.record_processed("images/elf.png").unwrap());

        // A fresh load also knows it, so a new session does not duplicate it either
        let mut fresh = ProcessedLog::new(&path);
        fresh.reload().unwrap();
        assert!(!fresh.record_processed("images/elf.png").unwrap());

        assert_eq!(fs::read_to_string(&path).unwrap(), "images/elf.png\n");
    }

    #[test]
    fn test_blank_lines_and_whitespace_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed_log.txt");
        fs::write(&path, "a.png\n\n  b.png  \r\n\n").unwrap();

        let paths = load_processed_paths(&path).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.contains("b.png"));
    }

    #[test]
    fn test_unreadable_log_is_reported() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be read as a log file
        let mut log = ProcessedLog::new(dir.path());
        assert!(matches!(log.reload(), Err(Error::Io { .. })));
        assert!(log.is_empty());
    }

    #[test]
    fn test_write_failure_is_an_error_but_remembered() {
        let dir = TempDir::new().unwrap();
        let mut log = ProcessedLog::new(dir.path());

        assert!(log.record_processed("x.png").is_err());
        assert!(log.contains("x.png"));
        assert!(!log.record_processed("x.png").unwrap());
    }
}
