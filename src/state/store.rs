use chrono::Utc;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::data::Entry;
use crate::config::TaggerConfig;
use crate::error::{Error, Result};

/// The AnnotationStore owns the JSON datasheet.
///
/// The datasheet is one JSON array of entries. Every append reads the whole
/// array, pushes the new entry and rewrites the whole file; there is no
/// incremental append and no locking, so two taggers running against the
/// same file will overwrite each other.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    path: PathBuf,
    backup_corrupt: bool,
}

impl AnnotationStore {
    /// Create a store for the datasheet named in the config.
    /// Nothing is touched on disk until the first append.
    pub fn new(config: &TaggerConfig) -> Self {
        Self {
            path: config.datastore_path.clone(),
            backup_corrupt: config.backup_corrupt,
        }
    }

    /// Get the path to the datasheet
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries currently stored.
    /// Absent, unreadable, corrupt or non-array files count as 0.
    pub fn count_entries(&self) -> usize {
        let Ok(bytes) = fs::read(&self.path) else {
            return 0;
        };
        serde_json::from_slice::<Vec<Value>>(&bytes)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    /// Read all entries, failing on anything that is not a valid datasheet.
    /// An absent file is an empty datasheet.
    pub fn load_entries(&self) -> Result<Vec<Entry>> {
        match self.read_bytes()? {
            None => Ok(Vec::new()),
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|source| Error::Parse {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Append one entry and rewrite the full datasheet.
    ///
    /// A file that does not parse as a JSON array is treated as empty and
    /// replaced (copied aside first when `backup_corrupt` is on). Existing
    /// elements are carried over verbatim. The new content is written to a
    /// sibling temp file and renamed into place, so a failed write leaves the
    /// previous datasheet as it was.
    pub fn append_entry(&self, entry: &Entry) -> Result<()> {
        let mut entries = self.read_for_append()?;

        let value = serde_json::to_value(entry).map_err(|source| Error::Serialize {
            path: self.path.clone(),
            source,
        })?;
        entries.push(value);

        self.write_all(&entries)?;
        info!(
            "💾 Saved '{}' ({} entries in {})",
            entry.label,
            entries.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Raw file content, `None` when the file does not exist yet
    fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }

    fn read_for_append(&self) -> Result<Vec<Value>> {
        let Some(bytes) = self.read_bytes()? else {
            debug!("Datasheet {} does not exist yet", self.path.display());
            return Ok(Vec::new());
        };

        match serde_json::from_slice::<Vec<Value>>(&bytes) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(
                    "⚠️  Datasheet {} is not a valid JSON array ({}), starting from an empty list",
                    self.path.display(),
                    e
                );
                if self.backup_corrupt {
                    self.backup(&bytes)?;
                }
                Ok(Vec::new())
            }
        }
    }

    /// Copy corrupt content next to the datasheet before it gets replaced
    fn backup(&self, bytes: &[u8]) -> Result<PathBuf> {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.3fZ")));
        let backup_path = self.path.with_file_name(name);

        fs::write(&backup_path, bytes).map_err(|e| Error::io(&backup_path, e))?;
        warn!("📦 Backed up corrupt datasheet to {}", backup_path.display());
        Ok(backup_path)
    }

    fn write_all(&self, entries: &[Value]) -> Result<()> {
        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
        entries
            .serialize(&mut serializer)
            .map_err(|source| Error::Serialize {
                path: self.path.clone(),
                source,
            })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, &buffer) {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::io(&temp_path, e));
        }
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::io(&self.path, e));
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
