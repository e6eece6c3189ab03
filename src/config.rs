//! Configuration loading and file location resolution
//!
//! Replaces hard-coded file locations with one explicit object handed to the
//! store and the log at construction. Resolution order:
//! 1. `GALLERY_TAGGER_CONFIG` environment variable (path to a TOML file)
//! 2. `tagger.toml` in the current directory
//! 3. `<user config dir>/gallery-tagger/config.toml`
//! 4. Built-in defaults

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::paths::DEFAULT_MODULE_ID;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "GALLERY_TAGGER_CONFIG";

const LOCAL_CONFIG_NAME: &str = "tagger.toml";
const DEFAULT_DATASTORE: &str = "datasheet.json";
const DEFAULT_PROCESSED_LOG: &str = "processed_log.txt";
const DEFAULT_SOURCE: &str = "Token Sammlung";

/// Settings as they appear in the TOML file; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    base_dir: Option<PathBuf>,
    datastore: Option<PathBuf>,
    processed_log: Option<PathBuf>,
    module_id: Option<String>,
    source: Option<String>,
    fixed_key: Option<String>,
    backup_corrupt: bool,
    taxonomy_path: Option<PathBuf>,
}

/// Fully resolved tagger configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TaggerConfig {
    /// Directory stored image paths are made relative to
    pub base_dir: PathBuf,
    /// JSON datasheet holding all entries
    pub datastore_path: PathBuf,
    /// Newline-delimited log of already tagged images
    pub processed_log_path: PathBuf,
    /// Module id prefilled in the startup prompt
    pub module_id: String,
    /// Value written to every entry's `source` field
    pub source: String,
    /// When set, every entry gets this key instead of one derived from the label
    pub fixed_key: Option<String>,
    /// Copy a corrupt datasheet aside before it gets replaced
    pub backup_corrupt: bool,
    /// External taxonomy file; `None` uses the built-in tag groups
    pub taxonomy_path: Option<PathBuf>,
}

impl TaggerConfig {
    /// Defaults rooted at `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            datastore_path: base_dir.join(DEFAULT_DATASTORE),
            processed_log_path: base_dir.join(DEFAULT_PROCESSED_LOG),
            base_dir,
            module_id: DEFAULT_MODULE_ID.to_string(),
            source: DEFAULT_SOURCE.to_string(),
            fixed_key: None,
            backup_corrupt: false,
            taxonomy_path: None,
        }
    }

    /// Resolve the configuration following the documented priority order
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;

        match locate_config_file(&cwd) {
            Some(path) => {
                info!("⚙️  Loading configuration from {}", path.display());
                Self::from_file(&path, &cwd)
            }
            None => {
                debug!("No config file found, using defaults in {}", cwd.display());
                Ok(Self::with_base_dir(cwd))
            }
        }
    }

    /// Load a TOML config file. Relative paths inside it are resolved against
    /// `fallback_base` (for `base_dir`) and then against `base_dir`.
    pub fn from_file(path: &Path, fallback_base: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&content, fallback_base)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    fn from_toml_str(content: &str, fallback_base: &Path) -> std::result::Result<Self, String> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| e.to_string())?;

        let base_dir = match raw.base_dir {
            Some(dir) => fallback_base.join(dir),
            None => fallback_base.to_path_buf(),
        };
        let mut config = Self::with_base_dir(&base_dir);

        if let Some(datastore) = raw.datastore {
            config.datastore_path = base_dir.join(datastore);
        }
        if let Some(log) = raw.processed_log {
            config.processed_log_path = base_dir.join(log);
        }
        if let Some(module_id) = raw.module_id {
            config.module_id =
                crate::paths::validate_module_id(&module_id).map_err(|e| e.to_string())?;
        }
        if let Some(source) = raw.source {
            config.source = source;
        }
        config.fixed_key = raw.fixed_key.filter(|k| !k.trim().is_empty());
        config.backup_corrupt = raw.backup_corrupt;
        config.taxonomy_path = raw.taxonomy_path.map(|p| base_dir.join(p));

        Ok(config)
    }
}

fn locate_config_file(cwd: &Path) -> Option<PathBuf> {
    // Priority 1: explicit environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    // Priority 2: project-local file
    let local = cwd.join(LOCAL_CONFIG_NAME);
    if local.is_file() {
        return Some(local);
    }

    // Priority 3: per-user config directory
    dirs::config_dir()
        .map(|dir| dir.join("gallery-tagger").join("config.toml"))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = TaggerConfig::with_base_dir("/project");
        assert_eq!(config.datastore_path, Path::new("/project/datasheet.json"));
        assert_eq!(config.processed_log_path, Path::new("/project/processed_log.txt"));
        assert_eq!(config.module_id, "token-sammlung");
        assert_eq!(config.source, "Token Sammlung");
        assert!(config.fixed_key.is_none());
        assert!(!config.backup_corrupt);
    }

    #[test]
    fn test_toml_overrides() {
        let toml = r#"
            base_dir = "gallery"
            datastore = "out/entries.json"
            module_id = "pf-gallery"
            source = "My Collection"
            fixed_key = "npc"
            backup_corrupt = true
            taxonomy_path = "tags.toml"
        "#;
        let config = TaggerConfig::from_toml_str(toml, Path::new("/home/op")).unwrap();

        assert_eq!(config.base_dir, Path::new("/home/op/gallery"));
        assert_eq!(config.datastore_path, Path::new("/home/op/gallery/out/entries.json"));
        assert_eq!(
            config.processed_log_path,
            Path::new("/home/op/gallery/processed_log.txt")
        );
        assert_eq!(config.module_id, "pf-gallery");
        assert_eq!(config.source, "My Collection");
        assert_eq!(config.fixed_key.as_deref(), Some("npc"));
        assert!(config.backup_corrupt);
        assert_eq!(
            config.taxonomy_path.as_deref(),
            Some(Path::new("/home/op/gallery/tags.toml"))
        );
    }

    #[test]
    fn test_rejects_bad_module_id_and_unknown_keys() {
        assert!(TaggerConfig::from_toml_str("module_id = \"Bad_Id\"", Path::new("/p")).is_err());
        assert!(TaggerConfig::from_toml_str("module_id = \"pf2e-gallery\"", Path::new("/p")).is_err());
        assert!(TaggerConfig::from_toml_str("colour = \"red\"", Path::new("/p")).is_err());
    }

    #[test]
    fn test_from_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tagger.toml");
        std::fs::write(&path, "backup_corrupt = \"yes\"").unwrap();

        let err = TaggerConfig::from_file(&path, dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("tagger.toml")));
    }
}
