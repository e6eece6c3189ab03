//! Tagging session: the controller between the form and the files
//!
//! One operator action maps to one synchronous call here. The datasheet
//! append and the processed-log append are independent writes; a failing log
//! write only produces a warning.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::TaggerConfig;
use crate::error::{Error, Result};
use crate::folder::ImageQueue;
use crate::form::{suggest_label, FormInput};
use crate::paths::make_relative;
use crate::state::processed::ProcessedLog;
use crate::state::store::AnnotationStore;

/// Result of choosing image 1
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryPick {
    /// The image is already in the processed log
    pub already_processed: bool,
    /// Label suggested from the file name
    pub suggested_label: String,
    /// Non-fatal problem, e.g. the folder could not be listed
    pub warning: Option<String>,
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// Next image in the folder, `None` when the folder is done
    pub next: Option<PathBuf>,
    /// Non-fatal problems, e.g. the processed log could not be written
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct Session {
    config: TaggerConfig,
    module_id: String,
    store: AnnotationStore,
    log: ProcessedLog,
    queue: ImageQueue,
    saved_count: usize,
}

impl Session {
    /// Open the datasheet and the processed log for a module.
    /// Returns warnings for anything that failed but does not stop tagging.
    pub fn start(config: TaggerConfig, module_id: impl Into<String>) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();

        let store = AnnotationStore::new(&config);
        let mut log = ProcessedLog::new(&config.processed_log_path);
        if let Err(e) = log.reload() {
            warn!("⚠️  Could not read processed log {}: {}", log.path().display(), e);
            warnings.push(format!("The processed log could not be read:\n{}", e));
        }

        let saved_count = store.count_entries();
        // An unreadable datasheet counts as empty and is replaced on the next save
        if saved_count == 0 {
            if let Err(e @ Error::Parse { .. }) = store.load_entries() {
                warn!("⚠️  {}", e);
                warnings.push(format!(
                    "The datasheet is not a valid list and will be replaced on the next save:\n{}",
                    e
                ));
            }
        }

        let module_id = module_id.into();
        info!(
            "🎨 Tagging for module '{}' with {} saved entries in {}, {} processed images",
            module_id,
            saved_count,
            store.path().display(),
            log.len()
        );

        let session = Self {
            config,
            module_id,
            store,
            log,
            queue: ImageQueue::default(),
            saved_count,
        };
        (session, warnings)
    }

    #[cfg(test)]
    pub fn config(&self) -> &TaggerConfig {
        &self.config
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    #[cfg(test)]
    pub fn saved_count(&self) -> usize {
        self.saved_count
    }

    /// Status line shown under the buttons
    pub fn status_text(&self) -> String {
        format!("Images: {} / {}", self.saved_count, self.queue.len())
    }

    /// Whether the image is already listed in the processed log
    pub fn is_processed(&self, path: &Path) -> bool {
        make_relative(&self.config.base_dir, path)
            .map(|rel| self.log.contains(&rel))
            .unwrap_or(false)
    }

    /// Image 1 was chosen in the picker: load its folder into the queue
    pub fn pick_primary(&mut self, path: &Path) -> PrimaryPick {
        let already_processed = self.is_processed(path);
        if already_processed {
            info!("🔁 {} was already tagged", path.display());
        }

        let warning = match ImageQueue::from_selected(path) {
            Ok(queue) => {
                self.queue = queue;
                None
            }
            Err(e) => {
                warn!("⚠️  Could not list folder of {}: {}", path.display(), e);
                self.queue = ImageQueue::default();
                Some(format!("The folder could not be read:\n{}", e))
            }
        };

        self.saved_count = self.store.count_entries();

        PrimaryPick {
            already_processed,
            suggested_label: suggest_label(path),
            warning,
        }
    }

    /// Validate, append to the datasheet, log the image and move on.
    ///
    /// Validation and datasheet failures return an error and change nothing.
    pub fn save(&mut self, input: &FormInput) -> Result<SaveOutcome> {
        let form = input.validate()?;
        let entry = form.build_entry(&self.config, &self.module_id)?;

        self.store.append_entry(&entry)?;
        self.saved_count += 1;

        let mut warnings = Vec::new();
        match make_relative(&self.config.base_dir, &form.primary) {
            Ok(rel) => {
                if let Err(e) = self.log.record_processed(&rel) {
                    warn!("⚠️  Could not update processed log: {}", e);
                    warnings.push(format!("The processed log could not be written:\n{}", e));
                }
            }
            Err(e) => warnings.push(e.to_string()),
        }

        Ok(SaveOutcome {
            next: self.advance(),
            warnings,
        })
    }

    /// Move on without saving
    pub fn skip(&mut self) -> Option<PathBuf> {
        self.advance()
    }

    fn advance(&mut self) -> Option<PathBuf> {
        let next = self.queue.advance().map(Path::to_path_buf);
        if next.is_none() {
            info!("✅ No more images in this folder");
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::tags::{TagBoard, Taxonomy};
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        session: Session,
    }

    fn fixture(images: &[&str]) -> Fixture {
        let dir = TempDir::new().unwrap();
        let art = dir.path().join("images");
        fs::create_dir(&art).unwrap();
        for name in images {
            fs::write(art.join(name), b"img").unwrap();
        }
        let (session, warnings) =
            Session::start(TaggerConfig::with_base_dir(dir.path()), "token-sammlung");
        assert!(warnings.is_empty());
        Fixture { dir, session }
    }

    fn form_for(path: &Path, label: &str) -> FormInput {
        FormInput {
            primary_path: path.to_string_lossy().into_owned(),
            label: label.to_string(),
            scale: "1".to_string(),
            ..FormInput::default()
        }
    }

    #[test]
    fn test_save_writes_entry_and_log() {
        let mut f = fixture(&["goblin.png", "goblin_token.png"]);
        let goblin = f.dir.path().join("images/goblin.png");
        let token = f.dir.path().join("images/goblin_token.png");

        let pick = f.session.pick_primary(&goblin);
        assert!(!pick.already_processed);
        assert_eq!(pick.suggested_label, "goblin");

        let mut board = TagBoard::new(Taxonomy::builtin());
        board.toggle("ancestry", "goblin", true);
        board.toggle("family", "warrior", true);
        let input = FormInput {
            secondary_path: token.to_string_lossy().into_owned(),
            tags: board.selection(),
            ..form_for(&goblin, "Goblin Warrior")
        };

        let outcome = f.session.save(&input).unwrap();
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.next, Some(token.clone()));
        assert_eq!(f.session.saved_count(), 1);

        let text = fs::read_to_string(f.dir.path().join("datasheet.json")).unwrap();
        let label_at = text.find("\"label\"").unwrap();
        let tags_at = text.find("\"tags\"").unwrap();
        assert!(label_at < text.find("\"art\"").unwrap());
        assert!(text.find("\"art\"").unwrap() < tags_at);
        assert!(text.find("\"ancestry\"").unwrap() < text.find("\"family\"").unwrap());
        let datasheet: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            datasheet,
            serde_json::json!([{
                "label": "Goblin Warrior",
                "key": "Goblin-Warrior",
                "source": "Token Sammlung",
                "art": {
                    "portrait": "/modules/token-sammlung/images/goblin.png",
                    "thumb": "/modules/token-sammlung/images/goblin.png",
                    "token": "/modules/token-sammlung/images/goblin_token.png",
                    "subject": "/modules/token-sammlung/images/goblin_token.png",
                    "scale": 1
                },
                "tags": { "ancestry": ["goblin"], "family": ["warrior"] }
            }])
        );
        assert_eq!(
            fs::read_to_string(f.dir.path().join("processed_log.txt")).unwrap(),
            "images/goblin.png\n"
        );
        assert!(f.session.is_processed(&goblin));
    }

    #[test]
    fn test_validation_error_writes_nothing() {
        let mut f = fixture(&["elf.png"]);
        let elf = f.dir.path().join("images/elf.png");
        f.session.pick_primary(&elf);

        let result = f.session.save(&form_for(&elf, "  "));

        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::MissingLabel))
        ));
        assert!(!f.dir.path().join("datasheet.json").exists());
        assert!(!f.dir.path().join("processed_log.txt").exists());
        assert_eq!(f.session.saved_count(), 0);
    }

    #[test]
    fn test_already_processed_warning_on_restart() {
        let mut f = fixture(&["orc.png"]);
        let orc = f.dir.path().join("images/orc.png");
        f.session.pick_primary(&orc);
        f.session.save(&form_for(&orc, "Orc")).unwrap();

        let (mut restarted, _) =
            Session::start(TaggerConfig::with_base_dir(f.dir.path()), "token-sammlung");
        assert_eq!(restarted.saved_count(), 1);
        assert!(restarted.pick_primary(&orc).already_processed);
    }

    #[test]
    fn test_corrupt_datasheet_warns_at_start() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("datasheet.json"), "[{\"label\": ").unwrap();

        let (session, warnings) = Session::start(TaggerConfig::with_base_dir(dir.path()), "m");

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("will be replaced"));
        assert_eq!(session.saved_count(), 0);
    }

    #[test]
    fn test_empty_datasheet_starts_quietly() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("datasheet.json"), "[]").unwrap();

        let (_, warnings) = Session::start(TaggerConfig::with_base_dir(dir.path()), "m");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_skip_walks_the_folder() {
        let mut f = fixture(&["a.png", "b.png", "c.png"]);
        f.session.pick_primary(&f.dir.path().join("images/a.png"));
        assert_eq!(f.session.status_text(), "Images: 0 / 3");

        assert_eq!(f.session.skip(), Some(f.dir.path().join("images/b.png")));
        assert_eq!(f.session.skip(), Some(f.dir.path().join("images/c.png")));
        assert_eq!(f.session.skip(), None);
    }

    #[test]
    fn test_log_failure_is_only_a_warning() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("kobold.png"), b"img").unwrap();
        let mut config = TaggerConfig::with_base_dir(dir.path());
        // A directory in place of the log file makes the append fail
        config.processed_log_path = dir.path().join("logdir");
        fs::create_dir(&config.processed_log_path).unwrap();

        let (mut session, warnings) = Session::start(config, "m");
        assert_eq!(warnings.len(), 1);

        let kobold = dir.path().join("kobold.png");
        session.pick_primary(&kobold);
        let outcome = session.save(&form_for(&kobold, "Kobold")).unwrap();

        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(session.saved_count(), 1);
        assert_eq!(AnnotationStore::new(session.config()).count_entries(), 1);
    }
}
