//! Form input, validation and entry assembly
//!
//! The window collects a [`FormInput`]; everything from here on is plain data
//! so the save path can be exercised without a UI.

use std::path::{Path, PathBuf};

use crate::config::TaggerConfig;
use crate::error::{Result, ValidationError};
use crate::paths::{make_relative, module_path};
use crate::state::data::{derive_key, Art, Entry, SCALE_MAX, SCALE_MIN};
use crate::tags::TagSelection;

/// What the operator entered, exactly as typed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormInput {
    /// Image 1 (portrait/thumb), required
    pub primary_path: String,
    /// Image 2 (token/subject), optional
    pub secondary_path: String,
    pub label: String,
    /// Raw text of the scale field
    pub scale: String,
    pub tags: TagSelection,
}

/// A form that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedForm {
    pub primary: PathBuf,
    /// Image 2, or image 1 when image 2 was left empty
    pub secondary: PathBuf,
    pub label: String,
    pub scale: u8,
    pub tags: TagSelection,
}

impl FormInput {
    /// Check required fields and the scale range
    pub fn validate(&self) -> std::result::Result<ValidatedForm, ValidationError> {
        let primary = self.primary_path.trim();
        if primary.is_empty() {
            return Err(ValidationError::MissingPrimaryImage);
        }

        let secondary = match self.secondary_path.trim() {
            "" => primary,
            other => other,
        };

        let label = self.label.trim();
        if label.is_empty() {
            return Err(ValidationError::MissingLabel);
        }

        let scale = parse_scale(&self.scale)?;

        Ok(ValidatedForm {
            primary: PathBuf::from(primary),
            secondary: PathBuf::from(secondary),
            label: label.to_string(),
            scale,
            tags: self.tags.clone(),
        })
    }
}

fn parse_scale(raw: &str) -> std::result::Result<u8, ValidationError> {
    let raw = raw.trim();
    let value: i64 = raw
        .parse()
        .map_err(|_| ValidationError::ScaleNotInteger(raw.to_string()))?;

    if value < i64::from(SCALE_MIN) || value > i64::from(SCALE_MAX) {
        return Err(ValidationError::ScaleOutOfRange {
            value,
            min: SCALE_MIN,
            max: SCALE_MAX,
        });
    }
    Ok(value as u8)
}

impl ValidatedForm {
    /// Assemble the datasheet entry for the given module
    pub fn build_entry(&self, config: &TaggerConfig, module_id: &str) -> Result<Entry> {
        let key = match &config.fixed_key {
            Some(key) => key.clone(),
            None => derive_key(&self.label),
        };

        let module_asset = |path: &Path| -> Result<String> {
            Ok(module_path(module_id, &make_relative(&config.base_dir, path)?))
        };

        Ok(Entry {
            label: self.label.clone(),
            key,
            source: config.source.clone(),
            art: Art::from_paths(
                module_asset(&self.primary)?,
                module_asset(&self.secondary)?,
                self.scale,
            ),
            tags: self.tags.clone(),
        })
    }
}

/// Suggest a label from the file name: `goblin_war-chief.png` → `goblin war chief`
pub fn suggest_label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace(['_', '-'], " "))
        .unwrap_or_default()
}
