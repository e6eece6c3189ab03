//! Path handling for stored image references
//!
//! Image paths are stored relative to the project base directory with forward
//! slashes, so the datasheet survives moving the project folder and reads the
//! same on every platform. The consuming application addresses assets as
//! `/modules/<module-id>/<relative path>`.

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

use crate::error::{Error, Result};

/// Module id offered in the startup prompt when nothing else is configured
pub const DEFAULT_MODULE_ID: &str = "token-sammlung";

/// Convert platform path separators to forward slashes
pub fn normalize_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    if MAIN_SEPARATOR == '/' {
        raw.into_owned()
    } else {
        raw.replace(MAIN_SEPARATOR, "/")
    }
}

/// Express `path` relative to `base_dir` and normalize the separators.
///
/// Both paths are made absolute against the current directory and cleaned
/// lexically (`.` dropped, `..` folded) before comparing; symlinks are not
/// resolved. Paths outside the base tree come back with leading `..`
/// segments. Fails with [`Error::NotRelative`] when the two paths share no
/// root at all, e.g. different drive letters on Windows.
pub fn make_relative(base_dir: &Path, path: &Path) -> Result<String> {
    let base = clean(&absolutize(base_dir)?);
    let target = clean(&absolutize(path)?);

    let base_parts: Vec<Component> = base.components().collect();
    let target_parts: Vec<Component> = target.components().collect();

    // The prefix (drive) and root must match or there is no relative path
    if anchor(&base_parts) != anchor(&target_parts) {
        return Err(Error::NotRelative {
            base: base_dir.to_path_buf(),
            path: path.to_path_buf(),
        });
    }

    let shared = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in shared..base_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[shared..] {
        relative.push(part.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        return Ok(".".to_string());
    }
    Ok(normalize_path(&relative))
}

/// Address of an asset inside the consuming application's module folder
pub fn module_path(module_id: &str, relative: &str) -> String {
    format!("/modules/{}/{}", module_id, relative)
}

/// Check a module id and return it trimmed.
///
/// Valid ids are non-empty and made of lowercase ASCII letters and `-`.
pub fn validate_module_id(input: &str) -> Result<String> {
    let id = input.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_lowercase() || c == '-') {
        return Err(Error::InvalidModuleId(id.to_string()));
    }
    Ok(id.to_string())
}

/// Leading prefix and root components of a path
fn anchor<'a>(parts: &[Component<'a>]) -> Vec<Component<'a>> {
    parts
        .iter()
        .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
        .copied()
        .collect()
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| Error::io(path, e))
}

/// Lexically remove `.` and fold `..` into the preceding component
fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last().copied() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}
