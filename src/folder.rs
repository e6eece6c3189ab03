//! Image queue for "save & next" / "skip" navigation
//!
//! Picking image 1 loads every image in the same folder (not recursive),
//! sorted by path, with the cursor on the picked file.

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// File extensions offered by the picker and collected from the folder
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];

/// Whether a path looks like a supported image (case-insensitive extension)
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Sorted images of one folder with a cursor
#[derive(Debug, Clone, Default)]
pub struct ImageQueue {
    files: Vec<PathBuf>,
    index: usize,
}

impl ImageQueue {
    /// Collect the images next to `selected` and point at it.
    /// Falls back to the first image if `selected` is not among them.
    pub fn from_selected(selected: &Path) -> Result<Self> {
        let selected = std::path::absolute(selected).map_err(|e| Error::io(selected, e))?;
        let folder = selected
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        let mut files = Vec::new();
        let walker = WalkDir::new(&folder)
            .follow_links(true)
            .min_depth(1)
            .max_depth(1);
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                // A dangling link inside the folder is skipped, the folder itself must be readable
                Err(e) if e.depth() > 0 => {
                    debug!("Skipping {}: {}", e.path().unwrap_or(&folder).display(), e);
                    continue;
                }
                Err(e) => {
                    let path = e.path().unwrap_or(&folder).to_path_buf();
                    return Err(Error::io(path, e.into()));
                }
            };
            if entry.file_type().is_file() && is_image(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();

        let index = files
            .iter()
            .position(|p| *p == selected)
            .or_else(|| {
                let canonical = std::fs::canonicalize(&selected).ok()?;
                files
                    .iter()
                    .position(|p| std::fs::canonicalize(p).ok().as_ref() == Some(&canonical))
            })
            .unwrap_or(0);

        Ok(Self { files, index })
    }

    /// The image the cursor is on
    pub fn current(&self) -> Option<&Path> {
        self.files.get(self.index).map(PathBuf::as_path)
    }

    /// Move to the next image; `None` once the folder is exhausted
    pub fn advance(&mut self) -> Option<&Path> {
        if self.index + 1 < self.files.len() {
            self.index += 1;
            self.current()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn folder_with(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            fs::write(dir.path().join(name), b"img").unwrap();
        }
        dir
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Path::new("a.PNG")));
        assert!(is_image(Path::new("a.webp")));
        assert!(!is_image(Path::new("a.txt")));
        assert!(!is_image(Path::new("png")));
    }

    #[test]
    fn test_collects_sorted_images_only() {
        let dir = folder_with(&["c.jpg", "a.png", "notes.txt", "b.GIF"]);
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("d.png"), b"img").unwrap();

        let queue = ImageQueue::from_selected(&dir.path().join("b.GIF")).unwrap();

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.current(), Some(dir.path().join("b.GIF").as_path()));
    }

    #[test]
    fn test_advance_until_end() {
        let dir = folder_with(&["a.png", "b.png", "c.png"]);
        let mut queue = ImageQueue::from_selected(&dir.path().join("b.png")).unwrap();

        assert_eq!(queue.advance(), Some(dir.path().join("c.png").as_path()));
        assert_eq!(queue.advance(), None);
        assert_eq!(queue.current(), Some(dir.path().join("c.png").as_path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_images_are_queued() {
        let dir = folder_with(&["a.png"]);
        let elsewhere = folder_with(&["shared.png"]);
        std::os::unix::fs::symlink(elsewhere.path().join("shared.png"), dir.path().join("b.png"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.png"), dir.path().join("c.png")).unwrap();

        let mut queue = ImageQueue::from_selected(&dir.path().join("a.png")).unwrap();

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.advance(), Some(dir.path().join("b.png").as_path()));
        assert_eq!(queue.advance(), None);
    }

    #[test]
    fn test_empty_folder_gives_empty_queue() {
        let dir = folder_with(&["notes.txt"]);
        let queue = ImageQueue::from_selected(&dir.path().join("notes.txt")).unwrap();
        assert!(queue.is_empty());
        assert_eq!(queue.current(), None);
    }

    #[test]
    fn test_unknown_selection_starts_at_first() {
        let dir = folder_with(&["a.png", "b.png"]);
        let queue = ImageQueue::from_selected(&dir.path().join("missing.png")).unwrap();
        assert_eq!(queue.current(), Some(dir.path().join("a.png").as_path()));
    }
}
