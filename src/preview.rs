//! Preview thumbnails for the two image slots
//! Decodes the image and shrinks it to fit the preview box, keeping the aspect ratio

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// Largest edge of a preview thumbnail
pub const PREVIEW_SIZE: u32 = 250;

/// Decoded RGBA thumbnail ready to hand to the UI
#[derive(Clone)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

// Pixel buffers are too large to be useful in debug output
impl std::fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thumbnail")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Load a preview thumbnail without blocking the UI
pub async fn load_thumbnail(path: PathBuf) -> Result<Thumbnail> {
    // Spawn blocking because decoding large images is CPU-bound
    let task_path = path.clone();
    tokio::task::spawn_blocking(move || load_thumbnail_blocking(&task_path))
        .await
        .map_err(|e| Error::io(path, std::io::Error::other(e)))?
}

/// Blocking implementation of thumbnail loading
pub fn load_thumbnail_blocking(path: &Path) -> Result<Thumbnail> {
    let img = image::open(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;

    // Only ever shrink, small art is shown at its own size
    let thumb = if img.width() > PREVIEW_SIZE || img.height() > PREVIEW_SIZE {
        img.thumbnail(PREVIEW_SIZE, PREVIEW_SIZE).to_rgba8()
    } else {
        img.to_rgba8()
    };
    let (width, height) = thumb.dimensions();
    debug!("🖼️  Preview {}x{} for {}", width, height, path.display());

    Ok(Thumbnail {
        width,
        height,
        pixels: thumb.into_raw(),
    })
}
