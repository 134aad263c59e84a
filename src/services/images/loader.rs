//! Image extension filtering, listing, and decode validation.

use std::path::{Path, PathBuf};

use image::DynamicImage;

/// Extensions accepted as prescription images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Check if a file has a supported image extension.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// List the image files directly inside `dir`, lexicographically sorted.
pub fn list_images(dir: &Path) -> Vec<PathBuf> {
    let mut images: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| is_image_file(path))
            .collect(),
        Err(_) => Vec::new(),
    };
    images.sort();
    images
}

/// Decode an image, returning `None` for anything unreadable.
///
/// Corrupt or unsupported files are expected input; callers use the `None`
/// signal to skip-and-continue.
pub fn load_image(path: &Path) -> Option<DynamicImage> {
    if !is_image_file(path) {
        return None;
    }

    match image::open(path) {
        Ok(img) => Some(img),
        Err(e) => {
            log::debug!("Failed to decode {}: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
