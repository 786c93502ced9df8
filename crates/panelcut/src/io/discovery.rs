use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::debug;
use walkdir::WalkDir;
use crate::error::{PanelError, Result};

/// Extensions recognised as page images, compared lowercase.
pub const PAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff"];

pub fn is_page_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| PAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Recursively collect page images under `root`, sorted by path.
///
/// A `root` that is itself a page file is returned on its own.
#[tracing::instrument(skip_all, fields(root = %root.display()))]
pub fn discover_pages(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(if is_page_file(root) { vec![root.to_path_buf()] } else { Vec::new() });
    }

    let mut pages = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() && is_page_file(entry.path()) {
            pages.push(entry.into_path());
        }
    }
    pages.sort();

    debug!(count = pages.len(), "pages discovered");
    Ok(pages)
}

/// Decode a page from disk.
pub fn load_page(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| PanelError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
