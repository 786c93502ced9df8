use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use image::{DynamicImage, GenericImageView, ImageError};
use tracing::{debug, warn};
use crate::{
    error::{PanelError, Result},
    types::RegionList,
};

/// Where the crops of `page` go: `output_root` joined with the page's path
/// relative to `input_root`, minus its extension.
///
/// Pages outside `input_root` fall back to their file stem.
pub fn output_dir_for(page: &Path, input_root: &Path, output_root: &Path) -> PathBuf {
    let relative = page
        .strip_prefix(input_root)
        .ok()
        .filter(|relative| !relative.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| page.file_name().map(PathBuf::from).unwrap_or_default());

    output_root.join(relative.with_extension(""))
}

fn write_error(path: &Path, err: ImageError) -> PanelError {
    let source = match err {
        ImageError::IoError(source) => source,
        other => io::Error::other(other),
    };
    PanelError::Write { path: path.to_path_buf(), source }
}

/// Crop every region out of `page` and save it as `panel_<n>.png` in `dir`,
/// numbered from 1 in reading order.
#[tracing::instrument(skip_all, fields(dir = %dir.display(), regions = regions.len()))]
pub fn export_regions(page: &DynamicImage, regions: &RegionList, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| PanelError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let (width, height) = page.dimensions();
    let mut written = Vec::with_capacity(regions.len());

    for (index, region) in regions.iter().enumerate() {
        let path = dir.join(format!("panel_{}.png", index + 1));
        let rect = region.clamp_to(width, height);
        if rect.is_empty() {
            warn!(?region, "region lies outside the page, skipped");
            continue;
        }

        page.crop_imm(rect.left, rect.top, rect.width(), rect.height())
            .save(&path)
            .map_err(|err| write_error(&path, err))?;
        written.push(path);
    }

    debug!(count = written.len(), "crops exported");
    Ok(written)
}
