use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use crate::{config::ContourMode, error::Result, traits::ContourExtractor, types::Contour};

/// Copy of `mask` with a one-pixel background frame, so regions touching
/// the page edge still get an outer border.
fn pad_with_background(mask: &GrayImage) -> GrayImage {
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    image::imageops::replace(&mut padded, mask, 1, 1);
    padded
}

/// Imageproc-based contour extractor
///
/// Borders come back in raster-scan order of their first pixel, which is
/// stable for a given mask.
#[derive(Debug, Clone, Default)]
pub struct ImageprocContourExtractor {
    pub mode: ContourMode,
}

impl ImageprocContourExtractor {
    pub fn new(mode: ContourMode) -> Self {
        Self { mode }
    }
}

impl ContourExtractor for ImageprocContourExtractor {
    fn extract_contours(&self, mask: &GrayImage) -> Result<Vec<Contour>> {
        // find_contours only opens a border after a background pixel
        let contours = find_contours::<u32>(&pad_with_background(mask));

        // Border pixels are foreground, never the frame, so x and y are >= 1
        let all = contours.into_iter().map(|contour| Contour {
            points: contour.points.iter().map(|p| [p.x - 1, p.y - 1]).collect(),
            parent: contour.parent,
            is_hole: contour.border_type == BorderType::Hole,
        });

        let result = match self.mode {
            ContourMode::Tree => all.collect(),
            ContourMode::External => all
                .filter(|contour| !contour.is_hole && contour.parent.is_none())
                .collect(),
        };

        Ok(result)
    }
}
