use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use tracing::{debug, trace};
use crate::{
    algorithms::{binarization::FixedThresholdBinarizer, extraction::ImageprocContourExtractor},
    config::{ContourMode, SegmentationConfig},
    error::Result,
    traits::{Binarizer, ContourExtractor},
    types::Rectangle,
};

/// Paint each rectangle onto `image` with a solid value.
pub fn paint_rects(image: &mut GrayImage, rects: &[Rectangle], value: u8) {
    for rect in rects {
        let rect = rect.clamp_to(image.width(), image.height());
        if rect.is_empty() {
            continue;
        }
        let area = imageproc::rect::Rect::at(rect.left as i32, rect.top as i32)
            .of_size(rect.width(), rect.height());
        draw_filled_rect_mut(image, area, Luma([value]));
    }
}

/// Largest rectangle of foreground pixels inside `within`.
///
/// Row-by-row histogram of foreground run heights with a monotonic stack.
/// Ties go to the rectangle found first, scanning top to bottom and left to
/// right by right edge.
pub fn largest_free_rectangle(mask: &GrayImage, within: Rectangle) -> Option<Rectangle> {
    let within = within.clamp_to(mask.width(), mask.height());
    if within.is_empty() {
        return None;
    }

    let columns = within.width() as usize;
    let mut heights = vec![0u32; columns];
    let mut stack: Vec<usize> = Vec::with_capacity(columns);
    let mut best: Option<(u64, Rectangle)> = None;

    for y in within.top..within.bottom {
        for (offset, height) in heights.iter_mut().enumerate() {
            let x = within.left + offset as u32;
            *height = if mask.get_pixel(x, y)[0] > 0 { *height + 1 } else { 0 };
        }

        stack.clear();
        for i in 0..=columns {
            let current = if i < columns { heights[i] } else { 0 };
            while let Some(&top) = stack.last() {
                if heights[top] <= current {
                    break;
                }
                stack.pop();
                let height = heights[top];
                let start = stack.last().map_or(0, |&s| s + 1);
                let area = height as u64 * (i - start) as u64;
                if best.is_none_or(|(best_area, _)| area > best_area) {
                    let rect = Rectangle::new(
                        within.left + start as u32,
                        y + 1 - height,
                        within.left + i as u32,
                        y + 1,
                    );
                    best = Some((area, rect));
                }
            }
            stack.push(i);
        }
    }

    best.map(|(_, rect)| rect)
}

/// Finds blank regions left over once the panels are masked out.
#[derive(Debug, Clone)]
pub struct GutterDetector {
    pub binarizer: FixedThresholdBinarizer,
    pub extractor: ImageprocContourExtractor,
    pub min_empty_area_fraction: f64,
}

impl Default for GutterDetector {
    fn default() -> Self {
        Self::from_config(&SegmentationConfig::default())
    }
}

impl GutterDetector {
    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self {
            binarizer: FixedThresholdBinarizer {
                threshold: config.gutter_threshold,
                invert: true,
            },
            extractor: ImageprocContourExtractor::new(ContourMode::External),
            min_empty_area_fraction: config.min_empty_area_fraction,
        }
    }

    /// Empty-space candidates for `page`, none of which overlaps a panel.
    ///
    /// Panels are painted over with background so their artwork cannot
    /// produce contours, the remainder is thresholded with bright background
    /// as foreground, and each outer background region becomes one candidate:
    /// its bounding box when that box is clear of every panel, otherwise the
    /// largest panel-free background rectangle inside it.
    pub fn detect(&self, page: &GrayImage, panels: &[Rectangle]) -> Result<Vec<Rectangle>> {
        let mut working = page.clone();
        paint_rects(&mut working, panels, 255);

        let background = self.binarizer.binarize(&working)?;
        let contours = self.extractor.extract_contours(&background)?;

        let min_area = self.min_empty_area_fraction * page.width() as f64 * page.height() as f64;
        let mut free: Option<GrayImage> = None;
        let mut candidates = Vec::new();

        for contour in &contours {
            let Some(bounds) = contour.bounding_rect() else {
                continue;
            };
            if (bounds.area() as f64) < min_area {
                continue;
            }

            let candidate = if panels.iter().any(|panel| panel.intersects(&bounds)) {
                let free = free.get_or_insert_with(|| {
                    let mut mask = background.clone();
                    paint_rects(&mut mask, panels, 0);
                    mask
                });
                match largest_free_rectangle(free, bounds) {
                    Some(carved) => carved,
                    None => continue,
                }
            } else {
                bounds
            };

            if (candidate.area() as f64) < min_area {
                trace!(?candidate, "empty space candidate too small");
                continue;
            }
            candidates.push(candidate);
        }

        debug!(regions = contours.len(), candidates = candidates.len(), "empty space detected");
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_panels(width: u32, height: u32, background: u8, panels: &[Rectangle]) -> GrayImage {
        let mut page = GrayImage::from_pixel(width, height, Luma([background]));
        paint_rects(&mut page, panels, 0);
        page
    }

    #[test]
    fn test_largest_free_rectangle_in_histogram() {
        let mut mask = GrayImage::new(10, 6);
        paint_rects(&mut mask, &[Rectangle::new(2, 1, 8, 5)], 255);
        paint_rects(&mut mask, &[Rectangle::new(0, 3, 10, 4)], 255);

        assert_eq!(
            largest_free_rectangle(&mask, Rectangle::new(0, 0, 10, 6)),
            Some(Rectangle::new(2, 1, 8, 5))
        );
        assert_eq!(
            largest_free_rectangle(&mask, Rectangle::new(0, 3, 10, 4)),
            Some(Rectangle::new(0, 3, 10, 4))
        );
        assert_eq!(largest_free_rectangle(&GrayImage::new(5, 5), Rectangle::new(0, 0, 5, 5)), None);
    }

    #[test]
    fn test_background_wrapping_panels_is_carved() {
        let panels = [Rectangle::new(20, 20, 190, 280), Rectangle::new(210, 20, 380, 280)];
        let page = page_with_panels(400, 300, 255, &panels);

        let gutters = GutterDetector::default().detect(&page, &panels).expect("should detect");
        assert_eq!(gutters, vec![Rectangle::new(0, 0, 400, 20)]);
    }

    #[test]
    fn test_isolated_blank_region_keeps_its_bounds() {
        let panels = [Rectangle::new(200, 50, 350, 250)];
        let mut page = page_with_panels(400, 300, 100, &panels);
        paint_rects(&mut page, &[Rectangle::new(50, 50, 150, 100)], 255);
        paint_rects(&mut page, &[Rectangle::new(20, 200, 25, 205)], 255);

        let gutters = GutterDetector::default().detect(&page, &panels).expect("should detect");
        assert_eq!(gutters, vec![Rectangle::new(50, 50, 150, 100)]);
    }

    #[test]
    fn test_candidates_never_overlap_panels() {
        let panels = [
            Rectangle::new(10, 10, 120, 140),
            Rectangle::new(130, 10, 290, 70),
            Rectangle::new(130, 80, 290, 140),
            Rectangle::new(10, 150, 290, 190),
        ];
        let page = page_with_panels(300, 200, 250, &panels);

        let gutters = GutterDetector::default().detect(&page, &panels).expect("should detect");
        assert!(!gutters.is_empty());
        for gutter in &gutters {
            assert!(panels.iter().all(|panel| !panel.intersects(gutter)));
        }
    }
}
