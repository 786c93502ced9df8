use crate::{
    algorithms::{AdaptiveMeanBinarizer, ImageprocContourExtractor},
    config::SegmentationConfig,
    error::Result,
    pipeline::Segmenter,
    traits::{Binarizer, ContourExtractor},
};

/// Builder for creating segmenters with a fluent API
pub struct SegmenterBuilder {
    config: SegmentationConfig,
    binarizer: Option<Box<dyn Binarizer>>,
    contour_extractor: Option<Box<dyn ContourExtractor>>,
}

impl SegmenterBuilder {
    /// Create a new segmenter builder
    pub fn new() -> Self {
        Self {
            config: SegmentationConfig::default(),
            binarizer: None,
            contour_extractor: None,
        }
    }

    /// Use these thresholds instead of the defaults
    pub fn with_config(mut self, config: SegmentationConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the panel-pass binarizer (replaces the adaptive default)
    pub fn set_binarizer<B>(mut self, binarizer: B) -> Self
    where
        B: Binarizer + 'static,
    {
        self.binarizer = Some(Box::new(binarizer));
        self
    }

    /// Set the panel-pass contour extractor (replaces any existing one)
    pub fn set_contour_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ContourExtractor + 'static,
    {
        self.contour_extractor = Some(Box::new(extractor));
        self
    }

    /// Validate the configuration and build the segmenter, filling in
    /// default components from it
    pub fn build(self) -> Result<Segmenter> {
        self.config.validate()?;

        let binarizer = self.binarizer.unwrap_or_else(|| {
            Box::new(AdaptiveMeanBinarizer {
                block_radius: self.config.adaptive_block_radius,
                offset: self.config.adaptive_offset,
            })
        });

        let contour_extractor = self
            .contour_extractor
            .unwrap_or_else(|| Box::new(ImageprocContourExtractor::new(self.config.panel_contour_mode)));

        Ok(Segmenter::new(self.config, binarizer, contour_extractor))
    }
}

impl Default for SegmenterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use crate::{
        algorithms::{FixedThresholdBinarizer, paint_rects},
        config::ContourMode,
        error::PanelError,
        types::Rectangle,
    };

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = SegmentationConfig {
            min_empty_area_fraction: 1.5,
            ..Default::default()
        };
        let result = SegmenterBuilder::new().with_config(config).build();
        assert!(matches!(result, Err(PanelError::InvalidConfig(_))));
    }

    #[test]
    fn test_custom_components_are_used() {
        let segmenter = SegmenterBuilder::new()
            .set_binarizer(FixedThresholdBinarizer { threshold: 128, invert: false })
            .set_contour_extractor(ImageprocContourExtractor::new(ContourMode::Tree))
            .build()
            .expect("should build");

        let info = segmenter.info();
        assert!(info.contains("rectangularity >= 0.80"), "{info}");
        assert!(!info.contains("external"), "{info}");

        // Global thresholding makes the panel solid ink, with no inner border
        let mut page = GrayImage::from_pixel(300, 200, Luma([255]));
        paint_rects(&mut page, &[Rectangle::new(50, 40, 250, 160)], 0);
        let result = segmenter.segment(&page).expect("should segment");
        assert_eq!(result.panel_rects(), vec![Rectangle::new(50, 40, 250, 160)]);
    }
}
