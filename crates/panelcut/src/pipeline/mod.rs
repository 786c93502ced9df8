pub mod builder;

use image::{DynamicImage, GrayImage};
use tracing::{debug, info};
use crate::{
    algorithms::{BoundaryExpander, GutterDetector, PanelCandidateFilter, SpatialMerger, compose},
    config::SegmentationConfig,
    deadline::Deadline,
    error::Result,
    traits::{Binarizer, ContourExtractor},
    types::{PageSegmentation, Rectangle},
};

/// Runs the seven segmentation stages over one page, strictly in sequence.
pub struct Segmenter {
    config: SegmentationConfig,
    binarizer: Box<dyn Binarizer>,
    contour_extractor: Box<dyn ContourExtractor>,
    panel_filter: PanelCandidateFilter,
    gutter_detector: GutterDetector,
}

impl Segmenter {
    /// Create a new segmenter builder
    pub fn builder() -> builder::SegmenterBuilder {
        builder::SegmenterBuilder::new()
    }

    /// Create a segmenter from an already validated configuration
    pub(crate) fn new(
        config: SegmentationConfig,
        binarizer: Box<dyn Binarizer>,
        contour_extractor: Box<dyn ContourExtractor>,
    ) -> Self {
        Self {
            panel_filter: PanelCandidateFilter::from_config(&config),
            gutter_detector: GutterDetector::from_config(&config),
            config,
            binarizer,
            contour_extractor,
        }
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Segment a decoded page of any pixel format.
    pub fn segment_image(&self, page: &DynamicImage, deadline: &Deadline) -> Result<PageSegmentation> {
        self.segment_within(&page.to_luma8(), deadline)
    }

    pub fn segment(&self, page: &GrayImage) -> Result<PageSegmentation> {
        self.segment_within(page, &Deadline::unbounded())
    }

    /// Process a page through the entire pipeline, giving up with
    /// [`PanelError::TimedOut`](crate::PanelError::TimedOut) once `deadline`
    /// passes. A timed-out page yields no regions at all.
    #[tracing::instrument(skip_all, fields(width = page.width(), height = page.height()))]
    pub fn segment_within(&self, page: &GrayImage, deadline: &Deadline) -> Result<PageSegmentation> {
        let (width, height) = page.dimensions();
        if width == 0 || height == 0 {
            debug!("empty page, nothing to segment");
            return Ok(PageSegmentation::empty(width, height));
        }

        // Step 1: Binarize against the local neighbourhood
        deadline.check()?;
        let mask = self.binarizer.binarize(page)?;

        // Step 2: Extract contours
        deadline.check()?;
        let contours = self.contour_extractor.extract_contours(&mask)?;

        // Step 3: Filter and deduplicate panel candidates
        deadline.check()?;
        let panels = self.panel_filter.filter(&contours, width, height);
        let panel_rects: Vec<Rectangle> = panels.iter().map(|panel| panel.rect).collect();

        // Step 4: Detect the empty space around the panels
        deadline.check()?;
        let empty_space = self.gutter_detector.detect(page, &panel_rects)?;

        // Step 5: Merge fragments into gutters
        let merger = SpatialMerger::new(self.config.merge_threshold(width, height));
        let merged = merger.merge_within(empty_space, deadline)?;

        // Step 6: Grow each gutter up to the panels
        let gutters = BoundaryExpander::new(&panel_rects, width, height)
            .expand_all(&merged.regions, deadline)?;

        // Step 7: Compose in reading order
        let regions = compose(&panels, &gutters);
        info!(panels = panels.len(), gutters = gutters.len(), "page segmented");

        Ok(PageSegmentation {
            width,
            height,
            panels,
            gutters,
            regions,
            merge_trace: merged.trace,
        })
    }

    /// Get information about the segmenter configuration
    pub fn info(&self) -> String {
        format!(
            "Segmenter: panels >= {:.1}% of page, rectangularity >= {:.2}, merge within {:.1}% of the short side",
            self.config.min_panel_area_fraction * 100.0,
            self.config.min_rectangularity,
            self.config.merge_proximity_fraction * 100.0,
        )
    }
}
