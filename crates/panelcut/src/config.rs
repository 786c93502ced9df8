use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr, VariantNames};

use crate::error::{PanelError, Result};

/// Which contours the panel pass looks at.
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContourMode {
    /// Outermost borders only
    #[default]
    External,
    /// Every border, with parent links
    Tree,
}

/// Thresholds for one segmentation run.
///
/// The value is immutable once handed to a [`Segmenter`](crate::Segmenter),
/// so pages in a batch can run with different settings without interfering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Smallest panel, as a fraction of the page area
    #[schemars(range(min = 0.0, max = 1.0))]
    pub min_panel_area_fraction: f64,
    /// Smallest contour-area / bounding-box-area ratio accepted as a panel
    #[schemars(range(min = 0.0, max = 1.0))]
    pub min_rectangularity: f64,
    /// Polygon simplification tolerance, as a fraction of the contour perimeter
    #[schemars(range(min = 0.0, max = 1.0))]
    pub polygon_simplify_tolerance_fraction: f64,
    /// Smallest empty-space candidate, as a fraction of the page area
    #[schemars(range(min = 0.0, max = 1.0))]
    pub min_empty_area_fraction: f64,
    /// Merge distance, as a fraction of the smaller page dimension
    #[schemars(range(min = 0.0, max = 1.0))]
    pub merge_proximity_fraction: f64,
    /// Deduplicate panels by containment only; when false, any overlap with
    /// an accepted panel also rejects a candidate
    pub panel_containment_only: bool,
    /// Contour retrieval for the panel pass
    pub panel_contour_mode: ContourMode,
    /// Half-size of the adaptive threshold neighbourhood, in pixels
    #[schemars(range(min = 1))]
    pub adaptive_block_radius: u32,
    /// How much darker than its neighbourhood mean a pixel must be to count as ink
    pub adaptive_offset: u8,
    /// Global threshold separating ink from background in the gutter pass
    pub gutter_threshold: u8,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_panel_area_fraction: 0.05,
            min_rectangularity: 0.8,
            polygon_simplify_tolerance_fraction: 0.02,
            min_empty_area_fraction: 0.01,
            merge_proximity_fraction: 0.05,
            panel_containment_only: false,
            panel_contour_mode: ContourMode::External,
            adaptive_block_radius: 7,
            adaptive_offset: 10,
            gutter_threshold: 220,
        }
    }
}

impl SegmentationConfig {
    /// Reject settings that would invalidate every page.
    pub fn validate(&self) -> Result<()> {
        let fractions = [
            ("min_panel_area_fraction", self.min_panel_area_fraction),
            ("min_rectangularity", self.min_rectangularity),
            ("polygon_simplify_tolerance_fraction", self.polygon_simplify_tolerance_fraction),
            ("min_empty_area_fraction", self.min_empty_area_fraction),
            ("merge_proximity_fraction", self.merge_proximity_fraction),
        ];
        for (name, value) in fractions {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(PanelError::InvalidConfig(format!(
                    "{name} must lie in [0, 1], got {value}"
                )));
            }
        }
        if self.adaptive_block_radius == 0 {
            return Err(PanelError::InvalidConfig(
                "adaptive_block_radius must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Merge distance in pixels for a page of the given size.
    pub fn merge_threshold(&self, width: u32, height: u32) -> i64 {
        (self.merge_proximity_fraction * width.min(height) as f64).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        SegmentationConfig::default().validate().expect("defaults should validate");
    }

    #[test]
    fn test_negative_fraction_is_rejected() {
        let config = SegmentationConfig {
            min_panel_area_fraction: -0.1,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PanelError::InvalidConfig(msg) if msg.contains("min_panel_area_fraction")));
    }

    #[test]
    fn test_nan_is_rejected() {
        let config = SegmentationConfig {
            merge_proximity_fraction: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_threshold_uses_smaller_dimension() {
        let config = SegmentationConfig::default();
        assert_eq!(config.merge_threshold(1200, 1800), 60);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: SegmentationConfig =
            serde_json::from_str(r#"{"min_rectangularity": 0.9, "panel_contour_mode": "tree"}"#)
                .expect("should parse");
        assert_eq!(config.min_rectangularity, 0.9);
        assert_eq!(config.panel_contour_mode, ContourMode::Tree);
        assert_eq!(config.min_panel_area_fraction, 0.05);
    }

    #[test]
    fn test_contour_mode_parses_from_str() {
        assert_eq!("tree".parse::<ContourMode>().unwrap(), ContourMode::Tree);
        assert_eq!(ContourMode::External.to_string(), "external");
    }
}
