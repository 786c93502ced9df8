use tracing::{debug, trace};
use crate::{
    algorithms::{compose::sort_reading_order, simplification::PerimeterScaledSimplifier},
    config::SegmentationConfig,
    types::{Contour, PanelCandidate},
};

/// Why a contour was not accepted as a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooSmall,
    TooFewVertices,
    NotRectangular,
}

/// Turns contours into deduplicated panel candidates in reading order.
#[derive(Debug, Clone)]
pub struct PanelCandidateFilter {
    pub min_panel_area_fraction: f64,
    pub min_rectangularity: f64,
    pub simplifier: PerimeterScaledSimplifier,
    pub containment_only: bool,
}

impl Default for PanelCandidateFilter {
    fn default() -> Self {
        Self::from_config(&SegmentationConfig::default())
    }
}

impl PanelCandidateFilter {
    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self {
            min_panel_area_fraction: config.min_panel_area_fraction,
            min_rectangularity: config.min_rectangularity,
            simplifier: PerimeterScaledSimplifier::new(config.polygon_simplify_tolerance_fraction),
            containment_only: config.panel_containment_only,
        }
    }

    /// Judge a single contour against the area, vertex and rectangularity tests.
    pub fn evaluate(
        &self,
        contour: &Contour,
        page_area: f64,
    ) -> std::result::Result<PanelCandidate, Rejection> {
        let Some(rect) = contour.bounding_rect() else {
            return Err(Rejection::TooSmall);
        };

        let area = contour.area();
        if area < self.min_panel_area_fraction * page_area || area <= 0.0 {
            return Err(Rejection::TooSmall);
        }

        if self.simplifier.vertex_count(contour) < 4 {
            return Err(Rejection::TooFewVertices);
        }

        let candidate = PanelCandidate::new(rect, area);
        if candidate.rectangularity() < self.min_rectangularity {
            return Err(Rejection::NotRectangular);
        }

        Ok(candidate)
    }

    /// Run every contour through [`evaluate`](Self::evaluate), drop nested
    /// duplicates and return the survivors in reading order.
    pub fn filter(&self, contours: &[Contour], width: u32, height: u32) -> Vec<PanelCandidate> {
        let page_area = width as f64 * height as f64;

        let accepted: Vec<PanelCandidate> = contours
            .iter()
            .filter_map(|contour| match self.evaluate(contour, page_area) {
                Ok(candidate) => Some(candidate),
                Err(reason) => {
                    trace!(?reason, points = contour.points.len(), "contour rejected");
                    None
                }
            })
            .collect();

        let mut panels = deduplicate(accepted, self.containment_only);
        sort_reading_order(&mut panels, |panel| panel.rect);
        debug!(contours = contours.len(), panels = panels.len(), "panel candidates filtered");
        panels
    }
}

/// Drop candidates nested inside an already accepted one.
///
/// Candidates are visited largest bounding box first (ties keep their input
/// order), so an enclosing detection always wins over the ones inside it.
/// An accepted candidate is never revisited. With `containment_only` unset,
/// a candidate overlapping the interior of an accepted one is dropped too.
pub fn deduplicate(mut candidates: Vec<PanelCandidate>, containment_only: bool) -> Vec<PanelCandidate> {
    candidates.sort_by(|a, b| b.bbox_area.cmp(&a.bbox_area));

    let mut accepted: Vec<PanelCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let duplicate = accepted.iter().any(|kept| {
            kept.rect.contains(&candidate.rect)
                || (!containment_only && kept.rect.intersects(&candidate.rect))
        });
        if duplicate {
            trace!(rect = ?candidate.rect, "nested panel candidate dropped");
            continue;
        }
        accepted.push(candidate);
    }
    accepted
}
