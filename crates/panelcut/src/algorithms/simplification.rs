use geo_types::{Coord, LineString};
use crate::types::Contour;

/// Douglas-Peucker simplifier whose tolerance scales with the contour.
///
/// The epsilon is `tolerance_fraction * perimeter`, so a small balloon and a
/// full-page panel are judged by the same relative standard.
#[derive(Debug, Clone)]
pub struct PerimeterScaledSimplifier {
    pub tolerance_fraction: f64,
}

impl Default for PerimeterScaledSimplifier {
    fn default() -> Self {
        Self { tolerance_fraction: 0.02 }
    }
}

impl PerimeterScaledSimplifier {
    pub fn new(tolerance_fraction: f64) -> Self {
        Self { tolerance_fraction }
    }

    /// Approximate the contour by a polygon and return its distinct vertices
    /// (the closing point is not repeated).
    pub fn approximate(&self, contour: &Contour) -> Vec<[f64; 2]> {
        use geo::Simplify;

        if contour.points.is_empty() {
            return Vec::new();
        }

        let polygon = contour.to_geo_polygon();
        let epsilon = self.tolerance_fraction * contour.perimeter();
        let simplified: LineString<f64> = polygon.exterior().simplify(&epsilon);

        let mut vertices: Vec<[f64; 2]> = simplified
            .coords()
            .map(|coord: &Coord<f64>| [coord.x, coord.y])
            .collect();
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        vertices
    }

    pub fn vertex_count(&self, contour: &Contour) -> usize {
        self.approximate(contour).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Boundary pixels of an axis-aligned box, traced clockwise from the top-left.
    fn box_contour(left: u32, top: u32, right: u32, bottom: u32) -> Contour {
        let mut points = Vec::new();
        for x in left..right {
            points.push([x, top]);
        }
        for y in top + 1..bottom {
            points.push([right - 1, y]);
        }
        for x in (left..right - 1).rev() {
            points.push([x, bottom - 1]);
        }
        for y in (top + 1..bottom - 1).rev() {
            points.push([left, y]);
        }
        Contour { points, parent: None, is_hole: false }
    }

    #[test]
    fn test_box_collapses_to_four_corners() {
        let contour = box_contour(10, 20, 110, 80);
        let vertices = PerimeterScaledSimplifier::default().approximate(&contour);

        assert_eq!(vertices.len(), 4);
        for corner in [[10.0, 20.0], [109.0, 20.0], [109.0, 79.0], [10.0, 79.0]] {
            assert!(vertices.contains(&corner), "missing corner {corner:?}");
        }
    }

    #[test]
    fn test_tolerance_scales_with_perimeter() {
        // A 3px notch survives at 0.1% but vanishes at 5% of a ~1200px perimeter
        let mut contour = box_contour(0, 0, 300, 300);
        let notch = contour
            .points
            .iter()
            .position(|&p| p == [150, 0])
            .expect("top edge point");
        contour.points[notch] = [150, 3];

        let fine = PerimeterScaledSimplifier::new(0.001).vertex_count(&contour);
        let coarse = PerimeterScaledSimplifier::new(0.05).vertex_count(&contour);
        assert!(fine > 4, "fine tolerance should keep the notch, got {fine}");
        assert_eq!(coarse, 4);
    }

    #[test]
    fn test_empty_contour_has_no_vertices() {
        let contour = Contour { points: vec![], parent: None, is_hole: false };
        assert_eq!(PerimeterScaledSimplifier::default().vertex_count(&contour), 0);
    }
}
