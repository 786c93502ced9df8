use geo_types::{Coord, LineString, Polygon};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::algorithms::merge::MergeStep;

/// Axis-aligned pixel rectangle, half-open on the right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Rectangle {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Rectangle {
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Build from an origin and a size.
    pub const fn from_size(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// True when the rectangle has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// True when the interiors of the two rectangles share at least one pixel.
    /// Rectangles that merely abut do not intersect.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// True when `other` lies entirely inside `self` (edges may coincide).
    pub fn contains(&self, other: &Rectangle) -> bool {
        self.left <= other.left
            && self.top <= other.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        Rectangle::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Signed gap between the nearer vertical edges; negative when the
    /// horizontal extents overlap.
    pub fn horizontal_gap(&self, other: &Rectangle) -> i64 {
        self.left.max(other.left) as i64 - self.right.min(other.right) as i64
    }

    /// Signed gap between the nearer horizontal edges; negative when the
    /// vertical extents overlap.
    pub fn vertical_gap(&self, other: &Rectangle) -> i64 {
        self.top.max(other.top) as i64 - self.bottom.min(other.bottom) as i64
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.left < self.right && self.top < self.bottom && self.right <= width && self.bottom <= height
    }

    /// Clip to a `width` x `height` page.
    pub fn clamp_to(&self, width: u32, height: u32) -> Rectangle {
        Rectangle::new(
            self.left.min(width),
            self.top.min(height),
            self.right.min(width),
            self.bottom.min(height),
        )
    }

    /// Row-major sort key: top edge first, then left edge.
    pub fn reading_order_key(&self) -> (u32, u32) {
        (self.top, self.left)
    }
}

/// A closed boundary traced around a connected foreground region.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Boundary pixels in tracing order
    pub points: Vec<[u32; 2]>,
    /// Index of the enclosing contour within the same extraction, if nested
    pub parent: Option<usize>,
    /// True when the border separates a region from a hole inside it
    pub is_hole: bool,
}

impl Contour {
    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        let coords: Vec<Coord<f64>> = self
            .points
            .iter()
            .map(|&[x, y]| Coord { x: x as f64, y: y as f64 })
            .collect();
        Polygon::new(LineString::new(coords), vec![])
    }

    /// Enclosed area of the boundary polygon.
    pub fn area(&self) -> f64 {
        use geo::Area;
        self.to_geo_polygon().unsigned_area()
    }

    /// Length of the closed boundary.
    pub fn perimeter(&self) -> f64 {
        use geo::EuclideanLength;
        self.to_geo_polygon().exterior().euclidean_length()
    }

    /// Pixel extent of the boundary, or `None` for an empty contour.
    pub fn bounding_rect(&self) -> Option<Rectangle> {
        let mut points = self.points.iter();
        let &[x0, y0] = points.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        for &[x, y] in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Rectangle::new(min_x, min_y, max_x + 1, max_y + 1))
    }
}

/// An accepted panel detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PanelCandidate {
    pub rect: Rectangle,
    /// Area enclosed by the source contour
    pub contour_area: f64,
    /// Area of `rect`
    pub bbox_area: u64,
}

impl PanelCandidate {
    pub fn new(rect: Rectangle, contour_area: f64) -> Self {
        Self {
            rect,
            contour_area,
            bbox_area: rect.area(),
        }
    }

    /// How completely the contour fills its bounding box, in `(0, 1]`.
    pub fn rectangularity(&self) -> f64 {
        if self.bbox_area == 0 {
            return 0.0;
        }
        (self.contour_area / self.bbox_area as f64).min(1.0)
    }
}

/// Panels and gutters in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RegionList(Vec<Rectangle>);

impl RegionList {
    /// Wrap rectangles that are already in reading order.
    pub(crate) fn from_ordered(regions: Vec<Rectangle>) -> Self {
        Self(regions)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rectangle> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Rectangle] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Rectangle> {
        self.0
    }

    /// Check the row-major ordering of consecutive entries.
    pub fn is_reading_ordered(&self) -> bool {
        self.0
            .windows(2)
            .all(|pair| pair[0].reading_order_key() <= pair[1].reading_order_key())
    }
}

impl<'a> IntoIterator for &'a RegionList {
    type Item = &'a Rectangle;
    type IntoIter = std::slice::Iter<'a, Rectangle>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Everything the segmenter learned about one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSegmentation {
    pub width: u32,
    pub height: u32,
    /// Accepted panels in reading order
    pub panels: Vec<PanelCandidate>,
    /// Merged and expanded gutters
    pub gutters: Vec<Rectangle>,
    /// Panels and gutters combined, in reading order
    pub regions: RegionList,
    /// Every union performed while merging gutter fragments
    pub merge_trace: Vec<MergeStep>,
}

impl PageSegmentation {
    pub(crate) fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            panels: Vec::new(),
            gutters: Vec::new(),
            regions: RegionList::default(),
            merge_trace: Vec::new(),
        }
    }

    pub fn panel_rects(&self) -> Vec<Rectangle> {
        self.panels.iter().map(|p| p.rect).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abutting_rectangles_do_not_intersect() {
        let a = Rectangle::new(0, 0, 10, 10);
        let b = Rectangle::new(10, 0, 20, 10);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rectangle::new(9, 9, 12, 12)));
    }

    #[test]
    fn test_signed_gaps() {
        let a = Rectangle::new(0, 0, 10, 10);
        let b = Rectangle::new(15, 5, 20, 30);
        assert_eq!(a.horizontal_gap(&b), 5);
        assert_eq!(a.vertical_gap(&b), -5);
        assert_eq!(b.horizontal_gap(&a), 5);
    }

    #[test]
    fn test_contour_measures() {
        let contour = Contour {
            points: vec![[2, 3], [12, 3], [12, 8], [2, 8]],
            parent: None,
            is_hole: false,
        };
        assert_eq!(contour.bounding_rect(), Some(Rectangle::new(2, 3, 13, 9)));
        assert!((contour.area() - 50.0).abs() < 1e-9);
        assert!((contour.perimeter() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_rectangularity_of_full_box() {
        let candidate = PanelCandidate::new(Rectangle::new(0, 0, 10, 10), 100.0);
        assert_eq!(candidate.rectangularity(), 1.0);
    }
}
