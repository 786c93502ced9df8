use image::GrayImage;
use crate::{error::Result, types::Contour};

/// Trait for turning a grayscale page into a binary mask
pub trait Binarizer: Send + Sync {
    /// Foreground pixels come out as 255, everything else as 0
    fn binarize(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for contour extraction algorithms
pub trait ContourExtractor: Send + Sync {
    /// Extract contours from a binary image, in a stable order
    fn extract_contours(&self, mask: &GrayImage) -> Result<Vec<Contour>>;
}
