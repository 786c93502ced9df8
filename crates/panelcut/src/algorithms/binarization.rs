use image::{GrayImage, Luma};
use crate::{error::{PanelError, Result}, traits::Binarizer};

fn ensure_non_empty(image: &GrayImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PanelError::EmptyImage {
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(())
}

/// Median tone of the outermost ring of pixels, taken as the paper colour
/// beyond the page edge.
fn border_tone(image: &GrayImage) -> u8 {
    let (width, height) = image.dimensions();
    let mut histogram = [0usize; 256];
    let mut count = 0usize;
    for (x, y, pixel) in image.enumerate_pixels() {
        if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
            histogram[pixel[0] as usize] += 1;
            count += 1;
        }
    }

    let mut seen = 0;
    for (tone, &hits) in histogram.iter().enumerate() {
        seen += hits;
        if seen * 2 > count {
            return tone as u8;
        }
    }
    u8::MAX
}

/// Local-mean thresholding: a pixel is ink when it is darker than the mean
/// of its `(2r + 1)²` neighbourhood by more than `offset`.
///
/// Uniform areas, dark or light, come out as background, so a solid panel
/// turns into a ring along its border. That ring is all the contour pass
/// needs, and faint borders survive uneven scan lighting. Neighbourhoods
/// reaching past the page edge see the border tone, so a panel bleeding off
/// the page still gets a ring on that side.
#[derive(Debug, Clone)]
pub struct AdaptiveMeanBinarizer {
    pub block_radius: u32,
    pub offset: u8,
}

impl Default for AdaptiveMeanBinarizer {
    fn default() -> Self {
        Self {
            block_radius: 7,
            offset: 10,
        }
    }
}

impl Binarizer for AdaptiveMeanBinarizer {
    fn binarize(&self, image: &GrayImage) -> Result<GrayImage> {
        ensure_non_empty(image)?;
        let radius = self.block_radius;
        let mut padded = GrayImage::from_pixel(
            image.width() + 2 * radius,
            image.height() + 2 * radius,
            Luma([border_tone(image)]),
        );
        image::imageops::replace(&mut padded, image, radius as i64, radius as i64);
        let means = imageproc::filter::box_filter(&padded, radius, radius);
        let offset = self.offset as i16;

        let mut mask = GrayImage::new(image.width(), image.height());
        for (x, y, pixel) in image.enumerate_pixels() {
            let mean = means.get_pixel(x + radius, y + radius)[0] as i16;
            if (pixel[0] as i16) < mean - offset {
                mask.put_pixel(x, y, Luma([255u8]));
            }
        }
        Ok(mask)
    }
}

/// Global thresholding preprocessor
#[derive(Debug, Clone)]
pub struct FixedThresholdBinarizer {
    /// Pixels at or below this value are ink
    pub threshold: u8,
    /// Make bright background the foreground instead of ink
    pub invert: bool,
}

impl Default for FixedThresholdBinarizer {
    fn default() -> Self {
        Self {
            threshold: 220,
            invert: true,
        }
    }
}

impl Binarizer for FixedThresholdBinarizer {
    fn binarize(&self, image: &GrayImage) -> Result<GrayImage> {
        ensure_non_empty(image)?;
        // threshold() marks pixels brighter than the cutoff
        let mut mask = imageproc::contrast::threshold(image, self.threshold);
        if !self.invert {
            image::imageops::invert(&mut mask);
        }
        Ok(mask)
    }
}
