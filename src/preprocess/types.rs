use image::GrayImage;

use crate::config::{CANONICAL_SIZE, CLAHE_CLIP_LIMIT, CLAHE_GRID};

/// Parameters of the canonical representation.
///
/// Defaults reproduce the production pipeline (512x512, 8x8 CLAHE grid,
/// clip limit 2.0). Exposed as a struct so the empirically-tuned values
/// stay adjustable without code edits.
#[derive(Debug, Clone)]
pub struct CanonicalSpec {
    /// Edge length of the square comparison grid.
    pub target_size: u32,
    /// CLAHE tile grid dimension (grid x grid tiles).
    pub clahe_grid: u32,
    /// CLAHE clip limit (multiplier on the uniform bin count).
    pub clahe_clip_limit: f32,
}

impl Default for CanonicalSpec {
    fn default() -> Self {
        Self {
            target_size: CANONICAL_SIZE,
            clahe_grid: CLAHE_GRID,
            clahe_clip_limit: CLAHE_CLIP_LIMIT,
        }
    }
}

/// A comparison-ready image: fixed-size, single-channel,
/// contrast-equalized, denoised.
///
/// Any two canonical images produced with the same [`CanonicalSpec`]
/// are pixel-dimension-compatible and directly comparable. Created
/// fresh per input file, owned by the call that created it, never
/// cached.
#[derive(Debug, Clone)]
pub struct CanonicalImage {
    image: GrayImage,
}

impl CanonicalImage {
    pub(crate) fn new(image: GrayImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying 8-bit luminance grid.
    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }

    /// Rescale the 8-bit grid to a [0, 1] floating buffer, row-major.
    /// Metric computation operates on this range (`data_range = 1.0`).
    pub fn to_unit_range(&self) -> Vec<f32> {
        self.image.as_raw().iter().map(|&v| v as f32 / 255.0).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn default_spec_matches_production_constants() {
        let spec = CanonicalSpec::default();
        assert_eq!(spec.target_size, 512);
        assert_eq!(spec.clahe_grid, 8);
        assert!((spec.clahe_clip_limit - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn unit_range_maps_extremes() {
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, Luma([0]));
        img.put_pixel(1, 0, Luma([255]));
        let canonical = CanonicalImage::new(img);

        let unit = canonical.to_unit_range();
        assert_eq!(unit.len(), 2);
        assert!((unit[0] - 0.0).abs() < f32::EPSILON);
        assert!((unit[1] - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn unit_range_is_row_major_and_bounded() {
        let img = GrayImage::from_fn(4, 3, |x, y| Luma([(x * 10 + y) as u8]));
        let canonical = CanonicalImage::new(img);

        let unit = canonical.to_unit_range();
        assert_eq!(unit.len(), 12);
        assert!(unit.iter().all(|&v| (0.0..=1.0).contains(&v)));
        // pixel (1, 2) sits at index 2 * 4 + 1
        assert!((unit[9] - 12.0 / 255.0).abs() < 1e-6);
    }
}
