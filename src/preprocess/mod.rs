//! Image normalization: converts an arbitrary raster file into the
//! canonical, comparison-ready representation.
//!
//! Every step is mandatory and order-sensitive: decode to luminance,
//! resize to the canonical square, stretch dynamic range, CLAHE,
//! Gaussian denoise. The output guarantee is that any two canonical
//! images are directly comparable without further resizing.

pub mod enhance;
pub mod smooth;
pub mod types;

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::GrayImage;
use thiserror::Error;
use tracing::debug;

pub use types::{CanonicalImage, CanonicalSpec};

/// Normalization failure. Callers on the reference-sampling side treat
/// this as "skip the file"; only the comparator's primary input
/// promotes it to a fatal error.
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

/// Normalize one file into the canonical representation.
///
/// Steps, in order:
/// 1. Decode as a single-channel luminance raster.
/// 2. Resize to `target_size` square. `FilterType::Triangle` scales its
///    support with the ratio, so downscaling (the common case for
///    high-resolution scans) area-averages and avoids aliasing.
/// 3. Min-max rescale to the full 8-bit range.
/// 4. CLAHE so comparisons are not dominated by global brightness.
/// 5. 3x3 Gaussian pass to suppress sensor noise.
pub fn normalize(path: &Path, spec: &CanonicalSpec) -> Result<CanonicalImage, PreprocessError> {
    let gray = decode_luminance(path)?;
    let (orig_w, orig_h) = (gray.width(), gray.height());

    let resized = image::imageops::resize(
        &gray,
        spec.target_size,
        spec.target_size,
        FilterType::Triangle,
    );
    let stretched = enhance::rescale_dynamic_range(&resized);
    let equalized =
        enhance::equalize_adaptive(&stretched, spec.clahe_grid, spec.clahe_clip_limit);
    let smoothed = smooth::smooth_gaussian_3x3(&equalized);

    debug!(
        path = %path.display(),
        original = format!("{orig_w}x{orig_h}"),
        canonical = format!("{}x{}", spec.target_size, spec.target_size),
        "Image normalized"
    );

    Ok(CanonicalImage::new(smoothed))
}

/// Decode a file as an 8-bit luminance image.
fn decode_luminance(path: &Path) -> Result<GrayImage, PreprocessError> {
    let img = image::open(path).map_err(|e| PreprocessError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(img.to_luma8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn save_gradient_png(path: &Path, w: u32, h: u32) {
        let img = GrayImage::from_fn(w, h, |x, _| Luma([(x * 255 / w.max(1)) as u8]));
        img.save(path).unwrap();
    }

    #[test]
    fn normalize_produces_canonical_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        save_gradient_png(&path, 1024, 768);

        let canonical = normalize(&path, &CanonicalSpec::default()).unwrap();
        assert_eq!(canonical.width(), 512);
        assert_eq!(canonical.height(), 512);
    }

    #[test]
    fn normalize_upscales_small_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        save_gradient_png(&path, 64, 64);

        let canonical = normalize(&path, &CanonicalSpec::default()).unwrap();
        assert_eq!(canonical.width(), 512);
        assert_eq!(canonical.height(), 512);
    }

    #[test]
    fn normalize_honors_custom_target_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        save_gradient_png(&path, 300, 200);

        let spec = CanonicalSpec {
            target_size: 128,
            ..CanonicalSpec::default()
        };
        let canonical = normalize(&path, &spec).unwrap();
        assert_eq!(canonical.width(), 128);
        assert_eq!(canonical.height(), 128);
    }

    #[test]
    fn normalize_accepts_color_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("color.jpg");
        let img = RgbImage::from_fn(200, 200, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        img.save(&path).unwrap();

        let canonical = normalize(&path, &CanonicalSpec::default()).unwrap();
        assert_eq!(canonical.width(), 512);
    }

    #[test]
    fn normalize_spreads_dynamic_range() {
        // A murky low-contrast source must come out stretched.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("murky.png");
        let img = GrayImage::from_fn(256, 256, |x, y| Luma([120 + ((x + y) % 24) as u8]));
        img.save(&path).unwrap();

        let canonical = normalize(&path, &CanonicalSpec::default()).unwrap();
        let unit = canonical.to_unit_range();
        let lo = unit.iter().cloned().fold(f32::INFINITY, f32::min);
        let hi = unit.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!(lo < 0.2, "low end not stretched: {lo}");
        assert!(hi > 0.8, "high end not stretched: {hi}");
    }

    #[test]
    fn normalize_rejects_garbage_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, [0xDE, 0xAD, 0xBE, 0xEF].repeat(64)).unwrap();

        let err = normalize(&path, &CanonicalSpec::default()).unwrap_err();
        assert!(matches!(err, PreprocessError::Decode { .. }));
    }

    #[test]
    fn normalize_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.png");

        assert!(normalize(&path, &CanonicalSpec::default()).is_err());
    }
}
