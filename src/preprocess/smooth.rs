//! Fixed-kernel Gaussian smoothing.
//!
//! Suppresses sensor noise that would otherwise inflate the pixel-wise
//! error metric downstream. Hand-rolled over the image buffer (same
//! convention as the rest of the raster ops here).

use image::{GrayImage, Luma};

/// 3x3 Gaussian kernel as the separable binomial [1, 2, 1] / 4,
/// applied horizontally then vertically. Borders replicate the edge
/// pixel.
pub fn smooth_gaussian_3x3(img: &GrayImage) -> GrayImage {
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return GrayImage::new(w, h);
    }

    let clamp_x = |x: i64| x.clamp(0, w as i64 - 1) as u32;
    let clamp_y = |y: i64| y.clamp(0, h as i64 - 1) as u32;

    // Horizontal pass, kept in u16 to avoid a rounding step mid-way.
    let mut horizontal = vec![0u16; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let left = img.get_pixel(clamp_x(x as i64 - 1), y).0[0] as u16;
            let mid = img.get_pixel(x, y).0[0] as u16;
            let right = img.get_pixel(clamp_x(x as i64 + 1), y).0[0] as u16;
            horizontal[(y * w + x) as usize] = left + 2 * mid + right;
        }
    }

    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let top = horizontal[(clamp_y(y as i64 - 1) * w + x) as usize] as u32;
            let mid = horizontal[(y * w + x) as usize] as u32;
            let bottom = horizontal[(clamp_y(y as i64 + 1) * w + x) as usize] as u32;
            // Sum of weights is 16; +8 rounds to nearest.
            let v = (top + 2 * mid + bottom + 8) / 16;
            out.put_pixel(x, y, Luma([v.min(255) as u8]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variance(img: &GrayImage) -> f64 {
        let n = (img.width() * img.height()) as f64;
        let mean = img.pixels().map(|p| p.0[0] as f64).sum::<f64>() / n;
        img.pixels()
            .map(|p| {
                let d = p.0[0] as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n
    }

    #[test]
    fn constant_image_is_unchanged() {
        let img = GrayImage::from_pixel(16, 16, Luma([173]));
        let out = smooth_gaussian_3x3(&img);
        assert!(out.pixels().all(|p| p.0[0] == 173));
    }

    #[test]
    fn smoothing_reduces_variance_of_noise() {
        // Deterministic pseudo-noise pattern.
        let img = GrayImage::from_fn(32, 32, |x, y| {
            Luma([((x * 97 + y * 61) % 251) as u8])
        });
        let out = smooth_gaussian_3x3(&img);
        assert!(variance(&out) < variance(&img));
    }

    #[test]
    fn isolated_spike_is_spread_to_neighbors() {
        let mut img = GrayImage::new(5, 5);
        img.put_pixel(2, 2, Luma([160]));
        let out = smooth_gaussian_3x3(&img);

        // Center keeps the largest share (4/16), direct neighbors 2/16.
        assert_eq!(out.get_pixel(2, 2).0[0], 40);
        assert_eq!(out.get_pixel(1, 2).0[0], 20);
        assert_eq!(out.get_pixel(2, 1).0[0], 20);
        assert_eq!(out.get_pixel(1, 1).0[0], 10);
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn single_pixel_image_survives() {
        let img = GrayImage::from_pixel(1, 1, Luma([88]));
        let out = smooth_gaussian_3x3(&img);
        assert_eq!(out.get_pixel(0, 0).0[0], 88);
    }
}
