//! Pairwise similarity and error metrics over canonical [0, 1] pixel
//! buffers.
//!
//! SSIM follows Wang et al. (2004): per-window luminance/contrast/
//! structure comparison with a uniform 7x7 window and sample
//! covariance, averaged over all fully-interior windows. Window
//! statistics come from integral images, so the cost is linear in the
//! pixel count rather than pixels x window area.

use thiserror::Error;

/// Uniform SSIM window edge length.
pub const SSIM_WINDOW: usize = 7;

/// Stabilizer constants for a declared data range of 1.0.
const C1: f64 = 0.01 * 0.01;
const C2: f64 = 0.03 * 0.03;

/// Domain error in metric computation. Triggers a sample skip, never a
/// run failure.
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("similarity window {win}x{win} exceeds image {width}x{height}")]
    WindowTooLarge {
        win: usize,
        width: usize,
        height: usize,
    },
    #[error("pixel buffers disagree: {left} vs {right} values")]
    ShapeMismatch { left: usize, right: usize },
}

/// Mean structural similarity between two same-shape [0, 1] buffers.
///
/// Nominal range [0, 1] for comparable images, 1.0 for identical
/// input; anti-correlated structure can push individual windows
/// negative.
pub fn structural_similarity(
    a: &[f32],
    b: &[f32],
    width: usize,
    height: usize,
) -> Result<f64, MetricError> {
    if a.len() != b.len() || a.len() != width * height {
        return Err(MetricError::ShapeMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if width < SSIM_WINDOW || height < SSIM_WINDOW {
        return Err(MetricError::WindowTooLarge {
            win: SSIM_WINDOW,
            width,
            height,
        });
    }

    let sum_a = integral_table(width, height, |i| a[i] as f64);
    let sum_b = integral_table(width, height, |i| b[i] as f64);
    let sum_aa = integral_table(width, height, |i| (a[i] as f64) * (a[i] as f64));
    let sum_bb = integral_table(width, height, |i| (b[i] as f64) * (b[i] as f64));
    let sum_ab = integral_table(width, height, |i| (a[i] as f64) * (b[i] as f64));

    let n = (SSIM_WINDOW * SSIM_WINDOW) as f64;
    // Sample (n-1) normalization for variance and covariance.
    let cov_norm = n / (n - 1.0);

    let mut total = 0.0f64;
    let mut windows = 0u64;
    for y in 0..=height - SSIM_WINDOW {
        for x in 0..=width - SSIM_WINDOW {
            let ua = window_sum(&sum_a, width, x, y) / n;
            let ub = window_sum(&sum_b, width, x, y) / n;
            let va = cov_norm * (window_sum(&sum_aa, width, x, y) / n - ua * ua);
            let vb = cov_norm * (window_sum(&sum_bb, width, x, y) / n - ub * ub);
            let vab = cov_norm * (window_sum(&sum_ab, width, x, y) / n - ua * ub);

            let numerator = (2.0 * ua * ub + C1) * (2.0 * vab + C2);
            let denominator = (ua * ua + ub * ub + C1) * (va + vb + C2);
            total += numerator / denominator;
            windows += 1;
        }
    }

    Ok(total / windows as f64)
}

/// Mean squared per-pixel intensity difference.
pub fn mean_squared_error(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return 0.0;
    }
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();
    sum / a.len() as f64
}

/// Summed-area table with a zero border row/column, so any rectangle
/// sum is four lookups.
fn integral_table(width: usize, height: usize, value: impl Fn(usize) -> f64) -> Vec<f64> {
    let stride = width + 1;
    let mut table = vec![0.0f64; stride * (height + 1)];
    for y in 0..height {
        let mut row_sum = 0.0f64;
        for x in 0..width {
            row_sum += value(y * width + x);
            table[(y + 1) * stride + (x + 1)] = table[y * stride + (x + 1)] + row_sum;
        }
    }
    table
}

/// Sum over the `SSIM_WINDOW`-square window with top-left (x, y).
#[inline]
fn window_sum(table: &[f64], width: usize, x: usize, y: usize) -> f64 {
    let stride = width + 1;
    let (x1, y1) = (x + SSIM_WINDOW, y + SSIM_WINDOW);
    table[y1 * stride + x1] - table[y * stride + x1] - table[y1 * stride + x]
        + table[y * stride + x]
}
