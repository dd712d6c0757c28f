//! Intensity normalization: global dynamic-range rescale and
//! contrast-limited adaptive histogram equalization (CLAHE).
//!
//! Source exposure varies wildly between scanners; both steps exist so
//! the comparison metrics see structure, not global brightness.

use image::{GrayImage, Luma};

/// Stretch pixel intensities to fill the full 8-bit range (min-max
/// normalization). A constant image has no range to stretch and maps
/// to all-zero.
pub fn rescale_dynamic_range(img: &GrayImage) -> GrayImage {
    let (w, h) = (img.width(), img.height());

    let mut lo = u8::MAX;
    let mut hi = u8::MIN;
    for p in img.pixels() {
        lo = lo.min(p.0[0]);
        hi = hi.max(p.0[0]);
    }

    if hi <= lo {
        return GrayImage::new(w, h);
    }

    let span = (hi - lo) as f32;
    let mut out = GrayImage::new(w, h);
    for (src, dst) in img.pixels().zip(out.pixels_mut()) {
        let v = (src.0[0] - lo) as f32 / span * 255.0;
        *dst = Luma([v.round().clamp(0.0, 255.0) as u8]);
    }
    out
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is split into `grid` x `grid` tiles. Each tile gets its
/// own clipped-histogram CDF lookup table; every pixel is remapped by
/// bilinear interpolation between the four nearest tile centers, so
/// tile boundaries stay seamless.
///
/// `clip_limit` is a multiplier on the uniform bin count
/// (`tile_pixels / 256`); excess counts are redistributed evenly.
/// Reference: Zuiderveld (1994), Graphics Gems IV.
pub fn equalize_adaptive(img: &GrayImage, grid: u32, clip_limit: f32) -> GrayImage {
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return GrayImage::new(w, h);
    }

    // Grid is a tile count; never more tiles than pixels per axis.
    let cols = grid.clamp(1, w) as usize;
    let rows = grid.clamp(1, h) as usize;
    let tile_w = (w as usize).div_ceil(cols);
    let tile_h = (h as usize).div_ceil(rows);

    let mut luts = vec![[0u8; 256]; cols * rows];
    for ty in 0..rows {
        for tx in 0..cols {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(w as usize);
            let y1 = (y0 + tile_h).min(h as usize);

            let mut hist = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[img.get_pixel(x as u32, y as u32).0[0] as usize] += 1;
                }
            }

            let tile_pixels = (x1 - x0) * (y1 - y0);
            if clip_limit > 0.0 {
                clip_and_redistribute(&mut hist, tile_pixels, clip_limit);
            }
            luts[ty * cols + tx] = cdf_lookup_table(&hist, tile_pixels);
        }
    }

    // Remap every pixel against the four surrounding tile-center LUTs.
    let center_x = |tx: usize| (tx as f32 + 0.5) * tile_w as f32;
    let center_y = |ty: usize| (ty as f32 + 0.5) * tile_h as f32;

    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let fx = x as f32 / tile_w as f32 - 0.5;
            let fy = y as f32 / tile_h as f32 - 0.5;

            let tx0 = (fx.floor().max(0.0)) as usize;
            let ty0 = (fy.floor().max(0.0)) as usize;
            let tx1 = (tx0 + 1).min(cols - 1);
            let ty1 = (ty0 + 1).min(rows - 1);

            let ax = if tx0 == tx1 {
                0.0
            } else {
                ((x as f32 - center_x(tx0)) / (center_x(tx1) - center_x(tx0))).clamp(0.0, 1.0)
            };
            let ay = if ty0 == ty1 {
                0.0
            } else {
                ((y as f32 - center_y(ty0)) / (center_y(ty1) - center_y(ty0))).clamp(0.0, 1.0)
            };

            let v = img.get_pixel(x, y).0[0] as usize;
            let v00 = luts[ty0 * cols + tx0][v] as f32;
            let v10 = luts[ty0 * cols + tx1][v] as f32;
            let v01 = luts[ty1 * cols + tx0][v] as f32;
            let v11 = luts[ty1 * cols + tx1][v] as f32;

            let blended = v00 * (1.0 - ax) * (1.0 - ay)
                + v10 * ax * (1.0 - ay)
                + v01 * (1.0 - ax) * ay
                + v11 * ax * ay;

            out.put_pixel(x, y, Luma([blended.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

/// Clip histogram bins at `clip_limit * uniform_count` and spread the
/// excess evenly over all bins.
fn clip_and_redistribute(hist: &mut [u32; 256], tile_pixels: usize, clip_limit: f32) {
    let ceiling = ((tile_pixels as f32 / 256.0) * clip_limit).ceil().max(1.0) as u32;

    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > ceiling {
            excess += *bin - ceiling;
            *bin = ceiling;
        }
    }

    let per_bin = excess / 256;
    let remainder = (excess % 256) as usize;
    for (i, bin) in hist.iter_mut().enumerate() {
        *bin += per_bin;
        if i < remainder {
            *bin += 1;
        }
    }
}

/// Build a 256-entry remap table from a histogram CDF, anchored at the
/// first occupied bin so fully-black regions stay black.
fn cdf_lookup_table(hist: &[u32; 256], total: usize) -> [u8; 256] {
    let mut cdf = [0u32; 256];
    cdf[0] = hist[0];
    for i in 1..256 {
        cdf[i] = cdf[i - 1] + hist[i];
    }

    let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0);
    let mut lut = [0u8; 256];
    let denom = total as f32 - cdf_min as f32;
    if denom <= 0.0 {
        // Single-valued tile: nothing to equalize.
        return lut;
    }

    for i in 0..256 {
        let v = (cdf[i] as f32 - cdf_min as f32) / denom * 255.0;
        lut[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    lut
}
