/// Crate-level constants
pub const APP_NAME: &str = "Pneumoscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Edge length of the canonical comparison grid, in pixels.
/// Every image is resized to this square before any metric runs.
pub const CANONICAL_SIZE: u32 = 512;

/// CLAHE tile grid: the canonical image is split into GRID x GRID tiles,
/// each equalized independently.
pub const CLAHE_GRID: u32 = 8;

/// CLAHE clip limit, as a multiplier on the uniform bin count
/// (`tile_pixels / 256`). Bins above the limit are clipped and the
/// excess redistributed.
pub const CLAHE_CLIP_LIMIT: f32 = 2.0;

/// Default number of reference files drawn per category.
/// The primary wall-clock lever: comparison cost scales linearly with it.
pub const DEFAULT_SAMPLE_SIZE: usize = 40;

/// Median-similarity gap below which the verdict is reported as
/// uncertain rather than picking a side. Empirically tuned.
pub const DEFAULT_UNCERTAINTY_MARGIN: f64 = 0.02;

/// File extensions eligible as reference corpus members (lowercase).
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Category directory names, in decision order: the first is the
/// "normal" side of the verdict, the second the "pneumonia" side.
pub const CATEGORIES: [&str; 2] = ["NORMAL", "PNEUMONIA"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_pneumoscan() {
        assert_eq!(APP_NAME, "Pneumoscan");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }

    #[test]
    fn canonical_grid_divides_evenly_into_tiles() {
        assert_eq!(CANONICAL_SIZE % CLAHE_GRID, 0);
    }

    #[test]
    fn categories_in_decision_order() {
        assert_eq!(CATEGORIES, ["NORMAL", "PNEUMONIA"]);
    }

    #[test]
    fn extensions_are_lowercase() {
        for ext in IMAGE_EXTENSIONS {
            assert_eq!(ext, ext.to_lowercase());
        }
    }
}
