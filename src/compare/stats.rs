//! Robust aggregation helpers.

use std::cmp::Ordering;

/// Median of a slice, averaging the two middle values on even counts.
/// Returns `None` for empty input. Chosen over the mean so a few
/// mismatched or corrupted reference samples cannot skew a category's
/// aggregate.
///
/// Sorts in place; NaN values order as equal and end up wherever the
/// sort leaves them.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_empty_is_none() {
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn median_of_single_value() {
        assert_eq!(median(&mut [0.7]), Some(0.7));
    }

    #[test]
    fn median_odd_count_picks_middle() {
        assert_eq!(median(&mut [0.9, 0.1, 0.5]), Some(0.5));
    }

    #[test]
    fn median_even_count_averages_middle_pair() {
        assert_eq!(median(&mut [0.4, 0.1, 0.2, 0.3]), Some(0.25));
    }

    #[test]
    fn median_resists_outliers() {
        // One wildly-off sample moves the mean but not the median.
        let mut values = [0.8, 0.81, 0.79, 0.82, 0.0];
        assert_eq!(median(&mut values), Some(0.8));
    }
}
