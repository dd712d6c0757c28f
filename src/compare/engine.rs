//! The corpus comparison engine.
//!
//! Stateless per call: normalize the input once, draw a random subset
//! of each labeled population, score every drawn file against the
//! input, aggregate each category with the median, and decide with a
//! confidence margin. Randomness in the draw is the only cross-call
//! non-determinism; the median and the margin exist to keep the
//! verdict stable under it.

use std::collections::BTreeMap;
use std::path::Path;

use image::imageops::FilterType;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::CATEGORIES;
use crate::preprocess::{self, CanonicalImage};

use super::corpus::{draw_sample, ReferenceCorpus};
use super::metrics::{mean_squared_error, structural_similarity};
use super::stats::median;
use super::types::{
    BestMatch, CategorySummary, CompareOptions, ComparisonReport, SkipReason, SkippedSample,
    Verdict,
};
use super::CompareError;

/// Compare one input image against both reference populations.
///
/// Fails only when the input itself cannot be normalized — the input
/// is load-bearing and has no fallback. Everything on the reference
/// side degrades into the summary instead: unreadable files become
/// [`SkippedSample`] entries, empty categories become zero-sample
/// summaries with absent aggregates.
pub fn compare_with_corpus(
    input_path: &Path,
    corpus: &ReferenceCorpus,
    options: &CompareOptions,
) -> Result<ComparisonReport, CompareError> {
    let canonical = preprocess::normalize(input_path, &options.spec)?;
    let input = canonical.to_unit_range();
    let (width, height) = (canonical.width() as usize, canonical.height() as usize);

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut best: Option<BestMatch> = None;
    let mut summary = BTreeMap::new();
    // Decision inputs in category order; an absent median counts as 0.0
    // here while the summary still reports it as null.
    let mut decision_medians = [0.0f64; 2];

    for (side, category) in CATEGORIES.iter().enumerate() {
        let files = corpus.list_category(category);
        if files.is_empty() {
            summary.insert(category.to_string(), CategorySummary::empty());
            continue;
        }

        let drawn = draw_sample(&files, options.sample_size, &mut rng);
        let mut similarities = Vec::with_capacity(drawn.len());
        let mut errors = Vec::with_capacity(drawn.len());
        let mut skipped = Vec::new();

        for path in &drawn {
            let sample = match preprocess::normalize(path, &options.spec) {
                Ok(sample) => sample,
                Err(e) => {
                    debug!(path = %path.display(), reason = %e, "Reference sample skipped");
                    skipped.push(SkippedSample {
                        path: path.clone(),
                        reason: SkipReason::Preprocess {
                            detail: e.to_string(),
                        },
                    });
                    continue;
                }
            };
            let pixels = unit_pixels_matching(&sample, canonical.width(), canonical.height());

            let similarity = match structural_similarity(&input, &pixels, width, height) {
                Ok(similarity) => similarity,
                Err(e) => {
                    debug!(path = %path.display(), reason = %e, "Reference sample skipped");
                    skipped.push(SkippedSample {
                        path: path.clone(),
                        reason: SkipReason::Metric {
                            detail: e.to_string(),
                        },
                    });
                    continue;
                }
            };
            let error = mean_squared_error(&input, &pixels);

            // Strict improvement only: ties keep the first-seen maximum.
            if best.as_ref().map_or(true, |b| similarity > b.similarity) {
                best = Some(BestMatch {
                    category: category.to_string(),
                    similarity,
                    error,
                    path: path.clone(),
                });
            }

            similarities.push(similarity);
            errors.push(error);
        }

        let avg_similarity = median(&mut similarities);
        let avg_error = median(&mut errors);
        decision_medians[side] = avg_similarity.unwrap_or(0.0);

        debug!(
            category,
            population = files.len(),
            drawn = drawn.len(),
            compared = similarities.len(),
            skipped = skipped.len(),
            median_similarity = avg_similarity,
            "Category sampled"
        );

        summary.insert(
            category.to_string(),
            CategorySummary {
                avg_similarity,
                avg_error,
                similarity_percent: 0.0,
                samples_compared: similarities.len(),
                skipped,
            },
        );
    }

    let [normal_median, pneumonia_median] = decision_medians;
    let (prediction, diff) =
        decide(normal_median, pneumonia_median, options.uncertainty_margin);
    let (normal_share, pneumonia_share) = similarity_shares(normal_median, pneumonia_median);

    if let Some(entry) = summary.get_mut(CATEGORIES[0]) {
        entry.similarity_percent = round_to(normal_share, 2);
    }
    if let Some(entry) = summary.get_mut(CATEGORIES[1]) {
        entry.similarity_percent = round_to(pneumonia_share, 2);
    }

    info!(
        input = %input_path.display(),
        prediction = %prediction,
        confidence_diff = diff,
        normal_median,
        pneumonia_median,
        "Comparison complete"
    );

    Ok(ComparisonReport {
        best_match: best,
        summary,
        confidence_diff: round_to(diff, 4),
        prediction,
    })
}

/// Unit-range pixels of a sample, resized to the input's canonical
/// shape if it somehow differs (normalization with one spec already
/// guarantees a match; this guards a mixed-spec caller).
fn unit_pixels_matching(sample: &CanonicalImage, width: u32, height: u32) -> Vec<f32> {
    if sample.width() == width && sample.height() == height {
        return sample.to_unit_range();
    }
    let resized = image::imageops::resize(sample.as_gray(), width, height, FilterType::Triangle);
    resized.as_raw().iter().map(|&v| v as f32 / 255.0).collect()
}

/// Margin-based decision over the two category medians.
///
/// `diff < margin` is uncertain; a diff exactly at the margin decides.
pub(crate) fn decide(normal: f64, pneumonia: f64, margin: f64) -> (Verdict, f64) {
    let diff = (pneumonia - normal).abs();
    let verdict = if diff < margin {
        Verdict::Uncertain
    } else if pneumonia > normal {
        Verdict::PneumoniaLike
    } else {
        Verdict::NormalLike
    };
    (verdict, diff)
}

/// Normalize the two medians into shares of 100%. A zero combined mass
/// substitutes denominator 1.0, producing a defined 0%/0% split.
pub(crate) fn similarity_shares(normal: f64, pneumonia: f64) -> (f64, f64) {
    let total = normal + pneumonia;
    let denom = if total > 0.0 { total } else { 1.0 };
    (normal / denom * 100.0, pneumonia / denom * 100.0)
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
