use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_SAMPLE_SIZE, DEFAULT_UNCERTAINTY_MARGIN};
use crate::preprocess::CanonicalSpec;

/// Tunable parameters of a comparison run.
///
/// The defaults are the production values; the margin and sample size
/// are empirical, so they live here instead of being hard-coded in the
/// engine.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Reference files drawn per category (cost scales linearly).
    pub sample_size: usize,
    /// Median-similarity gap below which the verdict is `Uncertain`.
    pub uncertainty_margin: f64,
    /// Fix the random draw for reproducible runs. `None` draws fresh
    /// entropy per call.
    pub seed: Option<u64>,
    /// Canonical-representation parameters used for every image.
    pub spec: CanonicalSpec,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            uncertainty_margin: DEFAULT_UNCERTAINTY_MARGIN,
            seed: None,
            spec: CanonicalSpec::default(),
        }
    }
}

/// Categorical outcome of a comparison run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The two population medians are too close to call.
    #[serde(rename = "uncertain")]
    Uncertain,
    /// The input resembles the pneumonia population more.
    #[serde(rename = "pneumonia-like")]
    PneumoniaLike,
    /// The input resembles the normal population more.
    #[serde(rename = "normal-like")]
    NormalLike,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Uncertain => "uncertain",
            Verdict::PneumoniaLike => "pneumonia-like",
            Verdict::NormalLike => "normal-like",
        };
        f.write_str(s)
    }
}

/// Why a drawn reference file was excluded from a category's samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The file could not be normalized (unreadable, not a raster).
    Preprocess { detail: String },
    /// The similarity metric rejected the pair (degenerate image).
    Metric { detail: String },
}

/// A reference file that was drawn but not compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedSample {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Per-population aggregate.
///
/// `avg_similarity`/`avg_error` are medians and absent when the
/// category produced no valid samples — lower counts and absent
/// aggregates are how reference-side failures degrade, never errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub avg_similarity: Option<f64>,
    pub avg_error: Option<f64>,
    /// This category's share of the combined similarity mass, in
    /// percent (2 decimal places). The two categories sum to 100,
    /// or are both 0 when neither produced a score.
    pub similarity_percent: f64,
    pub samples_compared: usize,
    /// Drawn files that were excluded, with the reason each one fell
    /// out.
    pub skipped: Vec<SkippedSample>,
}

impl CategorySummary {
    /// Summary for a missing or empty category directory.
    pub(crate) fn empty() -> Self {
        Self {
            avg_similarity: None,
            avg_error: None,
            similarity_percent: 0.0,
            samples_compared: 0,
            skipped: Vec::new(),
        }
    }
}

/// The single most similar sample seen across both populations.
/// Ties keep the first-seen maximum (the tracker updates on strict
/// improvement only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestMatch {
    pub category: String,
    pub similarity: f64,
    pub error: f64,
    pub path: PathBuf,
}

/// Full result record of one comparison run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Absent when every sampled file failed preprocessing — a
    /// legitimate outcome, not an error.
    pub best_match: Option<BestMatch>,
    pub summary: BTreeMap<String, CategorySummary>,
    /// Absolute gap between the two category medians (4 decimal
    /// places).
    pub confidence_diff: f64,
    pub prediction: Verdict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_serializes_to_kebab_strings() {
        assert_eq!(
            serde_json::to_string(&Verdict::PneumoniaLike).unwrap(),
            "\"pneumonia-like\""
        );
        assert_eq!(
            serde_json::to_string(&Verdict::NormalLike).unwrap(),
            "\"normal-like\""
        );
        assert_eq!(
            serde_json::to_string(&Verdict::Uncertain).unwrap(),
            "\"uncertain\""
        );
    }

    #[test]
    fn verdict_display_matches_wire_form() {
        assert_eq!(Verdict::Uncertain.to_string(), "uncertain");
        assert_eq!(Verdict::PneumoniaLike.to_string(), "pneumonia-like");
        assert_eq!(Verdict::NormalLike.to_string(), "normal-like");
    }

    #[test]
    fn default_options_match_production_constants() {
        let opts = CompareOptions::default();
        assert_eq!(opts.sample_size, 40);
        assert!((opts.uncertainty_margin - 0.02).abs() < f64::EPSILON);
        assert!(opts.seed.is_none());
    }

    #[test]
    fn empty_summary_has_null_aggregates() {
        let s = CategorySummary::empty();
        assert!(s.avg_similarity.is_none());
        assert!(s.avg_error.is_none());
        assert_eq!(s.samples_compared, 0);
        assert_eq!(s.similarity_percent, 0.0);
    }
}
