//! Corpus comparison: sampling, metrics, aggregation, and the verdict.

pub mod corpus;
pub mod engine;
pub mod metrics;
pub mod stats;
pub mod types;

use thiserror::Error;

use crate::preprocess::PreprocessError;

pub use corpus::ReferenceCorpus;
pub use engine::compare_with_corpus;
pub use metrics::MetricError;
pub use types::{
    BestMatch, CategorySummary, CompareOptions, ComparisonReport, SkipReason, SkippedSample,
    Verdict,
};

/// Fatal comparison failure.
///
/// Reference-side problems never appear here — they degrade into the
/// report (skipped samples, zero-sample summaries). Only the primary
/// input failing to normalize aborts a run.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("input image could not be normalized: {0}")]
    InputUnreadable(#[from] PreprocessError),
}
