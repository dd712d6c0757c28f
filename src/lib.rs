//! Pneumoscan Core Library
//!
//! Scores a chest X-ray against two labeled reference populations
//! ("NORMAL", "PNEUMONIA") using structural similarity and
//! error-distance metrics, and emits a verdict with a confidence
//! margin and the nearest exemplar.
//!
//! The crate is the statistical engine only: callers own upload
//! handling, routing, and any optional model or chat integrations, and
//! consume [`ComparisonReport`] from [`compare_with_corpus`]. Each call
//! is stateless and safe to run from multiple threads as long as the
//! corpus directories are not concurrently modified.

pub mod compare;
pub mod config;
pub mod preprocess;

// Re-export the public surface
pub use compare::{
    compare_with_corpus, BestMatch, CategorySummary, CompareError, CompareOptions,
    ComparisonReport, ReferenceCorpus, SkipReason, SkippedSample, Verdict,
};
pub use preprocess::{normalize, CanonicalImage, CanonicalSpec, PreprocessError};
