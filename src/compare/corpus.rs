//! Reference corpus access: category listing and random sample draws.
//!
//! The corpus is external and read-only; a listing is a snapshot taken
//! once per comparison call, and nothing here ever writes under the
//! corpus root.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::warn;

use crate::config::IMAGE_EXTENSIONS;

/// Root directory holding one subdirectory per labeled population.
#[derive(Debug, Clone)]
pub struct ReferenceCorpus {
    root: PathBuf,
}

impl ReferenceCorpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.root.join(category)
    }

    /// Eligible files of one category, sorted by path.
    ///
    /// The sort pins the population order so a seeded draw is fully
    /// reproducible. A missing or unreadable directory yields an empty
    /// listing — the caller reports a zero-sample summary, never an
    /// error.
    pub fn list_category(&self, category: &str) -> Vec<PathBuf> {
        let dir = self.category_dir(category);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    category,
                    dir = %dir.display(),
                    reason = %e,
                    "Category directory unavailable"
                );
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_image_extension(path))
            .collect();
        files.sort();
        files
    }
}

/// Random subset without replacement, size `min(sample_size, len)`.
pub fn draw_sample(files: &[PathBuf], sample_size: usize, rng: &mut StdRng) -> Vec<PathBuf> {
    files
        .choose_multiple(rng, sample_size.min(files.len()))
        .cloned()
        .collect()
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}
