//! The batch normalizer loop.
//!
//! Lists one directory (no recursion), keeps the regular files whose extension
//! is configured, and normalizes each of them in turn. Every file produces
//! exactly one [`Outcome`]; a failing file never stops the batch.
//!
//! ## Per-file steps
//!
//! ```text
//! filter by extension ─┬─ no match ──────────────→ (silently ignored)
//!                      └─ probe ─┬─ error ────────→ Failed
//!                                ├─ animated ─────→ SkippedAnimated
//!                                └─ normalize ─┬──→ Saved { dimensions }
//!                                              └──→ Failed
//! ```
//!
//! Outcomes are collected into a [`Report`] and, when a progress channel is
//! given, also sent as they happen so a CLI can print them live.
//!
//! Only failing to list the directory is fatal; it happens before any file is
//! touched.

use crate::config::NormalizerConfig;
use crate::imaging::{Dimensions, FileResult, ImageBackend, RustBackend, normalize_file};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Cannot list {}: {source}", path.display())]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Saved { name: String, dimensions: Dimensions },
    SkippedAnimated { name: String },
    Failed { name: String, error: String },
}

impl Outcome {
    pub fn name(&self) -> &str {
        match self {
            Outcome::Saved { name, .. }
            | Outcome::SkippedAnimated { name }
            | Outcome::Failed { name, .. } => name,
        }
    }
}

/// All outcomes of one run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
}

impl Report {
    pub fn saved(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Saved { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::SkippedAnimated { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// List the files in `dir` that the config says should be processed.
///
/// Only regular files directly inside `dir` are considered. The result is
/// sorted by file name so runs are reproducible.
pub fn list_candidates(dir: &Path, config: &NormalizerConfig) -> Result<Vec<PathBuf>, BatchError> {
    let list_err = |source| BatchError::ListDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        // Non UTF-8 names are still candidates; only the extension has to match.
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        if !config.matches(&name) {
            continue;
        }
        // Follows symlinks; a dangling link is not a file.
        if !entry.path().is_file() {
            log::debug!("skipping {name}: not a regular file");
            continue;
        }
        candidates.push(entry.path());
    }
    candidates.sort();
    Ok(candidates)
}

/// Normalize every matching image in `dir` with the production backend.
pub fn normalize_directory(
    dir: &Path,
    config: &NormalizerConfig,
    progress: Option<Sender<Outcome>>,
) -> Result<Report, BatchError> {
    let backend = RustBackend::new();
    normalize_directory_with_backend(&backend, dir, config, progress)
}

/// Normalize a directory using a specific backend (allows testing with mock).
pub fn normalize_directory_with_backend(
    backend: &impl ImageBackend,
    dir: &Path,
    config: &NormalizerConfig,
    progress: Option<Sender<Outcome>>,
) -> Result<Report, BatchError> {
    let settings = config.normalize_settings();
    let mut report = Report::default();

    for path in list_candidates(dir, config)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let outcome = match normalize_file(backend, &path, &settings) {
            Ok(FileResult::Saved(dimensions)) => Outcome::Saved { name, dimensions },
            Ok(FileResult::Animated) => Outcome::SkippedAnimated { name },
            Err(e) => {
                log::warn!("{}: {e}", path.display());
                Outcome::Failed {
                    name,
                    error: e.to_string(),
                }
            }
        };

        if let Some(tx) = &progress {
            // The receiver going away only stops live output, not the batch.
            let _ = tx.send(outcome.clone());
        }
        report.outcomes.push(outcome);
    }

    Ok(report)
}
