use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A file that survived every exclusion rule and will be condensed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludedFile {
    /// Path relative to the project root, always `/`-separated.
    pub relative_path: String,
    /// The full path to the file.
    pub path: PathBuf,
    /// Size in bytes as reported by the filesystem during the walk.
    pub size: u64,
}

/// A non-fatal problem recorded against a single path.
///
/// Warnings are collected during a run and returned in [`RunResult`] so the
/// caller can present them; a file is never dropped without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub path: PathBuf,
    pub reason: String,
}

impl Warning {
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// The complete result of a condensation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    /// Output documents written, in chunk order.
    pub outputs: Vec<PathBuf>,
    /// Every file that was skipped or degraded, with the reason.
    pub warnings: Vec<Warning>,
    /// Number of files whose content made it into the output.
    pub files_processed: usize,
    /// Number of documents produced.
    pub chunks: usize,
    /// Set when the run stopped early on a cancellation request.
    ///
    /// A cancelled run writes no documents; the counts reflect the work done
    /// before the request was observed.
    pub cancelled: bool,
}
