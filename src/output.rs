//! Where documents go and how a run is reported.
//!
//! A single document is written to the output path itself. More than one
//! gets a `_partN` suffix before the extension, numbered from 1. A
//! structure-only run writes `<stem>-structure<ext>`.

use crate::error::CondenseError;
use crate::types::RunResult;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_EXTENSION: &str = "txt";
const PART_SUFFIX: &str = "_part";
const STRUCTURE_SUFFIX: &str = "-structure";

/// Derives document file names from the configured output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    dir: PathBuf,
    stem: String,
    extension: String,
}

impl OutputNaming {
    /// A path without an extension gets `.txt`.
    pub fn new(output_path: &Path) -> Self {
        let dir = output_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let stem = output_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = output_path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
        Self {
            dir,
            stem,
            extension,
        }
    }

    /// Same naming, but rooted in `dir` (typically the canonical form).
    pub fn with_dir(mut self, dir: PathBuf) -> Self {
        self.dir = dir;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn single(&self) -> PathBuf {
        self.dir.join(format!("{}.{}", self.stem, self.extension))
    }

    pub fn structure(&self) -> PathBuf {
        self.dir
            .join(format!("{}{}.{}", self.stem, STRUCTURE_SUFFIX, self.extension))
    }

    /// `index` starts at 1.
    pub fn part(&self, index: usize) -> PathBuf {
        self.dir
            .join(format!("{}{}{}.{}", self.stem, PART_SUFFIX, index, self.extension))
    }

    /// Paths for `count` documents in order.
    pub fn paths(&self, count: usize, structure_only: bool) -> Vec<PathBuf> {
        match count {
            0 => Vec::new(),
            1 if structure_only => vec![self.structure()],
            1 => vec![self.single()],
            _ => (1..=count).map(|i| self.part(i)).collect(),
        }
    }

    /// Whether `path` looks like a document this naming would produce.
    ///
    /// Only the file name and the directory are compared, so both sides
    /// should be in the same (canonical) form.
    pub fn is_artifact(&self, path: &Path) -> bool {
        if path.parent() != Some(self.dir.as_path()) {
            return false;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let Some(base) = name
            .strip_suffix(self.extension.as_str())
            .and_then(|b| b.strip_suffix('.'))
        else {
            return false;
        };
        let Some(rest) = base.strip_prefix(self.stem.as_str()) else {
            return false;
        };
        if rest.is_empty() || rest == STRUCTURE_SUFFIX {
            return true;
        }
        rest.strip_prefix(PART_SUFFIX)
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    }
}

/// Writes each document to its path. The first failure aborts; a file that
/// was being written when it happened must be treated as incomplete.
pub fn write_documents(paths: &[PathBuf], documents: &[String]) -> Result<(), CondenseError> {
    for (path, document) in paths.iter().zip(documents) {
        fs::write(path, document).map_err(|e| CondenseError::io(path, e))?;
        #[cfg(feature = "logging")]
        tracing::debug!("Wrote {} ({} bytes)", path.display(), document.len());
    }
    Ok(())
}

/// Serializes a run result as JSON.
pub fn format_report(result: &RunResult, pretty: bool) -> Result<String, CondenseError> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

/// Plain-text summary for people.
pub fn format_summary(result: &RunResult) -> String {
    let mut out = String::new();
    if result.cancelled {
        out.push_str(&format!(
            "Cancelled after {} files; nothing written.\n",
            result.files_processed
        ));
    } else {
        out.push_str(&format!(
            "Condensed {} files into {} document(s):\n",
            result.files_processed, result.chunks
        ));
        for path in &result.outputs {
            out.push_str(&format!("  {}\n", path.display()));
        }
    }
    if !result.warnings.is_empty() {
        out.push_str(&format!("{} warning(s):\n", result.warnings.len()));
        for warning in &result.warnings {
            out.push_str(&format!("  {}\n", warning));
        }
    }
    out
}
