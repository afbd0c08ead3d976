use crate::chunker::{self, LoadedFile};
use crate::error::CondenseError;
use crate::ignore_file::{self, IgnoreRules};
use crate::matcher::PatternMatcher;
use crate::options::{ExclusionConfig, OutputOptions};
use crate::output::{self, OutputNaming};
use crate::progress::{CancellationToken, NoopListener, ProgressListener};
use crate::reader::{self, ReadOutcome};
use crate::tree::render_structure;
use crate::types::{RunResult, Warning};
use crate::walker::Walker;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Collects warnings and forwards each one to the listener as it arrives.
struct Recorder<'a> {
    listener: &'a mut dyn ProgressListener,
    warnings: Vec<Warning>,
}

impl Recorder<'_> {
    fn warn(&mut self, warning: Warning) {
        #[cfg(feature = "logging")]
        tracing::warn!("{}", warning);
        self.listener.on_warning(&warning.path, &warning.reason);
        self.warnings.push(warning);
    }
}

/// Condenses the tree under `root` into one or more documents.
///
/// Configuration problems (a missing root, an unusable output location, a
/// malformed pattern) fail before anything is read. Unreadable directories
/// and files are skipped and reported as warnings. Cancellation is checked
/// before each file and once more before writing; a cancelled run writes
/// nothing and comes back with [`RunResult::cancelled`] set. A failed write
/// aborts the run with [`CondenseError::Io`].
pub fn condense(
    root: impl AsRef<Path>,
    config: &ExclusionConfig,
    options: &OutputOptions,
    listener: &mut dyn ProgressListener,
    cancel: &CancellationToken,
) -> Result<RunResult, CondenseError> {
    let root = validate_root(root.as_ref())?;
    let naming = OutputNaming::new(&options.output_path);
    let artifacts = prepare_output(&options.output_path, &naming)?;
    #[cfg(feature = "logging")]
    tracing::debug!(
        "Starting condensation of {} into {}",
        root.display(),
        options.output_path.display()
    );

    let mut recorder = Recorder {
        listener,
        warnings: Vec::new(),
    };

    let rules = if config.use_ignore_file {
        let (rules, warnings) = ignore_file::load(&root.join(&config.ignore_file_name), "");
        for warning in warnings {
            recorder.warn(warning);
        }
        rules
    } else {
        IgnoreRules::new()
    };
    let matcher = Arc::new(PatternMatcher::new(config, rules)?);

    let walked = Walker::new(&root, matcher)
        .skip_files(move |path| artifacts.is_artifact(path))
        .walk()?;
    for warning in walked.warnings {
        recorder.warn(warning);
    }

    let structure = (options.include_structure || options.structure_only)
        .then(|| render_structure(&walked.tree));

    let mut result = RunResult::default();
    let documents = if options.structure_only {
        chunker::render_structure_only(structure.as_deref().unwrap_or_default())
    } else {
        let total = walked.files.len();
        let mut loaded = Vec::with_capacity(total);
        for (index, file) in walked.files.into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(cancelled(result, recorder.warnings, loaded.len()));
            }
            let current = file.path.clone();
            match reader::read_file(&file.path, options.binary_detection) {
                Ok(ReadOutcome::Text { text, warning }) => {
                    if let Some(reason) = warning {
                        recorder.warn(Warning::new(&current, reason));
                    }
                    loaded.push(LoadedFile { file, text });
                }
                Ok(ReadOutcome::Binary) => {
                    recorder.warn(Warning::new(&current, "binary content, skipped"));
                }
                Err(CondenseError::Io { source, .. }) => {
                    recorder.warn(Warning::new(&current, source.to_string()));
                }
                Err(e) => recorder.warn(Warning::new(&current, e.to_string())),
            }
            recorder.listener.on_progress(index + 1, total, &current);
        }
        result.files_processed = loaded.len();

        let plan = chunker::plan(&loaded, options.max_lines(), structure.as_deref());
        chunker::render(&plan, &loaded, structure.as_deref())
    };

    if cancel.is_cancelled() {
        let processed = result.files_processed;
        return Ok(cancelled(result, recorder.warnings, processed));
    }

    let paths = naming.paths(documents.len(), options.structure_only);
    if documents.is_empty() {
        #[cfg(feature = "logging")]
        tracing::warn!("Nothing to write: no files left after exclusions");
    }
    output::write_documents(&paths, &documents)?;

    result.chunks = documents.len();
    result.outputs = paths;
    result.warnings = recorder.warnings;
    #[cfg(feature = "logging")]
    tracing::debug!(
        "Condensed {} files into {} document(s), {} warning(s)",
        result.files_processed,
        result.chunks,
        result.warnings.len()
    );
    Ok(result)
}

/// [`condense`] without progress reporting or cancellation.
pub fn condense_simple(
    root: impl AsRef<Path>,
    config: &ExclusionConfig,
    options: &OutputOptions,
) -> Result<RunResult, CondenseError> {
    condense(root, config, options, &mut NoopListener, &CancellationToken::new())
}

fn cancelled(mut result: RunResult, warnings: Vec<Warning>, processed: usize) -> RunResult {
    #[cfg(feature = "logging")]
    tracing::debug!("Run cancelled after {} files", processed);
    result.files_processed = processed;
    result.warnings = warnings;
    result.cancelled = true;
    result
}

fn validate_root(root: &Path) -> Result<PathBuf, CondenseError> {
    let invalid = |reason: String| CondenseError::InvalidRoot {
        path: root.to_path_buf(),
        reason,
    };
    let metadata = fs::metadata(root).map_err(|e| invalid(e.to_string()))?;
    if !metadata.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }
    fs::canonicalize(root).map_err(|e| invalid(e.to_string()))
}

/// Makes sure documents can be written next to `output_path` and returns the
/// naming in canonical form, for recognizing earlier documents during the walk.
///
/// Writability is tested by creating and removing a scratch file in the
/// output directory. Existing entries that any document could land on (the
/// single file, `-structure`, every `_partN`) must be writable regular files.
fn prepare_output(output_path: &Path, naming: &OutputNaming) -> Result<OutputNaming, CondenseError> {
    let invalid = |reason: String| CondenseError::InvalidOutput {
        path: output_path.to_path_buf(),
        reason,
    };
    if output_path.as_os_str().is_empty() {
        return Err(invalid("empty path".to_string()));
    }
    if output_path.is_dir() {
        return Err(invalid("is a directory".to_string()));
    }
    let dir = match naming.dir() {
        d if d.as_os_str().is_empty() => Path::new("."),
        d => d,
    };
    fs::create_dir_all(dir).map_err(|e| invalid(e.to_string()))?;
    let canonical = fs::canonicalize(dir).map_err(|e| invalid(e.to_string()))?;

    let scratch = canonical.join(format!(".codecondense-{}.tmp", std::process::id()));
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&scratch)
        .map_err(|e| invalid(format!("output directory not writable: {}", e)))?;
    fs::remove_file(&scratch).map_err(|e| invalid(e.to_string()))?;

    let naming = naming.clone().with_dir(canonical);
    let entries = fs::read_dir(naming.dir()).map_err(|e| invalid(e.to_string()))?;
    for entry in entries {
        let entry = entry.map_err(|e| invalid(e.to_string()))?;
        let target = entry.path();
        if !naming.is_artifact(&target) {
            continue;
        }
        let metadata = fs::metadata(&target).map_err(|e| invalid(e.to_string()))?;
        if !metadata.is_file() {
            return Err(invalid(format!("{} exists and is not a regular file", target.display())));
        }
        if metadata.permissions().readonly() {
            return Err(invalid(format!("{} is read-only", target.display())));
        }
    }
    Ok(naming)
}
