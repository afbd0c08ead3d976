use crate::error::CondenseError;
use crate::matcher::PatternMatcher;
use crate::tree::TreeNode;
use crate::types::{IncludedFile, Warning};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SKIPPED_OUTPUT: &str = "matches this run's output naming, skipped";

type SkipFn = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// Everything a walk produces.
#[derive(Debug, Clone)]
pub struct WalkOutput {
    pub tree: TreeNode,
    /// Included files in depth-first, name-sorted order; the same order as `tree`.
    pub files: Vec<IncludedFile>,
    pub warnings: Vec<Warning>,
}

/// Depth-first, name-sorted traversal that prunes excluded directories.
///
/// None of the `ignore` crate's own filters are enabled; hidden files,
/// `.gitignore` and friends are left to the [`PatternMatcher`]. Symbolic links
/// are never followed and never reported. Unreadable directories become
/// warnings.
pub struct Walker {
    root: PathBuf,
    matcher: Arc<PatternMatcher>,
    skip: Option<SkipFn>,
}

impl Walker {
    pub fn new(root: impl Into<PathBuf>, matcher: Arc<PatternMatcher>) -> Self {
        Self {
            root: root.into(),
            matcher,
            skip: None,
        }
    }

    /// Files for which `skip` returns `true` are left out of the tree and the
    /// file list, each with a warning. Used to keep earlier output documents
    /// out of the next run.
    pub fn skip_files<F>(mut self, skip: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.skip = Some(Arc::new(skip));
        self
    }

    pub fn walk(self) -> Result<WalkOutput, CondenseError> {
        if !self.root.is_dir() {
            return Err(CondenseError::InvalidRoot {
                path: self.root.clone(),
                reason: "not a directory".to_string(),
            });
        }

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        let filter_root = self.root.clone();
        let filter_matcher = Arc::clone(&self.matcher);
        builder.filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let Some(file_type) = entry.file_type() else {
                return true;
            };
            if file_type.is_dir() {
                let rel = relative_path(&filter_root, entry.path());
                let pruned = filter_matcher.matches(&rel, true);
                if pruned {
                    #[cfg(feature = "logging")]
                    tracing::debug!("Pruning directory {}", rel);
                }
                return !pruned;
            }
            true
        });

        let mut stack = vec![TreeNode::dir(
            root_name(&self.root),
            String::new(),
            self.root.clone(),
        )];
        let mut files = Vec::new();
        let mut warnings = Vec::new();

        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    #[cfg(feature = "logging")]
                    tracing::warn!("Walk error: {}", err);
                    let path = error_path(&err).unwrap_or_else(|| self.root.clone());
                    warnings.push(Warning::new(path, err.to_string()));
                    continue;
                }
            };
            let depth = entry.depth();
            if depth == 0 {
                continue;
            }
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_symlink() {
                #[cfg(feature = "logging")]
                tracing::debug!("Skipping symlink {}", entry.path().display());
                continue;
            }

            while stack.len() > depth {
                close_dir(&mut stack);
            }

            let path = entry.path().to_path_buf();
            let rel = relative_path(&self.root, &path);
            let name = entry.file_name().to_string_lossy().into_owned();

            if file_type.is_dir() {
                stack.push(TreeNode::dir(name, rel, path));
                continue;
            }
            if !file_type.is_file() {
                continue;
            }
            if self.skip.as_ref().is_some_and(|skip| skip(path.as_path())) {
                #[cfg(feature = "logging")]
                tracing::debug!("Skipping earlier output {}", rel);
                warnings.push(Warning::new(path, SKIPPED_OUTPUT));
                continue;
            }

            let excluded = self.matcher.matches(&rel, false);
            if !excluded {
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                files.push(IncludedFile {
                    relative_path: rel.clone(),
                    path: path.clone(),
                    size,
                });
            }
            if let Some(parent) = stack.last_mut() {
                parent.children.push(TreeNode::file(name, rel, path, excluded));
            }
        }

        while stack.len() > 1 {
            close_dir(&mut stack);
        }
        let tree = stack.pop().ok_or_else(|| CondenseError::Walk("empty walk stack".into()))?;

        #[cfg(feature = "logging")]
        tracing::debug!(
            "Walk of {} included {} files ({} warnings)",
            self.root.display(),
            files.len(),
            warnings.len()
        );
        Ok(WalkOutput {
            tree,
            files,
            warnings,
        })
    }
}

/// Walks `root` with no skip predicate.
pub fn walk(root: &Path, matcher: &PatternMatcher) -> Result<WalkOutput, CondenseError> {
    Walker::new(root, Arc::new(matcher.clone())).walk()
}

fn close_dir(stack: &mut Vec<TreeNode>) {
    if let Some(done) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(done);
        }
    }
}

/// `/`-separated path of `path` below `root`.
pub(crate) fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}

fn error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } => error_path(err),
        ignore::Error::WithLineNumber { err, .. } => error_path(err),
        ignore::Error::Loop { child, .. } => Some(child.clone()),
        ignore::Error::Partial(errs) => errs.iter().find_map(error_path),
        _ => None,
    }
}
