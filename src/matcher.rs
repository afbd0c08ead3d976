use crate::error::CondenseError;
use crate::ignore_file::IgnoreRules;
use crate::options::ExclusionConfig;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which rule class excluded a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExclusionReason {
    DirName,
    FileName,
    Extension,
    CustomPattern,
    IgnoreFile,
}

/// Compiled exclusion rules for one run.
///
/// The simple rule classes are independent: any one of them excluding a path
/// is enough. Ignore-file rules are resolved on their own (last match wins)
/// and OR'd with the rest, so an ignore-file negation never re-includes a
/// path excluded by a simple rule.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    dirs: HashSet<String>,
    file_names: HashSet<String>,
    file_globs: GlobSet,
    extensions: HashSet<String>,
    patterns: GlobSet,
    /// Patterns written with a trailing `/`: they match directories only,
    /// and through them everything below.
    dir_patterns: GlobSet,
    ignore_rules: IgnoreRules,
}

impl PatternMatcher {
    pub fn new(config: &ExclusionConfig, ignore_rules: IgnoreRules) -> Result<Self, CondenseError> {
        let mut file_names = HashSet::new();
        let mut glob_builder = GlobSetBuilder::new();
        for name in &config.files {
            file_names.insert(name.clone());
            if contains_glob(name) {
                glob_builder.add(Glob::new(name).map_err(|e| CondenseError::pattern(name, e))?);
            }
        }
        let file_globs = glob_builder
            .build()
            .map_err(|e| CondenseError::Config(format!("Failed to build glob set: {}", e)))?;

        let mut glob_builder = GlobSetBuilder::new();
        let mut dir_builder = GlobSetBuilder::new();
        for raw in &config.patterns {
            let pattern = raw.trim_start_matches('/');
            let (builder, pattern) = match pattern.strip_suffix('/') {
                Some(stripped) => (&mut dir_builder, stripped.trim_end_matches('/')),
                None => (&mut glob_builder, pattern),
            };
            if pattern.is_empty() {
                return Err(CondenseError::pattern(raw, "pattern matches nothing"));
            }
            builder.add(Glob::new(pattern).map_err(|e| CondenseError::pattern(raw, e))?);
        }
        let patterns = glob_builder
            .build()
            .map_err(|e| CondenseError::Config(format!("Failed to build glob set: {}", e)))?;
        let dir_patterns = dir_builder
            .build()
            .map_err(|e| CondenseError::Config(format!("Failed to build glob set: {}", e)))?;

        let extensions = config
            .extensions
            .iter()
            .filter_map(|ext| crate::options::normalize_extension(ext))
            .collect();

        Ok(Self {
            dirs: config.dirs.iter().cloned().collect(),
            file_names,
            file_globs,
            extensions,
            patterns,
            dir_patterns,
            ignore_rules,
        })
    }

    /// Returns `true` if the `/`-separated root-relative path is excluded.
    pub fn matches(&self, rel_path: &str, is_dir: bool) -> bool {
        self.explain(rel_path, is_dir).is_some()
    }

    /// Like [`matches`](Self::matches), but names the rule class that fired.
    pub fn explain(&self, rel_path: &str, is_dir: bool) -> Option<ExclusionReason> {
        let rel_path = rel_path.trim_matches('/');
        if rel_path.is_empty() {
            return None;
        }
        let (parents, name) = match rel_path.rsplit_once('/') {
            Some((parents, name)) => (Some(parents), name),
            None => (None, rel_path),
        };

        let dir_hit = parents
            .into_iter()
            .flat_map(|p| p.split('/'))
            .chain(is_dir.then_some(name))
            .any(|segment| self.dirs.contains(segment));
        if dir_hit {
            return Some(ExclusionReason::DirName);
        }

        if !is_dir {
            if self.file_names.contains(name) || self.file_globs.is_match(name) {
                return Some(ExclusionReason::FileName);
            }
            if let Some(ext) = extension_of(name) {
                if self.extensions.contains(&ext.to_lowercase()) {
                    return Some(ExclusionReason::Extension);
                }
            }
        }

        if self.patterns.is_match(rel_path) {
            return Some(ExclusionReason::CustomPattern);
        }
        let dir_pattern_hit = rel_path
            .match_indices('/')
            .map(|(i, _)| &rel_path[..i])
            .chain(is_dir.then_some(rel_path))
            .any(|dir| self.dir_patterns.is_match(dir));
        if dir_pattern_hit {
            return Some(ExclusionReason::CustomPattern);
        }
        if self.ignore_rules.is_excluded(rel_path, is_dir) {
            return Some(ExclusionReason::IgnoreFile);
        }
        None
    }

    pub fn ignore_rules(&self) -> &IgnoreRules {
        &self.ignore_rules
    }
}

fn contains_glob(s: &str) -> bool {
    s.contains('*') || s.contains('?') || s.contains('[')
}

/// The suffix after the last `.`, unless the dot leads the name.
fn extension_of(name: &str) -> Option<&str> {
    match name.rfind('.') {
        Some(0) | None => None,
        Some(i) if i + 1 == name.len() => None,
        Some(i) => Some(&name[i + 1..]),
    }
}
