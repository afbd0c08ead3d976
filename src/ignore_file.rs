//! Gitignore-style rules.
//!
//! Only the common subset is understood: comments, blank lines, `!` negation,
//! a trailing `/` for directory-only rules and a leading `/` (or an inner `/`)
//! for rules anchored to the ignore file's directory. `**` gets no special
//! segment semantics beyond what the glob translation gives it, and a
//! negation cannot re-include a path whose parent directory was pruned.

use crate::error::CondenseError;
use crate::types::Warning;
use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Whether a matching rule excludes a path or brings it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    Exclude,
    Include,
}

/// One parsed line of an ignore file.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    /// The glob with `!`, the leading `/` and the trailing `/` removed.
    pub pattern: String,
    pub polarity: Polarity,
    /// The rule ends in `/` and only matches directories.
    pub dir_only: bool,
    /// The rule is matched against the whole path below `base` rather than
    /// against individual names.
    pub anchored: bool,
    /// Directory of the ignore file, relative to the project root (`""` for the root).
    pub base: String,
    matcher: GlobMatcher,
}

impl IgnoreRule {
    /// Parses a single line. Returns `Ok(None)` for blanks and comments.
    pub fn parse(line: &str, base: &str) -> Result<Option<Self>, CondenseError> {
        let line = line.trim_end();
        let line = line.trim_start_matches('\u{feff}');
        if line.trim().is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (polarity, rest) = match line.strip_prefix('!') {
            Some(rest) => (Polarity::Include, rest),
            None => (Polarity::Exclude, line),
        };
        // `\#` and `\!` stand for a literal first character.
        let rest = match rest.strip_prefix('\\') {
            Some(tail) if tail.starts_with('#') || tail.starts_with('!') => tail,
            _ => rest,
        };

        let (dir_only, rest) = match rest.strip_suffix('/') {
            Some(stripped) => (true, stripped),
            None => (false, rest),
        };
        let anchored = rest.contains('/');
        let pattern = rest.trim_start_matches('/');
        if pattern.is_empty() {
            return Ok(None);
        }

        let matcher = Glob::new(pattern)
            .map_err(|e| CondenseError::pattern(pattern, e))?
            .compile_matcher();

        Ok(Some(Self {
            pattern: pattern.to_string(),
            polarity,
            dir_only,
            anchored,
            base: base.trim_matches('/').to_string(),
            matcher,
        }))
    }

    /// Tests the rule against a `/`-separated path relative to the project root.
    ///
    /// A rule that matches any ancestor directory of `rel_path` matches the
    /// path too, which is how `build/` covers `build/out.o`.
    pub fn matches(&self, rel_path: &str, is_dir: bool) -> bool {
        let Some(local) = strip_base(rel_path, &self.base) else {
            return false;
        };
        if local.is_empty() {
            return false;
        }

        let segments: Vec<&str> = local.split('/').collect();
        let last = segments.len() - 1;
        let mut end = 0;
        for (i, segment) in segments.iter().enumerate() {
            end += segment.len();
            let segment_is_dir = i < last || is_dir;
            if !(self.dir_only && !segment_is_dir) {
                let candidate = if self.anchored { &local[..end] } else { *segment };
                if self.matcher.is_match(candidate) {
                    return true;
                }
            }
            end += 1;
        }
        false
    }
}

fn strip_base<'a>(rel_path: &'a str, base: &str) -> Option<&'a str> {
    if base.is_empty() {
        return Some(rel_path);
    }
    rel_path.strip_prefix(base)?.strip_prefix('/')
}

/// An ordered rule list where the last matching rule decides.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: Vec<IgnoreRule>,
}

impl IgnoreRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    /// Appends rules after the existing ones, so they take precedence.
    pub fn extend(&mut self, other: IgnoreRules) {
        self.rules.extend(other.rules);
    }

    /// The polarity of the last matching rule, or `None` if nothing matches.
    pub fn decide(&self, rel_path: &str, is_dir: bool) -> Option<Polarity> {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(rel_path, is_dir))
            .map(|rule| rule.polarity)
    }

    pub fn is_excluded(&self, rel_path: &str, is_dir: bool) -> bool {
        self.decide(rel_path, is_dir) == Some(Polarity::Exclude)
    }
}

/// Parses ignore-file text whose patterns are relative to `base`.
pub fn parse(content: &str, base: &str) -> Result<IgnoreRules, CondenseError> {
    let mut rules = Vec::new();
    for line in content.lines() {
        if let Some(rule) = IgnoreRule::parse(line, base)? {
            rules.push(rule);
        }
    }
    Ok(IgnoreRules { rules })
}

/// Loads an ignore file from disk.
///
/// Nothing here is fatal. A missing file gives an empty rule list and is
/// only logged. An unreadable file, or a line whose glob does not compile,
/// is reported as a warning and skipped.
pub fn load(path: &Path, base: &str) -> (IgnoreRules, Vec<Warning>) {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            #[cfg(feature = "logging")]
            tracing::warn!("Ignore file {} not found, no rules loaded", path.display());
            return (IgnoreRules::new(), Vec::new());
        }
        Err(e) => {
            #[cfg(feature = "logging")]
            tracing::warn!("Ignore file {} not loaded: {}", path.display(), e);
            let warning = Warning::new(path, format!("ignore file unreadable: {}", e));
            return (IgnoreRules::new(), vec![warning]);
        }
    };

    let mut rules = Vec::new();
    let mut warnings = Vec::new();
    for (number, line) in String::from_utf8_lossy(&bytes).lines().enumerate() {
        match IgnoreRule::parse(line, base) {
            Ok(Some(rule)) => rules.push(rule),
            Ok(None) => {}
            Err(e) => warnings.push(Warning::new(
                path,
                format!("line {} skipped: {}", number + 1, e),
            )),
        }
    }
    #[cfg(feature = "logging")]
    tracing::debug!("Loaded {} rules from {}", rules.len(), path.display());
    (IgnoreRules { rules }, warnings)
}
