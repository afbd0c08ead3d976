use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";
pub const DEFAULT_OUTPUT_FILE: &str = "condensed.txt";

const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git", "node_modules", "venv", "__pycache__", "build", "dist", ".svn", "env", ".idea",
    ".vscode", "target", "out",
];
const DEFAULT_EXCLUDE_FILES: &[&str] = &[
    "package-lock.json", "yarn.lock", "*.pyc", "*.pyo", "*.exe", "*.dll", "*.so", "*.dylib",
    "*.o", "*.a", "*.class", "*.jar",
];
const DEFAULT_EXCLUDE_EXTENSIONS: &[&str] = &[
    // images
    "jpg", "jpeg", "png", "gif", "bmp", "svg", "ico", "tif", "tiff",
    // video
    "mp4", "avi", "mov", "wmv", "flv", "mkv",
    // audio
    "mp3", "wav", "ogg", "aac", "flac",
    // fonts
    "ttf", "otf", "woff", "woff2", "eot",
    // archives
    "zip", "rar", "tar", "gz", "7z", "bz2", "iso",
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp",
    // data, logs, temp
    "db", "sqlite", "sqlite3", "log", "tmp", "bak", "swp",
    // other binary
    "bin", "dat", "cache", "img", "dmg", "pkl", "joblib",
];

/// How (and whether) to skip files whose content looks binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryDetection {
    /// A NUL byte in the first block marks the file as binary.
    Simple,
    /// Use `content_inspector` on the first block.
    Accurate,
    /// Every file is treated as text.
    None,
}

/// Everything that decides whether a path is left out of a run.
///
/// Built once before traversal and never mutated while a run is in progress.
/// Sets are ordered so that serialized configs are stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionConfig {
    /// Directory names, matched exactly against every directory segment.
    pub dirs: BTreeSet<String>,
    /// File names or globs (`*`, `?`, `[..]`) matched against the base name.
    pub files: BTreeSet<String>,
    /// Lower-case extensions without the leading dot.
    pub extensions: BTreeSet<String>,
    /// Globs matched against the `/`-separated path relative to the root.
    pub patterns: Vec<String>,
    pub use_ignore_file: bool,
    /// Name of the ignore file looked up in the project root.
    pub ignore_file_name: String,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            files: DEFAULT_EXCLUDE_FILES.iter().map(|s| s.to_string()).collect(),
            extensions: DEFAULT_EXCLUDE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            patterns: Vec::new(),
            use_ignore_file: true,
            ignore_file_name: DEFAULT_IGNORE_FILE.to_string(),
        }
    }
}

impl ExclusionConfig {
    /// A config that excludes nothing and ignores the ignore file.
    pub fn empty() -> Self {
        Self {
            dirs: BTreeSet::new(),
            files: BTreeSet::new(),
            extensions: BTreeSet::new(),
            patterns: Vec::new(),
            use_ignore_file: false,
            ignore_file_name: DEFAULT_IGNORE_FILE.to_string(),
        }
    }

    /// Parses a JSON config. Missing fields fall back to [`Default`].
    pub fn from_json(text: &str) -> Result<Self, crate::CondenseError> {
        let mut config: Self = serde_json::from_str(text)?;
        config.extensions = std::mem::take(&mut config.extensions)
            .into_iter()
            .filter_map(|ext| normalize_extension(&ext))
            .collect();
        Ok(config)
    }
}

/// Lower-cases an extension and strips one leading dot; blank input yields `None`.
pub fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim();
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct ExclusionConfigBuilder {
    config: ExclusionConfig,
}

impl Default for ExclusionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExclusionConfigBuilder {
    /// Starts from the built-in default lists.
    pub fn new() -> Self {
        Self {
            config: ExclusionConfig::default(),
        }
    }
    /// Starts from a config that excludes nothing.
    pub fn empty() -> Self {
        Self {
            config: ExclusionConfig::empty(),
        }
    }
    pub fn exclude_dir(mut self, name: impl Into<String>) -> Self {
        self.config.dirs.insert(name.into());
        self
    }
    pub fn exclude_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.dirs.extend(names.into_iter().map(Into::into));
        self
    }
    pub fn exclude_file(mut self, name: impl Into<String>) -> Self {
        self.config.files.insert(name.into());
        self
    }
    pub fn exclude_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.files.extend(names.into_iter().map(Into::into));
        self
    }
    /// Accepts `".LOG"`, `"log"` and `"Log"` alike.
    pub fn exclude_extension(mut self, ext: &str) -> Self {
        if let Some(ext) = normalize_extension(ext) {
            self.config.extensions.insert(ext);
        }
        self
    }
    pub fn exclude_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in exts {
            self = self.exclude_extension(ext.as_ref());
        }
        self
    }
    pub fn ignore_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.patterns.push(pattern.into());
        self
    }
    pub fn ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.patterns.extend(patterns);
        self
    }
    pub fn use_ignore_file(mut self, yes: bool) -> Self {
        self.config.use_ignore_file = yes;
        self
    }
    pub fn ignore_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.ignore_file_name = name.into();
        self
    }
    pub fn build(self) -> ExclusionConfig {
        self.config
    }
}

/// What to produce and where to put it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputOptions {
    pub include_structure: bool,
    /// Emit only the structure block, no file sections.
    pub structure_only: bool,
    /// Line budget per document; `None` or `Some(0)` writes a single document.
    pub chunk_max_lines: Option<usize>,
    pub output_path: PathBuf,
    pub binary_detection: BinaryDetection,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            include_structure: true,
            structure_only: false,
            chunk_max_lines: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            binary_detection: BinaryDetection::None,
        }
    }
}

impl OutputOptions {
    pub(crate) fn max_lines(&self) -> Option<usize> {
        self.chunk_max_lines.filter(|&n| n > 0)
    }
}

#[derive(Debug, Default)]
pub struct OutputOptionsBuilder {
    options: OutputOptions,
}

impl OutputOptionsBuilder {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            options: OutputOptions {
                output_path: output_path.into(),
                ..Default::default()
            },
        }
    }
    pub fn include_structure(mut self, yes: bool) -> Self {
        self.options.include_structure = yes;
        self
    }
    pub fn structure_only(mut self, yes: bool) -> Self {
        self.options.structure_only = yes;
        self
    }
    pub fn chunk_max_lines(mut self, max: Option<usize>) -> Self {
        self.options.chunk_max_lines = max;
        self
    }
    pub fn binary_detection(mut self, method: BinaryDetection) -> Self {
        self.options.binary_detection = method;
        self
    }
    pub fn build(self) -> OutputOptions {
        self.options
    }
}
