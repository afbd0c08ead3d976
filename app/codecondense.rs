//! Command-line interface for codecondense.
//!
//! Walks a project directory and writes the condensed document(s), printing
//! a summary (or a JSON report) when done.

use clap::{Parser, ValueEnum};
use codecondense::{
    BinaryDetection, CancellationToken, ExclusionConfig, ExclusionConfigBuilder, OutputOptions,
    OutputOptionsBuilder, ProgressListener, PatternMatcher, condense, ignore_file, output,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

const PROGRESS_EVERY: usize = 20;

/// codecondense: pack a source tree into LLM-ready text
#[derive(Parser)]
#[command(name = "codecondense", version, about, long_about = None)]
struct Cli {
    /// Project root directory (default current dir)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Output file; chunks get `_partN` before the extension
    #[arg(short, long, default_value = codecondense::DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Leave out the directory structure block
    #[arg(long)]
    no_structure: bool,

    /// Write only the directory structure
    #[arg(long, conflicts_with = "no_structure")]
    structure_only: bool,

    /// Maximum lines per output document (0 or unset: one document)
    #[arg(long)]
    max_lines: Option<usize>,

    /// Directory names to exclude (comma-separated or repeated)
    #[arg(long = "exclude-dir", value_delimiter = ',')]
    exclude_dirs: Vec<String>,

    /// File names or globs to exclude (comma-separated or repeated)
    #[arg(long = "exclude-file", value_delimiter = ',')]
    exclude_files: Vec<String>,

    /// Extensions to exclude, with or without the dot (comma-separated or repeated)
    #[arg(long = "exclude-ext", value_delimiter = ',')]
    exclude_exts: Vec<String>,

    /// Glob patterns against the root-relative path (can be repeated)
    #[arg(short = 'I', long = "ignore")]
    ignore_patterns: Vec<String>,

    /// Do not read the ignore file
    #[arg(long)]
    no_gitignore: bool,

    /// Name of the ignore file in the project root [default: .gitignore, or the --config value]
    #[arg(long)]
    ignore_file: Option<String>,

    /// Start from empty exclusion lists instead of the built-in defaults
    #[arg(long)]
    no_defaults: bool,

    /// JSON exclusion config; command-line exclusions are added on top
    #[arg(long)]
    config: Option<PathBuf>,

    /// Binary detection strategy
    #[arg(long, value_enum, default_value_t = Detection::None)]
    binary_detection: Detection,

    /// Print the run result as JSON
    #[arg(long)]
    json: bool,

    /// No progress output
    #[arg(short, long)]
    quiet: bool,

    /// Report why a root-relative path would be excluded, then exit
    #[arg(long, value_name = "PATH")]
    explain: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Detection {
    None,
    Simple,
    Accurate,
}

impl From<Detection> for BinaryDetection {
    fn from(d: Detection) -> Self {
        match d {
            Detection::None => BinaryDetection::None,
            Detection::Simple => BinaryDetection::Simple,
            Detection::Accurate => BinaryDetection::Accurate,
        }
    }
}

impl Cli {
    fn exclusion_config(&self) -> Result<ExclusionConfig, String> {
        let base = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
                ExclusionConfig::from_json(&text).map_err(|e| e.to_string())?
            }
            None if self.no_defaults => ExclusionConfig::empty(),
            None => ExclusionConfig::default(),
        };
        let ignore_file_name = self.ignore_file.clone().unwrap_or(base.ignore_file_name);
        let builder = ExclusionConfigBuilder::empty()
            .exclude_dirs(base.dirs)
            .exclude_files(base.files)
            .exclude_extensions(base.extensions)
            .ignore_patterns(base.patterns)
            .exclude_dirs(self.exclude_dirs.iter().cloned())
            .exclude_files(self.exclude_files.iter().cloned())
            .exclude_extensions(&self.exclude_exts)
            .ignore_patterns(self.ignore_patterns.clone())
            .use_ignore_file(base.use_ignore_file && !self.no_gitignore)
            .ignore_file_name(ignore_file_name);
        Ok(builder.build())
    }

    fn output_options(&self) -> OutputOptions {
        OutputOptionsBuilder::new(&self.output)
            .include_structure(!self.no_structure)
            .structure_only(self.structure_only)
            .chunk_max_lines(self.max_lines)
            .binary_detection(self.binary_detection.into())
            .build()
    }
}

/// Prints progress and warnings to stderr.
struct StderrProgress {
    quiet: bool,
}

impl ProgressListener for StderrProgress {
    fn on_progress(&mut self, files_processed: usize, total_files: usize, current: &Path) {
        if self.quiet {
            return;
        }
        if files_processed % PROGRESS_EVERY == 0 || files_processed == total_files {
            eprintln!(
                "[{}/{}] {}",
                files_processed,
                total_files,
                current.display()
            );
        }
    }

    fn on_warning(&mut self, path: &Path, reason: &str) {
        if !self.quiet {
            eprintln!("warning: {}: {}", path.display(), reason);
        }
    }
}

#[cfg(feature = "logging")]
fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();
}

fn main() {
    #[cfg(feature = "logging")]
    init_logging();

    let cli = Cli::parse();
    let config = cli.exclusion_config().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        exit(1);
    });

    if let Some(path) = &cli.explain {
        explain(&cli.root, &config, path);
        return;
    }

    let options = cli.output_options();
    let mut progress = StderrProgress { quiet: cli.quiet };
    let result = match condense(
        &cli.root,
        &config,
        &options,
        &mut progress,
        &CancellationToken::new(),
    ) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    if cli.json {
        match output::format_report(&result, true) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                exit(1);
            }
        }
    } else {
        print!("{}", output::format_summary(&result));
    }
}

fn explain(root: &Path, config: &ExclusionConfig, rel_path: &str) {
    let rules = if config.use_ignore_file {
        ignore_file::load(&root.join(&config.ignore_file_name), "").0
    } else {
        ignore_file::IgnoreRules::new()
    };
    let matcher = PatternMatcher::new(config, rules).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        exit(1);
    });
    let rel_path = rel_path.trim_start_matches("./");
    let is_dir = root.join(rel_path).is_dir();
    match matcher.explain(rel_path, is_dir) {
        Some(reason) => println!("{}: excluded ({:?})", rel_path, reason),
        None => println!("{}: included", rel_path),
    }
}
