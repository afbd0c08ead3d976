//! # Codecondense
//!
//! `codecondense` walks a project directory, leaves out what does not belong
//! in an LLM prompt (build output, binaries, whatever the `.gitignore` names)
//! and writes the rest into plain-text documents: one `>>>File:` section per
//! file, optionally led by a directory structure diagram, split into several
//! documents at file boundaries once a line budget is reached.
//!
//! Runs are sequential and deterministic: the same tree and configuration
//! always give byte-identical documents.
//!
//! # Features
//!
//! - `logging` (default): debug and warning events via the `tracing` crate.
//!
//! # Example
//!
//! ```no_run
//! use codecondense::{condense, CancellationToken, ExclusionConfigBuilder, NoopListener,
//!     OutputOptionsBuilder};
//!
//! let config = ExclusionConfigBuilder::new()
//!     .exclude_extension(".lock")
//!     .ignore_pattern("docs/generated/*")
//!     .build();
//! let options = OutputOptionsBuilder::new("out/condensed.txt")
//!     .chunk_max_lines(Some(15_000))
//!     .build();
//!
//! let result = condense(".", &config, &options, &mut NoopListener, &CancellationToken::new())
//!     .expect("condensation failed");
//! for path in &result.outputs {
//!     println!("wrote {}", path.display());
//! }
//! for warning in &result.warnings {
//!     eprintln!("warning: {}", warning);
//! }
//! ```

pub mod chunker;
mod engine;
mod error;
pub mod ignore_file;
pub mod matcher;
mod options;
pub mod output;
pub mod progress;
pub mod reader;
pub mod tree;
mod types;
pub mod walker;

pub use engine::{condense, condense_simple};
pub use error::{CondenseError, Result};
pub use matcher::{ExclusionReason, PatternMatcher};
pub use options::{
    BinaryDetection, DEFAULT_IGNORE_FILE, DEFAULT_OUTPUT_FILE, ExclusionConfig,
    ExclusionConfigBuilder, OutputOptions, OutputOptionsBuilder, normalize_extension,
};
pub use progress::{CancellationToken, NoopListener, ProgressEvent, ProgressListener};
pub use tree::TreeNode;
pub use types::{IncludedFile, RunResult, Warning};
