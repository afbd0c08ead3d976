//! Progress reporting and cooperative cancellation.
//!
//! The engine calls the listener synchronously on the thread that runs it.
//! A listener that lives on another thread (a UI, say) can take the
//! [`Sender<ProgressEvent>`](std::sync::mpsc::Sender) implementation and
//! drain the receiving end at its own pace.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

/// Receives notifications while a run is in progress. Both methods default to
/// doing nothing.
pub trait ProgressListener {
    /// Called after each file is processed, whether it was included or skipped.
    fn on_progress(&mut self, files_processed: usize, total_files: usize, current: &Path) {
        let _ = (files_processed, total_files, current);
    }

    /// Called once for every warning, as soon as it is recorded.
    fn on_warning(&mut self, path: &Path, reason: &str) {
        let _ = (path, reason);
    }
}

/// A listener that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl ProgressListener for NoopListener {}

/// A notification in owned form, for sending across threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressEvent {
    Progress {
        files_processed: usize,
        total_files: usize,
        current: PathBuf,
    },
    Warning {
        path: PathBuf,
        reason: String,
    },
}

impl ProgressListener for Sender<ProgressEvent> {
    fn on_progress(&mut self, files_processed: usize, total_files: usize, current: &Path) {
        // A dropped receiver only means nobody is watching any more.
        let _ = self.send(ProgressEvent::Progress {
            files_processed,
            total_files,
            current: current.to_path_buf(),
        });
    }

    fn on_warning(&mut self, path: &Path, reason: &str) {
        let _ = self.send(ProgressEvent::Warning {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        });
    }
}

/// A cloneable flag for stopping a run from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
