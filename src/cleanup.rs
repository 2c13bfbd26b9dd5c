//! Best-effort removal of test artifacts. Never fails a test.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// What happened to the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    Removed,
    AlreadyGone,
    /// Removal failed for a reason other than "not found"; logged as a warning.
    Failed,
}

/// Remove the binary at `path`. A missing file counts as success.
pub fn cleanup(path: &Path) -> CleanupOutcome {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed test binary");
            CleanupOutcome::Removed
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => CleanupOutcome::AlreadyGone,
        Err(e) => {
            warn!("Warning: Failed to cleanup binary {}: {}", path.display(), e);
            CleanupOutcome::Failed
        }
    }
}
