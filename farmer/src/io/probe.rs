//! Filesystem checks the orchestrator makes before planning a step.

use std::path::Path;

/// Answers whether a path is already taken. Abstracted so the clone guard can
/// be exercised against a stub filesystem.
pub trait PathProbe {
    /// True for any existing entry (directory, file or symlink target).
    fn exists(&self, path: &Path) -> bool;
}

/// Probe backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl PathProbe for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
