//! Filesystem paths the tee is responsible for removing

use std::path::{Path, PathBuf};

/// Socket and FIFO paths recorded at setup, removed on exit when asked to
#[derive(Debug, Default)]
pub struct OwnedPaths {
    paths: Vec<PathBuf>,
    unlink_after: bool,
}

impl OwnedPaths {
    /// Empty ledger; `unlink_after` decides whether cleanup removes anything
    pub fn new(unlink_after: bool) -> Self {
        Self {
            paths: Vec::new(),
            unlink_after,
        }
    }

    /// Take ownership of `path`
    pub fn record(&mut self, path: &Path) {
        self.paths.push(path.to_path_buf());
    }

    /// Recorded paths not yet cleaned up
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Best-effort unlink of every recorded path.
    ///
    /// Runs at most once; later calls are no-ops.
    pub fn cleanup(&mut self) {
        if !self.unlink_after {
            return;
        }

        for path in self.paths.drain(..) {
            if let Err(e) = std::fs::remove_file(&path) {
                log::debug!("unlink({}) failed, {}", path.display(), e);
            }
        }
    }
}
