//! Output targets: socket listeners and FIFOs
//!
//! Each positional target is probed once at startup. An existing FIFO is
//! opened for writing and becomes a single sink; anything else is a socket
//! path to bind, and every reader that connects to it becomes a sink of its
//! own.

use std::{
    os::unix::fs::FileTypeExt,
    path::{Path, PathBuf},
};

pub mod cleanup;
pub mod fifo;
pub mod socket;

pub use cleanup::OwnedPaths;
pub use fifo::open_fifo;
pub use socket::{accept_connection, bind_listener, max_socket_path_len};

/// What a positional target turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Fifo(PathBuf),
    Socket(PathBuf),
}

impl Target {
    /// Filesystem path of the target
    pub fn path(&self) -> &Path {
        match self {
            Target::Fifo(path) | Target::Socket(path) => path,
        }
    }
}

/// Classify a target path by what currently exists there
pub fn probe_target(path: &Path) -> Target {
    match std::fs::metadata(path) {
        Ok(meta) if meta.file_type().is_fifo() => Target::Fifo(path.to_path_buf()),
        _ => Target::Socket(path.to_path_buf()),
    }
}
