//! Pre-existing FIFO sinks

use std::{
    fs::{File, OpenOptions},
    os::unix::fs::OpenOptionsExt,
    path::Path,
};

/// Open a FIFO for non-blocking appending writes.
///
/// Opening fails with `ENXIO` while the FIFO has no reader; that and any
/// other failure is logged and the target skipped.
pub fn open_fifo(path: &Path) -> Option<File> {
    match OpenOptions::new()
        .write(true)
        .append(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
    {
        Ok(file) => {
            log::debug!("writing to FIFO {}", path.display());
            Some(file)
        }
        Err(e) => {
            log::error!("FIFO: {} cannot be opened, {}", path.display(), e);
            None
        }
    }
}
