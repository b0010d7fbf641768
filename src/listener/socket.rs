//! Unix domain socket listeners

use std::{
    fs,
    os::unix::{
        fs::FileTypeExt,
        net::{UnixListener, UnixStream},
    },
    path::Path,
};

use crate::error::{Result, TeeError};

/// Longest socket path that fits `sockaddr_un.sun_path` with its terminator
pub fn max_socket_path_len() -> usize {
    // SAFETY: sockaddr_un is plain old data; all-zero is a valid value
    let addr: libc::sockaddr_un = unsafe { std::mem::zeroed() };
    addr.sun_path.len() - 1
}

/// Bind and listen on `path`.
///
/// An over-long path is fatal. Other failures are logged and yield `None`
/// so the remaining targets still get served.
pub fn bind_listener(path: &Path, unlink_before: bool) -> Result<Option<UnixListener>> {
    let max = max_socket_path_len();
    if path.as_os_str().len() > max {
        return Err(TeeError::socket_path_too_long(path, max));
    }

    if unlink_before {
        unlink_stale_socket(path);
    }

    let listener = match UnixListener::bind(path) {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("bind({}) failed, {}", path.display(), e);
            return Ok(None);
        }
    };

    listener
        .set_nonblocking(true)
        .map_err(|e| TeeError::non_blocking(path.display().to_string(), e))?;

    log::debug!("listening on {}", path.display());
    Ok(Some(listener))
}

/// Remove an existing socket at `path`; anything that is not a socket stays
fn unlink_stale_socket(path: &Path) {
    match fs::metadata(path) {
        Ok(meta) if meta.file_type().is_socket() => {
            if let Err(e) = fs::remove_file(path) {
                log::debug!("unlink({}) failed, {}", path.display(), e);
            }
        }
        _ => {}
    }
}

/// Accept one pending connection and make it non-blocking.
///
/// Failure here is fatal: a bound listener is expected to stay healthy.
pub fn accept_connection(listener: &UnixListener, name: &str) -> Result<UnixStream> {
    let (stream, _addr) = listener
        .accept()
        .map_err(|e| TeeError::accept(name, e))?;
    stream
        .set_nonblocking(true)
        .map_err(|e| TeeError::non_blocking(name, e))?;
    Ok(stream)
}
