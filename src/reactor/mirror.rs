//! Synchronous copy of the input to standard output

use std::os::fd::RawFd;
#[cfg(test)]
use std::os::fd::{AsRawFd, OwnedFd};

use nix::errno::Errno;

use crate::{
    error::{Result, TeeError},
    signals::ShutdownFlag,
};

#[derive(Debug)]
enum MirrorTarget {
    Stdout,
    #[cfg(test)]
    Owned(OwnedFd),
}

/// Blocking writer for the primary output.
///
/// Unlike sinks this is never queued: a slow standard output stalls the
/// whole tee, and any write failure is fatal.
#[derive(Debug)]
pub struct Mirror {
    target: MirrorTarget,
}

impl Mirror {
    /// Mirror into the process's standard output
    pub fn stdout() -> Self {
        Self {
            target: MirrorTarget::Stdout,
        }
    }

    #[cfg(test)]
    pub(crate) fn to_fd(fd: OwnedFd) -> Self {
        Self {
            target: MirrorTarget::Owned(fd),
        }
    }

    fn raw_fd(&self) -> RawFd {
        match &self.target {
            MirrorTarget::Stdout => libc::STDOUT_FILENO,
            #[cfg(test)]
            MirrorTarget::Owned(fd) => fd.as_raw_fd(),
        }
    }

    /// Write all of `data`, retrying EINTR until shutdown is requested
    pub fn write_all(&mut self, mut data: &[u8], shutdown: &ShutdownFlag) -> Result<()> {
        let fd = self.raw_fd();

        while !data.is_empty() && !shutdown.is_requested() {
            match nix::unistd::write(fd, data) {
                Ok(0) => {
                    return Err(TeeError::mirror_write(std::io::ErrorKind::WriteZero.into()));
                }
                Ok(written) => data = &data[written..],
                Err(Errno::EINTR) => continue,
                // the descriptor may share a non-blocking file description with stdin
                Err(Errno::EAGAIN) => wait_writable(fd)?,
                Err(errno) => return Err(TeeError::mirror_write(errno.into())),
            }
        }

        Ok(())
    }
}

fn wait_writable(fd: RawFd) -> Result<()> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLOUT,
        revents: 0,
    };

    // SAFETY: a single valid pollfd on the stack
    let result = unsafe { libc::poll(&mut pfd, 1, -1) };
    if result < 0 {
        let err = std::io::Error::last_os_error();
        if err.kind() != std::io::ErrorKind::Interrupted {
            return Err(TeeError::mirror_write(err));
        }
    }
    Ok(())
}
