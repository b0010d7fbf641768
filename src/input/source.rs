//! Reading the upstream byte stream

use std::{
    fs::OpenOptions,
    os::{fd::RawFd, unix::fs::OpenOptionsExt},
    path::Path,
};

use nix::{
    errno::Errno,
    fcntl::{fcntl, FcntlArg, OFlag},
};

use crate::{
    buffers::{BufferPool, SharedBuffer},
    error::{Result, TeeError},
    registry::InputHandle,
    signals::ShutdownFlag,
};

use super::InputSpec;

/// Result of one read from the input
#[derive(Debug)]
pub enum ReadOutcome {
    /// One new published buffer
    Data(SharedBuffer),
    /// Zero-length read
    EndOfStream,
    /// Spurious wakeup on a non-blocking descriptor
    WouldBlock,
    /// Termination was requested while retrying
    Shutdown,
}

/// The single upstream origin of the tee
#[derive(Debug, Clone)]
pub struct InputSource {
    spec: InputSpec,
}

impl InputSource {
    /// Source for the given input spec; nothing is opened yet
    pub fn new(spec: InputSpec) -> Self {
        Self { spec }
    }

    /// Name used in diagnostics and as the registry entry name
    pub fn name(&self) -> String {
        self.spec.name()
    }

    /// Whether end of input should reopen instead of terminating.
    ///
    /// Standard input is never reopened.
    pub fn reopens_on_exhaustion(&self) -> bool {
        matches!(self.spec, InputSpec::Path { reopen: true, .. })
    }

    /// Open the origin in non-blocking mode
    pub fn open(&self) -> Result<InputHandle> {
        match &self.spec {
            InputSpec::Stdin => {
                set_nonblocking(libc::STDIN_FILENO, "STDIN")?;
                Ok(InputHandle::Stdin)
            }
            InputSpec::Path { path, .. } => open_named(path).map(InputHandle::Owned),
        }
    }

    /// Perform one read of up to `read_size` bytes from `fd`.
    ///
    /// EINTR is retried in place until `shutdown` is raised.
    pub fn read_chunk(
        &self,
        fd: RawFd,
        pool: &mut BufferPool,
        read_size: usize,
        shutdown: &ShutdownFlag,
    ) -> Result<ReadOutcome> {
        let mut data = pool.acquire();
        data.resize(read_size, 0);

        let outcome = loop {
            if shutdown.is_requested() {
                break Ok(ReadOutcome::Shutdown);
            }

            match nix::unistd::read(fd, &mut data) {
                Ok(0) => break Ok(ReadOutcome::EndOfStream),
                Ok(read) => {
                    data.truncate(read);
                    return Ok(ReadOutcome::Data(SharedBuffer::from_vec(data)));
                }
                Err(Errno::EINTR) => continue,
                Err(Errno::EAGAIN) => break Ok(ReadOutcome::WouldBlock),
                Err(errno) => break Err(TeeError::input_read(self.name(), errno.into())),
            }
        };

        pool.restore(data);
        outcome
    }
}

fn open_named(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
        .map_err(|e| TeeError::input_open(path, e))
}

/// Switch an inherited descriptor to non-blocking mode
pub fn set_nonblocking(fd: RawFd, name: &str) -> Result<()> {
    let flags = fcntl(fd, FcntlArg::F_GETFL)
        .map_err(|errno| TeeError::non_blocking(name, errno.into()))?;
    let flags = OFlag::from_bits_truncate(flags) | OFlag::O_NONBLOCK;
    fcntl(fd, FcntlArg::F_SETFL(flags)).map_err(|errno| TeeError::non_blocking(name, errno.into()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{io::Write, os::fd::AsRawFd, path::PathBuf};
    use tempfile::TempDir;

    fn named(path: PathBuf, reopen: bool) -> InputSource {
        InputSource::new(InputSpec::Path { path, reopen })
    }

    #[test]
    fn test_stdin_never_reopens() {
        assert!(!InputSource::new(InputSpec::Stdin).reopens_on_exhaustion());
        assert!(named(PathBuf::from("/x"), true).reopens_on_exhaustion());
        assert!(!named(PathBuf::from("/x"), false).reopens_on_exhaustion());
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let source = named(dir.path().join("missing"), false);
        assert!(matches!(source.open(), Err(TeeError::InputOpen { .. })));
    }

    #[test]
    fn test_read_chunks_until_end() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"0123456789")
            .unwrap();

        let source = named(path, false);
        let handle = source.open().unwrap();
        let mut pool = BufferPool::default();
        let shutdown = ShutdownFlag::new();

        let mut collected = Vec::new();
        loop {
            match source
                .read_chunk(handle.as_raw_fd(), &mut pool, 4, &shutdown)
                .unwrap()
            {
                ReadOutcome::Data(buffer) => {
                    assert!(buffer.len() <= 4);
                    collected.extend_from_slice(&buffer);
                    pool.release(buffer);
                }
                ReadOutcome::EndOfStream => break,
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(collected, b"0123456789");
        assert!(pool.stats().fresh_allocations < pool.stats().acquisitions);
    }

    #[test]
    fn test_shutdown_stops_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input");
        std::fs::write(&path, b"data").unwrap();

        let source = named(path, false);
        let handle = source.open().unwrap();
        let mut pool = BufferPool::default();
        let shutdown = ShutdownFlag::new();
        shutdown.request();

        let outcome = source
            .read_chunk(handle.as_raw_fd(), &mut pool, 16, &shutdown)
            .unwrap();
        assert!(matches!(outcome, ReadOutcome::Shutdown));
        assert_eq!(pool.idle_count(), 1);
    }
}
