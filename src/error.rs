//! Error types and handling for nbtee

use std::os::fd::RawFd;
use std::path::Path;

/// Result type alias for nbtee operations
pub type Result<T> = std::result::Result<T, TeeError>;

/// Process exit code for a clean shutdown
pub const EXIT_OK: i32 = 0;
/// Process exit code for fatal I/O failures
pub const EXIT_FATAL_IO: i32 = 1;
/// Process exit code for internal invariant violations
pub const EXIT_INTERNAL: i32 = 2;

/// Fatal error conditions.
///
/// Per-sink failures never surface here: the reactor closes the offending
/// sink and carries on. Everything in this enum ends the process.
#[derive(Debug, thiserror::Error)]
pub enum TeeError {
    /// Generic I/O failure with context
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The configured input could not be opened (or reopened)
    #[error("Failed to open '{path}' for input, {source}")]
    InputOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the input failed with something other than EINTR
    #[error("Failed to read from {name}: {source}")]
    InputRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Mirroring to standard output failed
    #[error("Write to STDOUT failed, {source}")]
    MirrorWrite {
        #[source]
        source: std::io::Error,
    },

    /// Socket path does not fit in `sockaddr_un.sun_path`
    #[error("Socket name: {path} too long, maximum: {max}")]
    SocketPathTooLong { path: String, max: usize },

    /// accept() failed on a listener
    #[error("accept({name}) failed, {source}")]
    Accept {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Could not switch a descriptor to non-blocking mode
    #[error("Could not set O_NONBLOCK on {name}: {source}")]
    NonBlocking {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The readiness wait reported a descriptor the registry does not know
    #[error("Readiness reported for untracked descriptor {fd}")]
    UntrackedEndpoint { fd: RawFd },

    /// Invalid parameters or configuration
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },
}

impl TeeError {
    /// Create an I/O error from a standard I/O error
    pub fn from_io(source: std::io::Error, context: &str) -> Self {
        Self::Io {
            message: format!("{}: {}", context, source),
            source: Some(source),
        }
    }

    /// The input at `path` could not be opened
    pub fn input_open(path: &Path, source: std::io::Error) -> Self {
        Self::InputOpen {
            path: path.display().to_string(),
            source,
        }
    }

    /// Reading the input failed
    pub fn input_read(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::InputRead {
            name: name.into(),
            source,
        }
    }

    /// Writing the standard output mirror failed
    pub fn mirror_write(source: std::io::Error) -> Self {
        Self::MirrorWrite { source }
    }

    /// `path` does not fit `sockaddr_un`
    pub fn socket_path_too_long(path: &Path, max: usize) -> Self {
        Self::SocketPathTooLong {
            path: path.display().to_string(),
            max,
        }
    }

    /// accept() failed on the listener named `name`
    pub fn accept(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Accept {
            name: name.into(),
            source,
        }
    }

    /// Switching `name` to non-blocking mode failed
    pub fn non_blocking(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::NonBlocking {
            name: name.into(),
            source,
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Exit status the process should terminate with for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UntrackedEndpoint { .. } => EXIT_INTERNAL,
            _ => EXIT_FATAL_IO,
        }
    }
}

impl From<std::io::Error> for TeeError {
    fn from(err: std::io::Error) -> Self {
        Self::from_io(err, "I/O operation failed")
    }
}

impl From<nix::errno::Errno> for TeeError {
    fn from(err: nix::errno::Errno) -> Self {
        Self::from_io(std::io::Error::from(err), "system call failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err = TeeError::UntrackedEndpoint { fd: 42 };
        assert_eq!(err.exit_code(), EXIT_INTERNAL);

        let err = TeeError::accept("/tmp/sock", std::io::Error::from_raw_os_error(libc::EMFILE));
        assert_eq!(err.exit_code(), EXIT_FATAL_IO);

        let err = TeeError::mirror_write(std::io::Error::from_raw_os_error(libc::EPIPE));
        assert_eq!(err.exit_code(), EXIT_FATAL_IO);
    }

    #[test]
    fn test_error_display() {
        let err = TeeError::socket_path_too_long(Path::new("/very/long"), 107);
        let display = format!("{}", err);
        assert!(display.contains("/very/long"));
        assert!(display.contains("107"));

        let err = TeeError::invalid_parameter("max-queue", "unknown suffix 'q'");
        assert!(format!("{}", err).contains("max-queue"));
    }

    #[test]
    fn test_errno_conversion() {
        let err: TeeError = nix::errno::Errno::EBADF.into();
        assert!(matches!(err, TeeError::Io { source: Some(_), .. }));
    }
}
