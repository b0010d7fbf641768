//! The OS handle behind each endpoint

use std::{
    fs::File,
    io::{self, Write},
    os::{
        fd::{AsRawFd, RawFd},
        unix::net::{UnixListener, UnixStream},
    },
};

use super::endpoint::EndpointRole;

/// Where the input bytes come from
#[derive(Debug)]
pub enum InputHandle {
    /// Standard input; never closed by us
    Stdin,
    /// A named file, FIFO or any other owned descriptor
    Owned(File),
}

impl AsRawFd for InputHandle {
    fn as_raw_fd(&self) -> RawFd {
        match self {
            InputHandle::Stdin => libc::STDIN_FILENO,
            InputHandle::Owned(file) => file.as_raw_fd(),
        }
    }
}

/// Owned descriptor for one registered endpoint.
///
/// Dropping a channel closes the descriptor (standard input excepted).
#[derive(Debug)]
pub enum Channel {
    Input(InputHandle),
    Listener(UnixListener),
    Connection(UnixStream),
    Fifo(File),
}

impl Channel {
    /// Role implied by the handle type
    pub fn role(&self) -> EndpointRole {
        match self {
            Channel::Input(_) => EndpointRole::Input,
            Channel::Listener(_) => EndpointRole::Listener,
            Channel::Connection(_) => EndpointRole::Connection,
            Channel::Fifo(_) => EndpointRole::Fifo,
        }
    }
}

impl AsRawFd for Channel {
    fn as_raw_fd(&self) -> RawFd {
        match self {
            Channel::Input(input) => input.as_raw_fd(),
            Channel::Listener(listener) => listener.as_raw_fd(),
            Channel::Connection(stream) => stream.as_raw_fd(),
            Channel::Fifo(file) => file.as_raw_fd(),
        }
    }
}

impl Write for Channel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Channel::Connection(stream) => stream.write(buf),
            Channel::Fifo(file) => file.write(buf),
            _ => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "endpoint does not accept output",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
