//! Per-endpoint state held by the registry

use std::{
    fmt,
    os::fd::{AsRawFd, RawFd},
};

use crate::queue::{DrainOutcome, OutputQueue};

use super::channel::Channel;

/// What an endpoint does in the tee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    /// The single upstream source
    Input,
    /// Passive accept point bound to a socket path
    Listener,
    /// An accepted socket reader
    Connection,
    /// A pre-existing FIFO opened for writing
    Fifo,
}

impl EndpointRole {
    /// Whether the role receives fanned-out data
    pub fn is_sink(self) -> bool {
        matches!(self, EndpointRole::Connection | EndpointRole::Fifo)
    }
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndpointRole::Input => "input",
            EndpointRole::Listener => "listener",
            EndpointRole::Connection => "connection",
            EndpointRole::Fifo => "fifo",
        };
        f.write_str(name)
    }
}

/// A registered endpoint: its channel, name, wait slot and, for sinks, queue
#[derive(Debug)]
pub struct Endpoint {
    channel: Channel,
    name: String,
    pub(super) slot: usize,
    queue: Option<OutputQueue>,
}

impl Endpoint {
    pub(super) fn new(channel: Channel, name: String, slot: usize) -> Self {
        let queue = channel.role().is_sink().then(OutputQueue::new);
        Self {
            channel,
            name,
            slot,
            queue,
        }
    }

    /// Role of this endpoint
    pub fn role(&self) -> EndpointRole {
        self.channel.role()
    }

    /// Descriptor number identifying this endpoint
    pub fn identity(&self) -> RawFd {
        self.channel.as_raw_fd()
    }

    /// Path or `STDIN`, for diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of this endpoint's readiness-wait slot
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// The owned OS handle
    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Output queue; `None` for the input and listeners
    pub fn queue(&self) -> Option<&OutputQueue> {
        self.queue.as_ref()
    }

    /// Mutable output queue; `None` for the input and listeners
    pub fn queue_mut(&mut self) -> Option<&mut OutputQueue> {
        self.queue.as_mut()
    }

    /// Write the head of this sink's queue to its channel
    pub fn drain_one(&mut self) -> DrainOutcome {
        match self.queue.as_mut() {
            Some(queue) => queue.drain_one(&mut self.channel),
            None => DrainOutcome::Idle,
        }
    }
}
