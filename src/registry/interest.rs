//! Wait interest and reported readiness for a slot

use nix::poll::PollFlags;

/// Conditions an endpoint is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitInterest {
    /// Input or pending connections
    Readable,
    /// Queued output
    Writable,
    /// Idle sink: only hang-ups and errors
    ErrorOnly,
}

impl WaitInterest {
    /// Poll events to request
    pub fn flags(self) -> PollFlags {
        match self {
            WaitInterest::Readable => PollFlags::POLLIN | PollFlags::POLLERR,
            WaitInterest::Writable => PollFlags::POLLOUT | PollFlags::POLLERR,
            WaitInterest::ErrorOnly => PollFlags::POLLERR,
        }
    }

    pub(super) fn from_events(events: libc::c_short) -> Self {
        let flags = PollFlags::from_bits_truncate(events);
        if flags.contains(PollFlags::POLLIN) {
            WaitInterest::Readable
        } else if flags.contains(PollFlags::POLLOUT) {
            WaitInterest::Writable
        } else {
            WaitInterest::ErrorOnly
        }
    }
}

/// What the last readiness wait reported for a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness(PollFlags);

impl Readiness {
    /// Wrap the `revents` reported for a slot
    pub fn from_revents(revents: libc::c_short) -> Self {
        Self(PollFlags::from_bits_truncate(revents))
    }

    /// Nothing pending
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the sink can take more output
    pub fn is_writable(&self) -> bool {
        self.0.contains(PollFlags::POLLOUT)
    }

    /// Raw reported events
    pub fn flags(&self) -> PollFlags {
        self.0
    }
}
