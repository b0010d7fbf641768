//! What happens when a sink's queue budget is exhausted

/// Policy for sinks that fall too far behind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Discard new data for the sink, warn once, keep it connected
    #[default]
    Drop,
    /// Disconnect the sink instead of discarding data for it
    Disconnect,
}

/// Result of offering a buffer to a sink's queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The buffer was appended to the queue
    Queued,
    /// The buffer was not queued; the action says what to do about it
    Rejected(OverflowAction),
}

/// Follow-up the caller owes a rejected offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowAction {
    /// First overflow for this sink: report it
    Warn,
    /// Already reported: drop silently
    Silent,
    /// Schedule the sink for disconnection once fan-out is over
    Disconnect,
}

impl OverflowPolicy {
    /// Decide what a rejection means given whether the sink had already overflowed
    pub fn action(self, already_overflowed: bool) -> OverflowAction {
        match (self, already_overflowed) {
            (OverflowPolicy::Disconnect, _) => OverflowAction::Disconnect,
            (OverflowPolicy::Drop, false) => OverflowAction::Warn,
            (OverflowPolicy::Drop, true) => OverflowAction::Silent,
        }
    }
}

/// Whether a buffer of `len` bytes fits a queue already holding `queued` bytes.
///
/// An empty queue always takes the buffer so a sink is never starved by a
/// budget smaller than one read; otherwise the buffer must fit whole.
pub fn fits_budget(queued: usize, len: usize, max_queue: usize) -> bool {
    queued == 0 || queued.saturating_add(len) <= max_queue
}
