//! Per-sink FIFO of shared buffers

use std::{
    collections::VecDeque,
    io::{self, Write},
};

use crate::buffers::SharedBuffer;

use super::overflow::{fits_budget, Admission, OverflowPolicy};

/// Queue depth at which older buffers get compacted
pub const COMPACT_DEPTH: usize = 4;

/// A queued buffer and how much of it this sink has already written
#[derive(Debug, Clone)]
pub struct QueueEntry {
    buffer: SharedBuffer,
    offset: usize,
}

impl QueueEntry {
    fn new(buffer: SharedBuffer) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Bytes not yet written
    pub fn remaining(&self) -> &[u8] {
        &self.buffer[self.offset..]
    }

    /// Bytes of the buffer already written
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The shared buffer this entry points into
    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    fn is_done(&self) -> bool {
        self.offset >= self.buffer.len()
    }
}

/// Outcome of one drain attempt
#[derive(Debug)]
pub enum DrainOutcome {
    /// Nothing was queued
    Idle,
    /// The head entry was fully written; its buffer handle is handed back
    Complete(SharedBuffer),
    /// The sink cannot take more right now; the entry is back at the head
    Deferred,
    /// The sink failed hard and should be closed
    Failed(io::Error),
}

/// Running counters for one sink
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueStats {
    pub buffers_queued: u64,
    pub bytes_queued: u64,
    pub bytes_written: u64,
    pub buffers_dropped: u64,
    pub bytes_dropped: u64,
}

/// Ordered queue of pending writes for one sink, with its byte budget.
///
/// `queued_bytes` always equals the unsent bytes across all entries.
#[derive(Debug, Default)]
pub struct OutputQueue {
    entries: VecDeque<QueueEntry>,
    queued_bytes: usize,
    overflowed: bool,
    stats: QueueStats,
}

impl OutputQueue {
    /// Empty queue with a zero budget
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a freshly read buffer to this sink.
    ///
    /// Empty buffers are never queued.
    pub fn offer(
        &mut self,
        buffer: &SharedBuffer,
        max_queue: usize,
        policy: OverflowPolicy,
    ) -> Admission {
        if buffer.is_empty() {
            return Admission::Queued;
        }

        if !fits_budget(self.queued_bytes, buffer.len(), max_queue) {
            let action = policy.action(self.overflowed);
            self.overflowed = true;
            self.stats.buffers_dropped += 1;
            self.stats.bytes_dropped += buffer.len() as u64;
            return Admission::Rejected(action);
        }

        self.entries.push_back(QueueEntry::new(buffer.clone()));
        self.queued_bytes += buffer.len();
        self.stats.buffers_queued += 1;
        self.stats.bytes_queued += buffer.len() as u64;

        if self.entries.len() >= COMPACT_DEPTH {
            let older = self.entries.len() - COMPACT_DEPTH;
            self.entries[older].buffer.compact();
        }

        Admission::Queued
    }

    /// Write as much of the head entry as `writer` will take.
    ///
    /// Partial progress stays at the head of the queue so later buffers are
    /// never attempted before an earlier one is finished.
    pub fn drain_one<W: Write + ?Sized>(&mut self, writer: &mut W) -> DrainOutcome {
        let mut entry = match self.entries.pop_front() {
            Some(entry) => entry,
            None => return DrainOutcome::Idle,
        };

        while !entry.is_done() {
            match writer.write(entry.remaining()) {
                Ok(0) => {
                    self.entries.push_front(entry);
                    return DrainOutcome::Failed(io::Error::from(io::ErrorKind::WriteZero));
                }
                Ok(written) => {
                    entry.offset += written;
                    self.queued_bytes -= written;
                    self.stats.bytes_written += written as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    self.entries.push_front(entry);
                    return DrainOutcome::Deferred;
                }
                Err(e) => {
                    self.entries.push_front(entry);
                    return DrainOutcome::Failed(e);
                }
            }
        }

        DrainOutcome::Complete(entry.buffer)
    }

    /// Unsent bytes charged against the budget
    pub fn queued_bytes(&self) -> usize {
        self.queued_bytes
    }

    /// Unsent bytes recomputed from the entries themselves
    pub fn unsent_bytes(&self) -> usize {
        self.entries.iter().map(|e| e.remaining().len()).sum()
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether this sink has ever had data dropped
    pub fn has_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Counters for this sink
    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }

    /// Queued entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    /// Drop every entry, returning the buffer handles
    pub fn clear(&mut self) -> Vec<SharedBuffer> {
        self.queued_bytes = 0;
        self.entries.drain(..).map(|e| e.buffer).collect()
    }
}
