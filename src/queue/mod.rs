//! Per-sink output queues and the overflow policy
//!
//! Each sink owns an [`OutputQueue`] of `(buffer, offset)` entries. Fan-out
//! offers every new buffer to every queue; the budget decides whether it is
//! taken. Draining writes the head entry and keeps partial progress at the
//! head, so each sink sees the input bytes in exactly the order they were read.

pub mod output;
pub mod overflow;

pub use output::{DrainOutcome, OutputQueue, QueueEntry, QueueStats, COMPACT_DEPTH};
pub use overflow::{fits_budget, Admission, OverflowAction, OverflowPolicy};
