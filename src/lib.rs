//! # nbtee - Non-blocking tee for sockets and FIFOs
//!
//! nbtee copies a single input stream to any number of readers without
//! ever blocking on a slow or absent one. Readers either connect to a Unix
//! stream socket that nbtee listens on, or hold the read end of a FIFO that
//! already exists when nbtee starts.
//!
//! ## Features
//!
//! - **One read, many writers**: every chunk read is shared by reference
//!   count between the queues of all readers
//! - **Bounded queues**: a per-reader byte budget with drop or disconnect on
//!   overflow
//! - **Buffer recycling**: chunks come back to a pool once the last reader
//!   has written them
//! - **Single thread**: a level-triggered `poll(2)` loop, no locks
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────────┐
//!  input ───►│ InputSource  │──► SharedBuffer (from BufferPool)
//!            └──────────────┘          │
//!                                      ▼ fan-out
//!   ┌────────────────┬────────────────┬────────────────┐
//!   │ OutputQueue    │ OutputQueue    │ OutputQueue    │   stdout mirror
//!   │ (connection)   │ (connection)   │ (fifo)         │   (blocking)
//!   └────────────────┴────────────────┴────────────────┘
//!                    drained by the Reactor on POLLOUT
//! ```

pub mod buffers;
pub mod config;
pub mod error;
pub mod input;
pub mod listener;
pub mod queue;
pub mod reactor;
pub mod registry;
pub mod signals;

pub use buffers::{BufferPool, BufferPoolConfig, BufferPoolStats, SharedBuffer};
pub use config::{parse_size, TeeConfig};
pub use error::{Result, TeeError};
pub use input::{InputSource, InputSpec, ReadOutcome};
pub use listener::{probe_target, OwnedPaths, Target};
pub use queue::{DrainOutcome, OutputQueue, OverflowPolicy, QueueStats};
pub use reactor::{Mirror, Reactor, Termination, Turn};
pub use registry::{Channel, Endpoint, EndpointRole, InputHandle, Registry, WaitInterest};
pub use signals::{install_handlers, ShutdownFlag};
