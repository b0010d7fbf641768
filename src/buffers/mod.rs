//! Input buffers and their recycling pool
//!
//! Every read from the input lands in one [`SharedBuffer`]. The same buffer
//! is queued to every sink by reference, and returns to the [`BufferPool`]
//! once the last sink has written it out.

pub mod buffer;
pub mod config;
pub mod pool;
pub mod stats;

// Re-export main types
pub use buffer::SharedBuffer;
pub use config::BufferPoolConfig;
pub use pool::BufferPool;
pub use stats::BufferPoolStats;
