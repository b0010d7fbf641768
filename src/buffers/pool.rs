//! Free list of input buffers

use super::{buffer::SharedBuffer, config::BufferPoolConfig, stats::BufferPoolStats};

/// Recycles input buffers once every sink has finished with them.
///
/// The pool is owned by the reactor and only touched from its thread, so
/// there is no locking. Recycling is purely an allocation-rate optimization:
/// a buffer that is still shared on release is simply dropped by the caller
/// and freed when its last holder lets go.
#[derive(Debug)]
pub struct BufferPool {
    config: BufferPoolConfig,
    idle: Vec<Vec<u8>>,
    stats: BufferPoolStats,
}

impl BufferPool {
    /// Create an empty pool
    pub fn new(config: BufferPoolConfig) -> Self {
        Self {
            idle: Vec::with_capacity(config.max_idle),
            config,
            stats: BufferPoolStats::new(),
        }
    }

    /// Take an empty buffer, recycled if possible.
    ///
    /// The caller sizes it to the read length before publishing.
    pub fn acquire(&mut self) -> Vec<u8> {
        self.stats.acquisitions += 1;

        match self.idle.pop() {
            Some(mut buffer) => {
                buffer.clear();
                buffer
            }
            None => {
                self.stats.fresh_allocations += 1;
                Vec::with_capacity(self.config.buffer_size)
            }
        }
    }

    /// Give back a vector that was never published
    pub fn restore(&mut self, buffer: Vec<u8>) {
        self.push_idle(buffer);
    }

    /// Release one handle to a published buffer.
    ///
    /// Returns `true` if the buffer came back to the idle list, which only
    /// happens when the released handle was the last one.
    pub fn release(&mut self, buffer: SharedBuffer) -> bool {
        match buffer.try_into_vec() {
            Ok(vec) => self.push_idle(vec),
            Err(_still_shared) => {
                self.stats.still_shared += 1;
                false
            }
        }
    }

    fn push_idle(&mut self, buffer: Vec<u8>) -> bool {
        if self.idle.len() >= self.config.max_idle {
            self.stats.discarded += 1;
            return false;
        }

        self.idle.push(buffer);
        self.stats.recycled += 1;
        self.stats.peak_idle = self.stats.peak_idle.max(self.idle.len());
        true
    }

    /// Number of idle buffers ready for reuse
    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    /// Get current statistics
    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(BufferPoolConfig::default())
    }
}
