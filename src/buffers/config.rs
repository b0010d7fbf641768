//! Buffer pool configuration

use crate::config::{DEFAULT_MAX_IDLE_BUFFERS, DEFAULT_READ_SIZE};

/// Configuration for the input buffer pool
#[derive(Debug, Clone, PartialEq)]
pub struct BufferPoolConfig {
    /// Capacity reserved for a freshly allocated buffer
    pub buffer_size: usize,
    /// Maximum number of idle buffers kept for reuse
    pub max_idle: usize,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_READ_SIZE,
            max_idle: DEFAULT_MAX_IDLE_BUFFERS,
        }
    }
}

impl BufferPoolConfig {
    /// Configuration with the default read size and idle cap
    pub fn new() -> Self {
        Self::default()
    }

    /// Set buffer size
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Set the idle buffer cap
    pub fn with_max_idle(mut self, count: usize) -> Self {
        self.max_idle = count;
        self
    }
}
