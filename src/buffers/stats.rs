//! Buffer pool statistics tracking

/// Statistics for buffer pool monitoring
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferPoolStats {
    /// Buffers allocated because no idle one was available
    pub fresh_allocations: u64,
    /// Total number of `acquire` calls
    pub acquisitions: u64,
    /// Buffers returned to the idle list
    pub recycled: u64,
    /// Releases that found the buffer still held by a sink
    pub still_shared: u64,
    /// Uniquely held buffers dropped because the idle list was full
    pub discarded: u64,
    /// Largest idle list length observed
    pub peak_idle: usize,
}

impl BufferPoolStats {
    /// Create new statistics instance
    pub fn new() -> Self {
        Default::default()
    }

    /// Fraction of acquisitions served from the idle list (0.0 to 1.0)
    pub fn reuse_rate(&self) -> f64 {
        if self.acquisitions == 0 {
            return 0.0;
        }
        1.0 - (self.fresh_allocations as f64 / self.acquisitions as f64)
    }

    /// Get a summary string of the statistics
    pub fn summary(&self) -> String {
        format!(
            "BufferPoolStats {{ acquisitions: {}, fresh: {}, recycled: {}, \
             still_shared: {}, discarded: {}, peak_idle: {}, reuse_rate: {:.2}% }}",
            self.acquisitions,
            self.fresh_allocations,
            self.recycled,
            self.still_shared,
            self.discarded,
            self.peak_idle,
            self.reuse_rate() * 100.0
        )
    }
}
