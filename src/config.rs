//! Runtime configuration for the tee

use std::path::PathBuf;

use crate::{
    error::{Result, TeeError},
    input::InputSpec,
    queue::OverflowPolicy,
};

/// Default per-sink queue budget in bytes
pub const DEFAULT_MAX_QUEUE: usize = 64 * 1024;
/// Size of a single read from the input
pub const DEFAULT_READ_SIZE: usize = 4096;
/// Idle buffers the pool keeps around for reuse
pub const DEFAULT_MAX_IDLE_BUFFERS: usize = 64;

/// Configuration resolved from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct TeeConfig {
    /// Copy everything read to standard output as well
    pub mirror_stdout: bool,
    /// Unlink stale sockets at target paths before binding
    pub unlink_before: bool,
    /// Unlink bound sockets and FIFOs on exit
    pub unlink_after: bool,
    /// Maximum unsent bytes queued per sink
    pub max_queue: usize,
    /// What to do with a sink that exceeds `max_queue`
    pub overflow_policy: OverflowPolicy,
    /// Where the data comes from
    pub input: InputSpec,
    /// Socket paths and FIFOs to copy to
    pub targets: Vec<PathBuf>,
    /// Bytes requested per input read
    pub read_size: usize,
    /// Upper bound on idle buffers held by the pool
    pub max_idle_buffers: usize,
}

impl Default for TeeConfig {
    fn default() -> Self {
        Self {
            mirror_stdout: true,
            unlink_before: false,
            unlink_after: false,
            max_queue: DEFAULT_MAX_QUEUE,
            overflow_policy: OverflowPolicy::Drop,
            input: InputSpec::Stdin,
            targets: Vec::new(),
            read_size: DEFAULT_READ_SIZE,
            max_idle_buffers: DEFAULT_MAX_IDLE_BUFFERS,
        }
    }
}

impl TeeConfig {
    /// Configuration with every default applied
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy input to standard output as well
    pub fn with_mirror_stdout(mut self, mirror: bool) -> Self {
        self.mirror_stdout = mirror;
        self
    }

    /// Unlink stale sockets at target paths before binding
    pub fn with_unlink_before(mut self, unlink: bool) -> Self {
        self.unlink_before = unlink;
        self
    }

    /// Unlink owned sockets and FIFOs on exit
    pub fn with_unlink_after(mut self, unlink: bool) -> Self {
        self.unlink_after = unlink;
        self
    }

    /// Set the per-sink queue budget in bytes
    pub fn with_max_queue(mut self, bytes: usize) -> Self {
        self.max_queue = bytes;
        self
    }

    /// Drop or disconnect on overflow
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Set where the data comes from
    pub fn with_input(mut self, input: InputSpec) -> Self {
        self.input = input;
        self
    }

    /// Add a socket path or FIFO to copy to
    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.targets.push(target.into());
        self
    }

    /// Bytes requested per input read
    pub fn with_read_size(mut self, bytes: usize) -> Self {
        self.read_size = bytes;
        self
    }

    /// Cap on idle buffers kept by the pool
    pub fn with_max_idle_buffers(mut self, count: usize) -> Self {
        self.max_idle_buffers = count;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_queue == 0 {
            return Err(TeeError::invalid_parameter(
                "max_queue",
                "Queue budget must be greater than zero",
            ));
        }

        if self.read_size == 0 {
            return Err(TeeError::invalid_parameter(
                "read_size",
                "Read size must be greater than zero",
            ));
        }

        Ok(())
    }
}

/// Parse a byte count with an optional `k`, `M` or `G` suffix.
///
/// Digits follow C `strtoul` base 0 conventions: `0x`-prefixed hex, a
/// leading `0` for octal, decimal otherwise. Suffixes multiply by 1024,
/// 1024² and 1024³ respectively.
pub fn parse_size(text: &str) -> Result<usize> {
    let text = text.trim();
    let (digits, radix) = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None if text.len() > 1 && text.starts_with('0') => (text, 8),
        None => (text, 10),
    };

    let split = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    let (number, suffix) = digits.split_at(split);

    if number.is_empty() {
        return Err(TeeError::invalid_parameter(
            "max-queue",
            format!("Invalid max queue length: '{}'", text),
        ));
    }

    let value = usize::from_str_radix(number, radix).map_err(|e| {
        TeeError::invalid_parameter("max-queue", format!("Invalid max queue length: '{}': {}", text, e))
    })?;

    let shift = match suffix {
        "" => 0,
        "k" => 10,
        "M" => 20,
        "G" => 30,
        _ => {
            return Err(TeeError::invalid_parameter(
                "max-queue",
                format!("Invalid max queue length: '{}'", text),
            ))
        }
    };

    value
        .checked_mul(1usize << shift)
        .ok_or_else(|| TeeError::invalid_parameter("max-queue", format!("'{}' is too large", text)))
}
