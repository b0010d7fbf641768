//! The readiness loop
//!
//! A [`Reactor`] owns every piece of runtime state: the registry of
//! endpoints, the buffer pool, the input source and the optional standard
//! output mirror. Each [`Reactor::turn`] performs one readiness wait and
//! dispatches the ready slots in slot order:
//!
//! ```text
//!   input readable ──► read one buffer ──► fan out to every sink queue
//!                                     └──► mirror to stdout (blocking)
//!   listener readable ──► accept one connection ──► new sink
//!   sink writable ──► write the head of its queue
//!   sink error ──► close
//! ```
//!
//! Anything that removes or re-adds an endpoint ends the pass early; the
//! next turn starts from a fresh wait.

mod dispatch;
pub mod mirror;
mod setup;

pub use mirror::Mirror;

use crate::{
    buffers::{BufferPool, BufferPoolStats},
    config::TeeConfig,
    error::{Result, EXIT_OK},
    input::InputSource,
    listener::OwnedPaths,
    registry::{Endpoint, EndpointRole, Identity, Registry},
    signals::ShutdownFlag,
};

/// Why the reactor stopped without a fatal error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The input ended and is not reopened
    EndOfInput,
    /// A termination signal was received
    Shutdown,
    /// The readiness wait itself failed
    WaitFailed,
}

impl Termination {
    /// Process exit status for this termination
    pub fn exit_code(self) -> i32 {
        EXIT_OK
    }
}

/// Result of a single readiness pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Continue,
    Finished(Termination),
}

/// Single-threaded event loop copying the input to every sink
#[derive(Debug)]
pub struct Reactor {
    config: TeeConfig,
    registry: Registry,
    pool: BufferPool,
    input: InputSource,
    mirror: Option<Mirror>,
    owned_paths: OwnedPaths,
    shutdown: ShutdownFlag,
}

impl Reactor {
    /// Configuration the reactor was built with
    pub fn config(&self) -> &TeeConfig {
        &self.config
    }

    /// Registered endpoints and their wait slots
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Buffer pool counters
    pub fn pool_stats(&self) -> &BufferPoolStats {
        self.pool.stats()
    }

    /// Paths to unlink on exit
    pub fn owned_paths(&self) -> &OwnedPaths {
        &self.owned_paths
    }

    /// Look up a registered endpoint
    pub fn endpoint(&self, identity: Identity) -> Option<&Endpoint> {
        self.registry.get(identity)
    }

    /// Identities of the live sinks
    pub fn sinks(&self) -> Vec<Identity> {
        self.registry
            .endpoints()
            .filter(|endpoint| endpoint.role().is_sink())
            .map(Endpoint::identity)
            .collect()
    }

    /// Identities of endpoints with the given role
    pub fn endpoints_with_role(&self, role: EndpointRole) -> Vec<Identity> {
        self.registry
            .endpoints()
            .filter(|endpoint| endpoint.role() == role)
            .map(Endpoint::identity)
            .collect()
    }

    /// Run until the input ends, a termination request arrives or a fatal
    /// error occurs.
    pub fn run(&mut self) -> Result<Termination> {
        loop {
            if let Turn::Finished(termination) = self.turn(None)? {
                log::debug!("{}", self.pool.stats().summary());
                return Ok(termination);
            }
        }
    }

    /// Unlink owned socket and FIFO paths if configured to
    pub fn cleanup(&mut self) {
        self.owned_paths.cleanup();
    }
}
