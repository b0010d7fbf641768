//! Dense readiness-wait table keyed by descriptor

use std::{
    fmt, io,
    os::fd::{AsRawFd, RawFd},
    time::Duration,
};

use crate::{
    buffers::SharedBuffer,
    queue::{Admission, OverflowAction, OverflowPolicy},
};

use super::{
    channel::Channel,
    endpoint::Endpoint,
    interest::{Readiness, WaitInterest},
};

/// Stable identity of an endpoint: its descriptor number
pub type Identity = RawFd;

/// A sink that rejected a buffer during fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    pub identity: Identity,
    pub action: OverflowAction,
}

/// Endpoint table plus the `pollfd` array handed to the readiness wait.
///
/// Endpoints are addressed by identity. Slots are kept dense: removing one
/// moves the last slot into the hole and patches the moved endpoint's
/// recorded slot index, so every live endpoint owns exactly one slot and
/// `slots[e.slot].fd == e.identity()` always holds.
pub struct Registry {
    slots: Vec<libc::pollfd>,
    endpoints: Vec<Option<Endpoint>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            endpoints: Vec::new(),
        }
    }

    /// Register an endpoint under its descriptor.
    ///
    /// A descriptor that is already registered is logged and ignored.
    pub fn register(
        &mut self,
        channel: Channel,
        interest: WaitInterest,
        name: impl Into<String>,
    ) -> bool {
        let identity = channel.as_raw_fd();
        let index = match usize::try_from(identity) {
            Ok(index) => index,
            Err(_) => {
                log::warn!("Attempt to add invalid fd to poll array, ignoring: fd: {}", identity);
                return false;
            }
        };

        if self.contains(identity) {
            log::warn!(
                "Attempt to add duplicate fd to poll array detected, ignoring: fd: {}",
                identity
            );
            return false;
        }

        if self.endpoints.len() <= index {
            self.endpoints.resize_with(index + 1, || None);
        }

        let slot = self.slots.len();
        self.slots.push(libc::pollfd {
            fd: identity,
            events: interest.flags().bits(),
            revents: 0,
        });
        self.endpoints[index] = Some(Endpoint::new(channel, name.into(), slot));
        true
    }

    /// Remove an endpoint and hand it back; dropping it closes the descriptor.
    pub fn deregister(&mut self, identity: Identity) -> Option<Endpoint> {
        let endpoint = match self.entry_mut(identity).and_then(Option::take) {
            Some(endpoint) => endpoint,
            None => {
                log::warn!(
                    "Attempt to remove non-existent fd from poll array detected, ignoring: fd: {}",
                    identity
                );
                return None;
            }
        };

        let slot = endpoint.slot;
        self.slots.swap_remove(slot);
        if let Some(moved) = self.slots.get(slot).map(|pfd| pfd.fd) {
            if let Some(moved) = self.get_mut(moved) {
                moved.slot = slot;
            }
        }

        Some(endpoint)
    }

    /// Change what an endpoint's slot waits for
    pub fn set_wait_interest(&mut self, identity: Identity, interest: WaitInterest) {
        let slot = match self.get(identity) {
            Some(endpoint) => endpoint.slot,
            None => return,
        };
        self.slots[slot].events = interest.flags().bits();
    }

    /// Current wait interest of an endpoint
    pub fn wait_interest(&self, identity: Identity) -> Option<WaitInterest> {
        self.get(identity)
            .map(|endpoint| WaitInterest::from_events(self.slots[endpoint.slot].events))
    }

    /// Block until at least one slot is ready or the timeout expires.
    ///
    /// `None` waits indefinitely. Returns the number of ready slots.
    pub fn wait(&mut self, timeout: Option<Duration>) -> io::Result<usize> {
        let timeout_ms = match timeout {
            Some(timeout) => timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int,
            None => -1,
        };

        // SAFETY: `slots` is a live, correctly sized array of pollfd structs;
        // every descriptor in it is owned by an endpoint in `endpoints`.
        let ready = unsafe {
            libc::poll(
                self.slots.as_mut_ptr(),
                self.slots.len() as libc::nfds_t,
                timeout_ms,
            )
        };

        if ready < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(ready as usize)
    }

    /// Identity and reported readiness of the slot at `index`
    pub fn slot(&self, index: usize) -> Option<(Identity, Readiness)> {
        self.slots
            .get(index)
            .map(|pfd| (pfd.fd, Readiness::from_revents(pfd.revents)))
    }

    /// Number of wait slots
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether `identity` is registered
    pub fn contains(&self, identity: Identity) -> bool {
        self.get(identity).is_some()
    }

    /// Endpoint registered under `identity`
    pub fn get(&self, identity: Identity) -> Option<&Endpoint> {
        let index = usize::try_from(identity).ok()?;
        self.endpoints.get(index)?.as_ref()
    }

    /// Mutable endpoint registered under `identity`
    pub fn get_mut(&mut self, identity: Identity) -> Option<&mut Endpoint> {
        self.entry_mut(identity)?.as_mut()
    }

    fn entry_mut(&mut self, identity: Identity) -> Option<&mut Option<Endpoint>> {
        let index = usize::try_from(identity).ok()?;
        self.endpoints.get_mut(index)
    }

    /// Live endpoints in identity order
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter().flatten()
    }

    /// Number of registered endpoints
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Offer `buffer` to every sink in identity order.
    ///
    /// Sinks that take it switch to writable interest. Rejections are
    /// returned for the caller to report or act on; nothing is removed here.
    pub fn fan_out(
        &mut self,
        buffer: &SharedBuffer,
        max_queue: usize,
        policy: OverflowPolicy,
    ) -> Vec<Rejection> {
        let mut rejections = Vec::new();

        for endpoint in self.endpoints.iter_mut().flatten() {
            let queue = match endpoint.queue_mut() {
                Some(queue) => queue,
                None => continue,
            };

            match queue.offer(buffer, max_queue, policy) {
                Admission::Queued => {
                    self.slots[endpoint.slot].events = WaitInterest::Writable.flags().bits();
                }
                Admission::Rejected(action) => rejections.push(Rejection {
                    identity: endpoint.identity(),
                    action,
                }),
            }
        }

        rejections
    }

    /// Check the slot/endpoint cross references
    pub fn is_consistent(&self) -> bool {
        let live = self.endpoints().count();
        live == self.slots.len()
            && self.endpoints().all(|endpoint| {
                self.slots
                    .get(endpoint.slot)
                    .map_or(false, |pfd| pfd.fd == endpoint.identity())
            })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("slots", &self.slots.iter().map(|pfd| pfd.fd).collect::<Vec<_>>())
            .field("endpoints", &self.endpoints().collect::<Vec<_>>())
            .finish()
    }
}
