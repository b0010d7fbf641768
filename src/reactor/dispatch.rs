//! One readiness pass and the per-role handlers

use std::{io, time::Duration};

use crate::{
    buffers::SharedBuffer,
    error::{Result, TeeError},
    input::ReadOutcome,
    listener::accept_connection,
    queue::{DrainOutcome, OverflowAction},
    registry::{Channel, EndpointRole, Identity, Readiness, WaitInterest},
};

use super::{Reactor, Termination, Turn};

/// How the rest of the current pass proceeds
enum Flow {
    Next,
    /// The registry changed shape; wait again before touching more slots
    Restart,
    Finish(Termination),
}

impl Reactor {
    /// Wait once for readiness and dispatch every ready slot.
    ///
    /// `None` blocks until something is ready. A timeout that expires with
    /// nothing ready is simply `Turn::Continue`.
    pub fn turn(&mut self, timeout: Option<Duration>) -> Result<Turn> {
        if self.shutdown.is_requested() {
            return Ok(Turn::Finished(Termination::Shutdown));
        }

        match self.registry.wait(timeout) {
            Ok(0) => return Ok(Turn::Continue),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(Turn::Continue),
            Err(e) => {
                log::error!("poll() failed, {}", e);
                return Ok(Turn::Finished(Termination::WaitFailed));
            }
        }

        let mut index = 0;
        while index < self.registry.slot_count() {
            let (identity, readiness) = match self.registry.slot(index) {
                Some(slot) => slot,
                None => break,
            };
            index += 1;

            if readiness.is_empty() {
                continue;
            }

            let role = self
                .registry
                .get(identity)
                .map(|endpoint| endpoint.role())
                .ok_or(TeeError::UntrackedEndpoint { fd: identity })?;

            let flow = match role {
                EndpointRole::Input => self.on_input(identity)?,
                EndpointRole::Listener => self.on_listener(identity)?,
                EndpointRole::Connection | EndpointRole::Fifo => self.on_sink(identity, readiness),
            };

            match flow {
                Flow::Next => {}
                Flow::Restart => break,
                Flow::Finish(termination) => return Ok(Turn::Finished(termination)),
            }
        }

        Ok(Turn::Continue)
    }

    fn on_input(&mut self, identity: Identity) -> Result<Flow> {
        let outcome = self.input.read_chunk(
            identity,
            &mut self.pool,
            self.config.read_size,
            &self.shutdown,
        )?;

        match outcome {
            ReadOutcome::Data(buffer) => self.publish(buffer),
            ReadOutcome::WouldBlock => Ok(Flow::Next),
            ReadOutcome::Shutdown => Ok(Flow::Finish(Termination::Shutdown)),
            ReadOutcome::EndOfStream if self.input.reopens_on_exhaustion() => {
                self.reopen_input(identity)?;
                Ok(Flow::Restart)
            }
            ReadOutcome::EndOfStream => {
                log::debug!("end of input on {}", self.input.name());
                Ok(Flow::Finish(Termination::EndOfInput))
            }
        }
    }

    /// Fan a fresh buffer out to every sink, then mirror it
    fn publish(&mut self, buffer: SharedBuffer) -> Result<Flow> {
        let rejections =
            self.registry
                .fan_out(&buffer, self.config.max_queue, self.config.overflow_policy);

        let mut disconnect = Vec::new();
        for rejection in rejections {
            let name = match self.registry.get(rejection.identity) {
                Some(endpoint) => endpoint.name(),
                None => continue,
            };
            match rejection.action {
                OverflowAction::Warn => log::warn!("Queue overflow for output: {}", name),
                OverflowAction::Disconnect => {
                    log::warn!("Queue overflow for output: {}, closing connection", name);
                    disconnect.push(rejection.identity);
                }
                OverflowAction::Silent => {}
            }
        }

        let flow = if disconnect.is_empty() {
            Flow::Next
        } else {
            for identity in disconnect {
                self.close_endpoint(identity);
            }
            Flow::Restart
        };

        if let Some(mirror) = self.mirror.as_mut() {
            mirror.write_all(&buffer, &self.shutdown)?;
        }

        self.pool.release(buffer);
        Ok(flow)
    }

    fn on_listener(&mut self, identity: Identity) -> Result<Flow> {
        let endpoint = self
            .registry
            .get(identity)
            .ok_or(TeeError::UntrackedEndpoint { fd: identity })?;

        let (stream, name) = match endpoint.channel() {
            Channel::Listener(listener) => (
                accept_connection(listener, endpoint.name())?,
                endpoint.name().to_string(),
            ),
            _ => return Err(TeeError::UntrackedEndpoint { fd: identity }),
        };

        log::debug!("accepted reader on {}", name);
        self.registry
            .register(Channel::Connection(stream), WaitInterest::ErrorOnly, name);
        Ok(Flow::Next)
    }

    fn on_sink(&mut self, identity: Identity, readiness: Readiness) -> Flow {
        if !readiness.is_writable() {
            self.close_endpoint(identity);
            return Flow::Restart;
        }

        let endpoint = match self.registry.get_mut(identity) {
            Some(endpoint) => endpoint,
            None => return Flow::Next,
        };

        match endpoint.drain_one() {
            DrainOutcome::Idle => {
                self.registry
                    .set_wait_interest(identity, WaitInterest::ErrorOnly);
                Flow::Next
            }
            DrainOutcome::Complete(buffer) => {
                let drained = endpoint.queue().map_or(true, |queue| queue.is_empty());
                self.pool.release(buffer);
                if drained {
                    self.registry
                        .set_wait_interest(identity, WaitInterest::ErrorOnly);
                }
                Flow::Next
            }
            DrainOutcome::Deferred => Flow::Next,
            DrainOutcome::Failed(e) => {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    log::warn!("Write to {} failed, {}. Closing.", endpoint.name(), e);
                }
                self.close_endpoint(identity);
                Flow::Restart
            }
        }
    }

    /// Deregister an endpoint, hand its queued buffers back and close it
    fn close_endpoint(&mut self, identity: Identity) {
        let mut endpoint = match self.registry.deregister(identity) {
            Some(endpoint) => endpoint,
            None => return,
        };

        if let Some(queue) = endpoint.queue_mut() {
            for buffer in queue.clear() {
                self.pool.release(buffer);
            }
        }
        log::debug!("closing {} {}", endpoint.role(), endpoint.name());
    }

    /// Close the exhausted input and open it again from the start
    fn reopen_input(&mut self, identity: Identity) -> Result<()> {
        drop(self.registry.deregister(identity));

        let handle = self.input.open()?;
        log::debug!("reopened {}", self.input.name());
        self.registry
            .register(Channel::Input(handle), WaitInterest::Readable, self.input.name());
        Ok(())
    }
}
