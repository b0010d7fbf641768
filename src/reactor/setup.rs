//! Building a reactor from its configuration

use std::os::fd::AsRawFd;

use crate::{
    buffers::{BufferPool, BufferPoolConfig},
    config::TeeConfig,
    error::Result,
    input::InputSource,
    listener::{bind_listener, open_fifo, probe_target, OwnedPaths, Target},
    registry::{Channel, Identity, InputHandle, Registry, WaitInterest},
    signals::ShutdownFlag,
};

use super::{Mirror, Reactor};

impl Reactor {
    /// Open the configured input, attach every target and get ready to run
    pub fn new(config: TeeConfig, shutdown: ShutdownFlag) -> Result<Self> {
        config.validate()?;
        let handle = InputSource::new(config.input.clone()).open()?;
        Self::with_input(config, handle, shutdown)
    }

    /// Like [`Reactor::new`] but reading from an already opened input.
    ///
    /// The configured `InputSpec` still decides the name and whether end of
    /// input reopens it.
    pub fn with_input(config: TeeConfig, handle: InputHandle, shutdown: ShutdownFlag) -> Result<Self> {
        config.validate()?;

        let input = InputSource::new(config.input.clone());
        let pool = BufferPool::new(
            BufferPoolConfig::new()
                .with_buffer_size(config.read_size)
                .with_max_idle(config.max_idle_buffers),
        );
        let mirror = config.mirror_stdout.then(Mirror::stdout);

        let mut reactor = Self {
            owned_paths: OwnedPaths::new(config.unlink_after),
            registry: Registry::new(),
            config,
            pool,
            input,
            mirror,
            shutdown,
        };

        let name = reactor.input.name();
        reactor
            .registry
            .register(Channel::Input(handle), WaitInterest::Readable, name);

        if let Err(e) = reactor.attach_targets() {
            reactor.cleanup();
            return Err(e);
        }

        Ok(reactor)
    }

    fn attach_targets(&mut self) -> Result<()> {
        let targets = self.config.targets.clone();

        for target in targets.iter().map(|path| probe_target(path)) {
            let path = target.path();
            let name = path.display().to_string();

            match &target {
                Target::Fifo(_) => {
                    if let Some(file) = open_fifo(path) {
                        self.registry
                            .register(Channel::Fifo(file), WaitInterest::ErrorOnly, name);
                        self.owned_paths.record(path);
                    }
                }
                Target::Socket(_) => {
                    if let Some(listener) = bind_listener(path, self.config.unlink_before)? {
                        self.owned_paths.record(path);
                        self.registry
                            .register(Channel::Listener(listener), WaitInterest::Readable, name);
                    }
                }
            }
        }

        Ok(())
    }

    /// Register an already connected sink (a socket peer or FIFO writer).
    ///
    /// Returns the sink's identity, or `None` if the channel is not a sink
    /// or its descriptor is already registered.
    pub fn attach_sink(&mut self, channel: Channel, name: impl Into<String>) -> Option<Identity> {
        if !channel.role().is_sink() {
            log::warn!("Refusing to attach a {} endpoint as a sink", channel.role());
            return None;
        }

        let identity = channel.as_raw_fd();
        self.registry
            .register(channel, WaitInterest::ErrorOnly, name)
            .then_some(identity)
    }
}
