//! Termination requests
//!
//! Signals only raise an atomic flag. The reactor checks it at the top of
//! every iteration and the read and mirror retry loops check it before each
//! retry, so an in-flight system call is never pre-empted.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::error::{Result, TeeError};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn request_shutdown(_signal: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Cancellation flag shared by the reactor and its blocking retry sites
#[derive(Debug, Clone)]
pub struct ShutdownFlag {
    local: Option<Arc<AtomicBool>>,
}

impl ShutdownFlag {
    /// A private flag, not connected to any signal
    pub fn new() -> Self {
        Self {
            local: Some(Arc::new(AtomicBool::new(false))),
        }
    }

    /// The process-wide flag raised by the installed signal handlers
    pub fn process() -> Self {
        Self { local: None }
    }

    fn cell(&self) -> &AtomicBool {
        self.local.as_deref().unwrap_or(&SHUTDOWN_REQUESTED)
    }

    /// Whether termination was requested
    pub fn is_requested(&self) -> bool {
        self.cell().load(Ordering::SeqCst)
    }

    /// Request termination
    pub fn request(&self) {
        self.cell().store(true, Ordering::SeqCst);
    }
}

/// Route SIGINT, SIGHUP and SIGTERM to the process flag and ignore SIGPIPE.
///
/// Broken pipes then surface as `EPIPE` write errors on the affected sink.
pub fn install_handlers() -> Result<ShutdownFlag> {
    let shutdown = SigAction::new(
        SigHandler::Handler(request_shutdown),
        SaFlags::empty(),
        SigSet::empty(),
    );
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());

    for signal in [Signal::SIGINT, Signal::SIGHUP, Signal::SIGTERM] {
        // SAFETY: the handler only stores to an atomic, which is async-signal-safe
        unsafe { sigaction(signal, &shutdown) }
            .map_err(|errno| TeeError::from_io(errno.into(), "sigaction failed"))?;
    }
    // SAFETY: SIG_IGN installs no code
    unsafe { sigaction(Signal::SIGPIPE, &ignore) }
        .map_err(|errno| TeeError::from_io(errno.into(), "sigaction(SIGPIPE) failed"))?;

    Ok(ShutdownFlag::process())
}
