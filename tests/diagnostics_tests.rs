//! Diagnostics emitted by the reactor
//! Warnings are captured through a `log::Log` implementation and checked per thread

use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    os::{
        fd::OwnedFd,
        unix::{fs::OpenOptionsExt, net::UnixStream},
    },
    sync::{Mutex, Once},
    thread::{self, ThreadId},
    time::Duration,
};

use log::{Level, LevelFilter, Log, Metadata, Record};
use nbtee::{Channel, EndpointRole, InputHandle, Reactor, ShutdownFlag, TeeConfig};
use nix::{sys::stat::Mode, unistd::mkfifo};
use tempfile::TempDir;

const TICK: Option<Duration> = Some(Duration::from_millis(50));

/// Records every log line together with the thread that emitted it
struct CapturingLogger {
    records: Mutex<Vec<(ThreadId, Level, String)>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let line = (thread::current().id(), record.level(), record.args().to_string());
        self.records.lock().unwrap().push(line);
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};
static INSTALL: Once = Once::new();

fn capture_logs() {
    INSTALL.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Debug);
    });
}

/// Warnings logged so far by the calling test's thread
fn warnings_from_this_thread() -> Vec<String> {
    let me = thread::current().id();
    LOGGER
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(thread, level, _)| *thread == me && *level <= Level::Warn)
        .map(|(_, _, line)| line.clone())
        .collect()
}

fn socket_fed(config: TeeConfig) -> (Reactor, UnixStream) {
    let (feed, input) = UnixStream::pair().unwrap();
    input.set_nonblocking(true).unwrap();
    let handle = InputHandle::Owned(File::from(OwnedFd::from(input)));
    let reactor = Reactor::with_input(config, handle, ShutdownFlag::new()).unwrap();
    (reactor, feed)
}

/// A connected reader whose socket buffer is already full
fn stalled_connection() -> (UnixStream, UnixStream) {
    let (mut ours, peer) = UnixStream::pair().unwrap();
    ours.set_nonblocking(true).unwrap();
    loop {
        match ours.write(&[b'.'; 4096]) {
            Ok(_) => continue,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) => panic!("filling reader failed: {}", e),
        }
    }
    (ours, peer)
}

#[cfg(test)]
mod diagnostics_tests {
    use super::*;

    /// Test: Three rejected reads on one reader produce a single overflow warning
    #[test]
    fn overflow_is_reported_once_per_reader() {
        capture_logs();
        let config = TeeConfig::new().with_mirror_stdout(false).with_max_queue(16);
        let (mut reactor, mut feed) = socket_fed(config);
        let (ours, _peer) = stalled_connection();
        let sink = reactor
            .attach_sink(Channel::Connection(ours), "stalled reader")
            .unwrap();

        for fill in [b'a', b'b', b'c', b'd'] {
            feed.write_all(&[fill; 10]).unwrap();
            reactor.turn(TICK).unwrap();
        }

        let queue = reactor.endpoint(sink).unwrap().queue().unwrap();
        assert_eq!(queue.stats().buffers_dropped, 3);
        assert_eq!(
            warnings_from_this_thread(),
            vec!["Queue overflow for output: stalled reader".to_string()]
        );
    }

    /// Test: A FIFO whose reader went away is closed without any warning
    #[test]
    fn fifo_reader_leaving_is_silent() {
        capture_logs();
        let temp_dir = TempDir::new().unwrap();
        let fifo = temp_dir.path().join("pipe");
        mkfifo(&fifo, Mode::S_IRUSR | Mode::S_IWUSR).unwrap();

        let reader = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&fifo)
            .unwrap();

        let config = TeeConfig::new().with_mirror_stdout(false).with_target(&fifo);
        let (mut reactor, mut feed) = socket_fed(config);
        assert_eq!(reactor.endpoints_with_role(EndpointRole::Fifo).len(), 1);

        drop(reader);
        feed.write_all(b"x").unwrap();
        for _ in 0..5 {
            reactor.turn(TICK).unwrap();
        }

        assert!(reactor.endpoints_with_role(EndpointRole::Fifo).is_empty());
        assert!(warnings_from_this_thread().is_empty());
    }

    /// Test: A write failure other than a broken pipe is reported once and closes the sink
    #[test]
    fn hard_write_failure_is_reported() {
        capture_logs();
        let (mut reactor, mut feed) = socket_fed(TeeConfig::new().with_mirror_stdout(false));
        let full = OpenOptions::new().write(true).open("/dev/full").unwrap();
        let sink = reactor.attach_sink(Channel::Fifo(full), "/dev/full").unwrap();

        feed.write_all(b"no room").unwrap();
        for _ in 0..5 {
            reactor.turn(TICK).unwrap();
        }

        assert!(!reactor.registry().contains(sink));
        let warnings = warnings_from_this_thread();
        assert_eq!(warnings.len(), 1, "{:?}", warnings);
        assert!(warnings[0].starts_with("Write to /dev/full failed"));
        assert!(warnings[0].ends_with("Closing."));
    }
}
