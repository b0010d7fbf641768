//! Command line behaviour of the nbtee binary
//! Exit codes, STDOUT mirroring and path cleanup

use std::{
    fs::File,
    path::Path,
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use nix::{
    sys::signal::{kill, Signal},
    unistd::Pid,
};
use tempfile::TempDir;

fn nbtee() -> Command {
    Command::new(env!("CARGO_BIN_EXE_nbtee"))
}

fn wait_for_path(path: &Path) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !path.exists() {
        assert!(Instant::now() < deadline, "{} never appeared", path.display());
        thread::sleep(Duration::from_millis(10));
    }
}

fn wait_with_deadline(child: &mut Child) -> ExitStatus {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        if Instant::now() >= deadline {
            child.kill().unwrap();
            panic!("nbtee did not exit after the signal");
        }
        thread::sleep(Duration::from_millis(10));
    }
}

/// Start nbtee listening on `socket` with STDIN held open, signal it once the
/// socket is bound and return its exit status.
fn signal_while_idle(socket: &Path, signal: Signal) -> ExitStatus {
    let mut child = nbtee()
        .args(["-n", "-u"])
        .arg(socket)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .unwrap();
    let stdin = child.stdin.take();

    wait_for_path(socket);
    kill(Pid::from_raw(child.id() as i32), signal).unwrap();

    let status = wait_with_deadline(&mut child);
    drop(stdin);
    status
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    /// Test: Input from STDIN is mirrored to STDOUT byte for byte
    #[test]
    fn cli_mirrors_stdin_to_stdout() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input");
        let data: Vec<u8> = (0..20_000u32).map(|i| (i % 256) as u8).collect();
        std::fs::write(&input, &data).unwrap();

        let output = nbtee()
            .stdin(Stdio::from(File::open(&input).unwrap()))
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(0));
        assert_eq!(output.stdout, data);
    }

    /// Test: --no-stdout keeps STDOUT empty
    #[test]
    fn cli_no_stdout_suppresses_mirror() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input");
        std::fs::write(&input, b"quiet please").unwrap();

        let output = nbtee()
            .arg("-n")
            .arg("-i")
            .arg(&input)
            .stdin(Stdio::null())
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(0));
        assert!(output.stdout.is_empty());
    }

    /// Test: Bound sockets are removed on exit with --unlink-after
    #[test]
    fn cli_unlink_after_removes_socket() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input");
        std::fs::write(&input, b"data").unwrap();
        let socket = temp_dir.path().join("out.sock");

        let status = nbtee()
            .args(["-n", "-u", "-i"])
            .arg(&input)
            .arg(&socket)
            .status()
            .unwrap();

        assert_eq!(status.code(), Some(0));
        assert!(!socket.exists());
    }

    /// Test: Without --unlink-after the socket path is left behind
    #[test]
    fn cli_socket_survives_without_unlink_after() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input");
        std::fs::write(&input, b"data").unwrap();
        let socket = temp_dir.path().join("out.sock");

        let status = nbtee()
            .args(["-n", "-i"])
            .arg(&input)
            .arg(&socket)
            .status()
            .unwrap();

        assert_eq!(status.code(), Some(0));
        assert!(socket.exists());
    }

    /// Test: A malformed queue size is rejected with exit code 1
    #[test]
    fn cli_bad_max_queue_fails() {
        let output = nbtee()
            .args(["-m", "12q"])
            .stdin(Stdio::null())
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("max-queue"));
    }

    /// Test: A missing input file is a fatal I/O error
    #[test]
    fn cli_missing_input_fails() {
        let temp_dir = TempDir::new().unwrap();
        let output = nbtee()
            .arg("-i")
            .arg(temp_dir.path().join("missing"))
            .stdin(Stdio::null())
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
    }

    /// Test: An over-long socket path is a fatal I/O error
    #[test]
    fn cli_overlong_socket_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let socket = temp_dir.path().join("x".repeat(200));

        let status = nbtee()
            .arg("-n")
            .arg(&socket)
            .stdin(Stdio::null())
            .status()
            .unwrap();

        assert_eq!(status.code(), Some(1));
    }

    /// Test: --version exits cleanly
    #[test]
    fn cli_version() {
        let output = nbtee().arg("--version").output().unwrap();
        assert_eq!(output.status.code(), Some(0));
        assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
    }

    /// Test: SIGTERM ends the run with exit code 0 and unlinks the socket
    #[test]
    fn cli_sigterm_exits_cleanly() {
        let temp_dir = TempDir::new().unwrap();
        let socket = temp_dir.path().join("term.sock");

        let status = signal_while_idle(&socket, Signal::SIGTERM);

        assert_eq!(status.code(), Some(0));
        assert!(!socket.exists());
    }

    /// Test: SIGINT behaves like SIGTERM
    #[test]
    fn cli_sigint_exits_cleanly() {
        let temp_dir = TempDir::new().unwrap();
        let socket = temp_dir.path().join("int.sock");

        let status = signal_while_idle(&socket, Signal::SIGINT);

        assert_eq!(status.code(), Some(0));
        assert!(!socket.exists());
    }
}
