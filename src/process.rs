//! Child process supervision with a wall-clock bound.
//!
//! A spawned child is owned by a [`ChildGuard`]; whatever path leaves the scope
//! (timeout, interrupt, I/O error, panic) the child is killed and reaped.

use std::ffi::OsStr;
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::errors::HarnessError;
use crate::shutdown;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Output of one finished invocation.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

impl CapturedOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Why a supervised run ended without an exit status.
#[derive(Debug)]
pub enum Aborted {
    Timeout { stderr: Vec<u8> },
    Interrupted,
    Spawn(io::Error),
    Io(io::Error),
}

/// Kills and reaps the child when dropped unless it already exited.
struct ChildGuard {
    child: Child,
    finished: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            finished: false,
        }
    }

    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        let status = self.child.try_wait()?;
        if status.is_some() {
            self.finished = true;
        }
        Ok(status)
    }

    fn terminate(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
            self.finished = true;
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Render a command line for logs and error messages.
pub fn display_command(program: &OsStr, args: &[impl AsRef<OsStr>]) -> String {
    let mut line = program.to_string_lossy().into_owned();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}

fn display_of(cmd: &Command) -> String {
    let args: Vec<&OsStr> = cmd.get_args().collect();
    display_command(cmd.get_program(), &args)
}

/// Reads a pipe to EOF on its own thread into a shared buffer, so a partial
/// snapshot is available even if EOF never arrives.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<()>,
}

impl Drain {
    fn spawn<R: Read + Send + 'static>(pipe: Option<R>) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let handle = thread::spawn(move || {
            let Some(mut pipe) = pipe else { return };
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => {
                        if let Ok(mut b) = sink.lock() {
                            b.extend_from_slice(&chunk[..n]);
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        });
        Self { buf, handle }
    }

    /// Bytes read so far, without waiting for EOF.
    fn snapshot(&self) -> Vec<u8> {
        self.buf.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Wait for EOF until `deadline`, then return what was read.
    ///
    /// A grandchild that inherited the pipe can hold it open long after the
    /// direct child exited; past the deadline the reader thread is left behind
    /// and the partial buffer is returned.
    fn finish_by(self, deadline: Instant) -> Vec<u8> {
        let Drain { buf, handle } = self;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(POLL_INTERVAL);
        }
        if handle.is_finished() {
            let _ = handle.join();
        } else {
            debug!("Pipe still open after child exit; returning partial output");
        }
        buf.lock().map(|b| b.clone()).unwrap_or_default()
    }
}

/// Spawn `cmd` with piped stdout/stderr and wait at most `timeout` for it.
pub fn supervise(cmd: &mut Command, timeout: Duration) -> Result<CapturedOutput, Aborted> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(Aborted::Spawn)?;
    let stdout = Drain::spawn(child.stdout.take());
    let stderr = Drain::spawn(child.stderr.take());
    let mut guard = ChildGuard::new(child);

    let status = loop {
        match guard.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => return Err(Aborted::Io(e)),
        }
        if start.elapsed() >= timeout {
            debug!(pid = guard.child.id(), "Deadline reached; killing child");
            guard.terminate();
            // Grandchildren may still hold the pipes open; do not wait for EOF.
            return Err(Aborted::Timeout {
                stderr: stderr.snapshot(),
            });
        }
        if shutdown::is_requested() {
            guard.terminate();
            return Err(Aborted::Interrupted);
        }
        thread::sleep(POLL_INTERVAL);
    };

    // Give the readers at least one poll to hit EOF when the child exits
    // right at the deadline.
    let deadline = (start + timeout).max(Instant::now() + POLL_INTERVAL);
    Ok(CapturedOutput {
        status,
        stdout: stdout.finish_by(deadline),
        stderr: stderr.finish_by(deadline),
        elapsed: start.elapsed(),
    })
}

/// Run `cmd` under `timeout`, mapping aborts onto [`HarnessError`].
///
/// A non-zero exit status is not an error here; callers decide.
pub fn run_with_timeout(
    cmd: &mut Command,
    timeout: Duration,
) -> Result<CapturedOutput, HarnessError> {
    let command = display_of(cmd);
    supervise(cmd, timeout).map_err(|aborted| match aborted {
        Aborted::Timeout { .. } => HarnessError::RunTimeout { command, timeout },
        Aborted::Interrupted => HarnessError::Interrupted { command },
        Aborted::Spawn(source) => HarnessError::Spawn { command, source },
        Aborted::Io(source) => HarnessError::Io { command, source },
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn captures_both_streams_and_status() {
        let out = run_with_timeout(
            &mut sh("echo out; echo err >&2; exit 3"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(out.stdout_lossy(), "out\n");
        assert_eq!(out.stderr_lossy(), "err\n");
        assert_eq!(out.status.code(), Some(3));
    }

    #[test]
    fn large_output_does_not_block() {
        let out = run_with_timeout(
            &mut sh("i=0; while [ $i -lt 20000 ]; do echo 0123456789abcdef; i=$((i+1)); done"),
            Duration::from_secs(10),
        )
        .unwrap();
        assert!(out.status.success());
        assert_eq!(out.stdout.len(), 20000 * 17);
    }

    #[test]
    fn timeout_kills_child() {
        let start = Instant::now();
        let err =
            run_with_timeout(&mut sh("exec sleep 30"), Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, HarnessError::RunTimeout { .. }), "{err}");
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn background_grandchild_does_not_extend_the_bound() {
        let start = Instant::now();
        let out = run_with_timeout(&mut sh("sleep 6 & echo hi"), Duration::from_secs(1)).unwrap();
        assert!(start.elapsed() < Duration::from_secs(3), "took {:?}", start.elapsed());
        assert!(out.status.success());
        assert_eq!(out.stdout_lossy(), "hi\n");
    }

    #[test]
    fn fast_exit_still_collects_all_output() {
        let mut cmd = sh("echo done; echo warn >&2");
        let out = run_with_timeout(&mut cmd, Duration::from_secs(5)).unwrap();
        assert_eq!(out.stdout_lossy(), "done\n");
        assert_eq!(out.stderr_lossy(), "warn\n");
    }

    #[test]
    fn timeout_keeps_stderr_for_diagnostics() {
        let mut cmd = sh("echo compiling >&2; exec sleep 30");
        match supervise(&mut cmd, Duration::from_millis(500)) {
            Err(Aborted::Timeout { stderr }) => {
                assert_eq!(String::from_utf8_lossy(&stderr), "compiling\n")
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn spawn_failure_names_the_command() {
        let err = run_with_timeout(
            &mut Command::new("/definitely/not/a/program"),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, HarnessError::Spawn { .. }));
        assert!(err.to_string().contains("/definitely/not/a/program"));
    }

    #[test]
    fn display_command_joins_args() {
        let line = display_command(OsStr::new("tool"), &["--help", "sub"]);
        assert_eq!(line, "tool --help sub");
    }
}
