use crate::config::GitConfig;
use crate::error::{ExecutionFailure, GitError, GitResult};
use crate::security::validator;
use parking_lot::Mutex;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const DEFAULT_BINARY: &str = "git";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_MAX_OUTPUT: usize = 64 * 1024 * 1024;
const POLL_INTERVAL: Duration = Duration::from_millis(10);
const READ_CHUNK: usize = 8 * 1024;
// Minimum wait for the reader to see EOF once the process has exited
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Result of executing a git command
///
/// `output` is stdout and stderr as one stream, exactly as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub output: String,
    pub exit_code: i32,
}

/// Runs the external tool. The seam where tests substitute canned output.
pub trait CommandRunner: Send + Sync {
    fn run(&self, working_dir: &Path, args: &[&str]) -> GitResult<CommandOutput>;
}

/// Spawns one real process per call
#[derive(Debug, Clone)]
pub struct GitExecutor {
    binary: String,
    timeout: Option<Duration>,
    max_output_bytes: usize,
}

impl GitExecutor {
    pub fn new() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            max_output_bytes: DEFAULT_MAX_OUTPUT,
        }
    }

    pub fn from_config(config: &GitConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            timeout: config.timeout(),
            max_output_bytes: config.max_output_bytes,
        }
    }

    pub fn with_binary<S: Into<String>>(mut self, binary: S) -> Self {
        self.binary = binary.into();
        self
    }

    /// `None` waits forever
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_output_limit(mut self, max_output_bytes: usize) -> Self {
        self.max_output_bytes = max_output_bytes;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn spawn(&self, working_dir: &Path, args: &[&str]) -> io::Result<(Child, io::PipeReader)> {
        // Both streams share one pipe so the capture keeps git's own interleaving
        let (reader, writer) = io::pipe()?;
        let writer_err = writer.try_clone()?;

        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .current_dir(working_dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(writer_err);

        let child = command.spawn();
        // The command owns our copies of the write end; reads only see EOF once they are gone
        drop(command);

        Ok((child?, reader))
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, ExecutionFailure> {
        let Some(timeout) = self.timeout else {
            return child.wait().map_err(ExecutionFailure::Io);
        };

        let started = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if started.elapsed() >= timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ExecutionFailure::TimedOut(timeout));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(ExecutionFailure::Io(e)),
            }
        }
    }
}

impl Default for GitExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for GitExecutor {
    fn run(&self, working_dir: &Path, args: &[&str]) -> GitResult<CommandOutput> {
        validator::require_working_dir(working_dir)?;

        let command = args.join(" ");
        let failed = |reason: ExecutionFailure, output: String| GitError::Execution {
            command: command.clone(),
            reason,
            output,
        };

        let (mut child, reader) = self
            .spawn(working_dir, args)
            .map_err(|e| failed(ExecutionFailure::Spawn(e), String::new()))?;

        let capture = Capture::new(self.max_output_bytes);
        let (drained_tx, drained_rx) = mpsc::channel();
        {
            let capture = capture.clone();
            thread::spawn(move || {
                let _ = drained_tx.send(capture.drain(reader));
            });
        }

        let started = Instant::now();
        let status = match self.wait(&mut child) {
            Ok(status) => status,
            Err(reason) => return Err(failed(reason, capture.snapshot())),
        };

        // A grandchild may still hold the pipe open after git exits, so the
        // reader only gets what is left of the timeout
        let drained = match self.timeout {
            Some(timeout) => {
                let budget = timeout.saturating_sub(started.elapsed()).max(DRAIN_GRACE);
                match drained_rx.recv_timeout(budget) {
                    Ok(result) => Some(result),
                    Err(RecvTimeoutError::Timeout) => {
                        return Err(failed(ExecutionFailure::TimedOut(timeout), capture.snapshot()));
                    }
                    Err(RecvTimeoutError::Disconnected) => None,
                }
            }
            None => drained_rx.recv().ok(),
        };

        if let Some(Err(e)) = drained {
            return Err(failed(ExecutionFailure::Io(e), capture.snapshot()));
        }

        let output = capture.snapshot();
        if capture.overflowed() {
            return Err(failed(ExecutionFailure::OutputLimit(self.max_output_bytes), output));
        }

        match status.code() {
            Some(0) => Ok(CommandOutput {
                output,
                exit_code: 0,
            }),
            Some(code) => Err(failed(ExecutionFailure::ExitCode(code), output)),
            None => Err(failed(ExecutionFailure::Terminated, output)),
        }
    }
}

/// Bounded buffer shared between the reader thread and the waiting caller
#[derive(Clone)]
struct Capture {
    inner: Arc<Mutex<CaptureState>>,
    limit: usize,
}

#[derive(Default)]
struct CaptureState {
    bytes: Vec<u8>,
    overflowed: bool,
}

impl Capture {
    fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CaptureState::default())),
            limit,
        }
    }

    /// Read to EOF. Bytes past the limit are discarded but still consumed,
    /// so the child never blocks on a full pipe.
    fn drain<R: Read>(&self, mut reader: R) -> io::Result<()> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = match reader.read(&mut chunk) {
                Ok(0) => return Ok(()),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            let mut state = self.inner.lock();
            let room = self.limit.saturating_sub(state.bytes.len());
            if n > room {
                state.overflowed = true;
            }
            state.bytes.extend_from_slice(&chunk[..n.min(room)]);
        }
    }

    fn snapshot(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().bytes).to_string()
    }

    fn overflowed(&self) -> bool {
        self.inner.lock().overflowed
    }
}
