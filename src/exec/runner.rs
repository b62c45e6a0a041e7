// src/exec/runner.rs

//! Bounded process runner.
//!
//! [`run_bounded`] runs one external command to completion or to its
//! deadline and classifies the result:
//!
//! - exit code 0 (and no fatal signature seen) → `Ok(Captured)`
//! - non-zero exit, or killed by the watchdog → [`ProcessError::Failure`]
//! - deadline elapsed → [`ProcessError::Timeout`], after the process group
//!   has been killed and the child reaped
//! - could not start → [`ProcessError::Spawn`]
//!
//! Both output pipes are drained on their own Tokio tasks while the caller
//! waits for exit, so a child writing a lot to one stream can never block
//! on a full pipe while we read the other.
//!
//! On Unix the child is placed in its own process group, and termination
//! kills the whole group: shell commands (`sh -c ...`) and JVM launchers
//! would otherwise leave their own children running after the parent dies.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::command::CommandSpec;
use super::error::{decode_diagnostic, error_excerpt, ProcessError, ProcessFailure};
use super::outcome::{Captured, RunOptions, Stdout};
use super::watchdog::{monitor_stderr, FatalSignal};

/// How long to wait for the output readers once the child is gone.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Run `spec` with a hard deadline, capturing stdout and stderr.
///
/// The call only returns once the child has been reaped or killed; no path
/// leaves the process running. See the module docs for the classification.
pub async fn run_bounded(spec: &CommandSpec, options: &RunOptions) -> Result<Captured, ProcessError> {
    let command = spec.display();
    if options.timeout.is_zero() {
        return Err(ProcessError::InvalidTimeout { command });
    }

    let mut cmd = spec.to_command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    debug!(
        cmd = %command,
        cwd = ?spec.working_dir(),
        timeout_secs = options.timeout.as_secs_f64(),
        watchdog = !options.fatal_signatures.is_empty(),
        "spawning process"
    );

    let started = Instant::now();
    let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        command: command.clone(),
        source,
    })?;
    let mut guard = ChildGuard::new(child);

    let signal = Arc::new(FatalSignal::new());
    let drains = Drains::start(&mut guard.child, options, &signal, &command);

    let watching = !options.fatal_signatures.is_empty();
    let ended = tokio::select! {
        status = guard.wait() => Ended::Exited(status),
        _ = signal.wait(), if watching => Ended::Fatal,
        _ = tokio::time::sleep(options.timeout) => Ended::Deadline,
    };

    match ended {
        Ended::Deadline => {
            guard.terminate(&command).await;
            drains.abort();
            warn!(
                cmd = %command,
                timeout_secs = options.timeout.as_secs_f64(),
                "process exceeded its deadline and was killed"
            );
            Err(ProcessError::Timeout {
                command,
                timeout: options.timeout,
            })
        }
        Ended::Fatal => {
            guard.terminate(&command).await;
            let (stdout, stderr) = drains.finish(guard.pid, &command).await?;
            Err(failure(command, None, stdout, stderr, signal.signature()))
        }
        Ended::Exited(status) => {
            let status = status.map_err(|source| ProcessError::Io {
                command: command.clone(),
                source,
            })?;
            let (stdout, stderr) = drains.finish(guard.pid, &command).await?;
            let elapsed = started.elapsed();

            debug!(
                cmd = %command,
                exit_code = ?status.code(),
                elapsed_ms = elapsed.as_millis() as u64,
                "process exited"
            );

            // A tripped watchdog wins over the exit code: the process may
            // have exited 0 between the match and our kill.
            if signal.is_tripped() || !status.success() {
                return Err(failure(
                    command,
                    status.code(),
                    stdout,
                    stderr,
                    signal.signature(),
                ));
            }

            Ok(Captured {
                stdout: Stdout::from_bytes(stdout, options.output),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
                elapsed,
            })
        }
    }
}

enum Ended {
    Exited(io::Result<ExitStatus>),
    Fatal,
    Deadline,
}

fn failure(
    command: String,
    exit_code: Option<i32>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    fatal_signature: Option<&str>,
) -> ProcessError {
    let excerpt = error_excerpt(&decode_diagnostic(&stderr));
    let stderr = String::from_utf8_lossy(&stderr).into_owned();
    ProcessError::Failure(Box::new(ProcessFailure {
        command,
        exit_code,
        excerpt,
        stderr,
        stdout,
        fatal_signature: fatal_signature.map(str::to_string),
    }))
}

/// Owns the child for the duration of one run.
///
/// If the guard is dropped before the child has been reaped (an early `?`,
/// a panic, or the caller dropping the future), the process group is killed
/// and Tokio reaps the child in the background.
struct ChildGuard {
    child: Child,
    pid: Option<u32>,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        let pid = child.id();
        Self {
            child,
            pid,
            reaped: false,
        }
    }

    async fn wait(&mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait().await?;
        self.reaped = true;
        Ok(status)
    }

    /// Kill the process group and reap the child.
    async fn terminate(&mut self, command: &str) {
        kill_process_group(self.pid);
        match self.child.kill().await {
            Ok(()) => self.reaped = true,
            Err(e) => warn!(cmd = %command, error = %e, "failed to kill child process"),
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            kill_process_group(self.pid);
            let _ = self.child.start_kill();
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pgid) = pid.and_then(|p| i32::try_from(p).ok()) else {
        return;
    };
    // ESRCH just means every member is already gone.
    if let Err(e) = killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        debug!(pgid, error = %e, "killpg");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

type DrainHandle = JoinHandle<io::Result<Vec<u8>>>;

/// Background readers for both output pipes.
struct Drains {
    stdout: DrainHandle,
    stderr: DrainHandle,
}

impl Drains {
    fn start(child: &mut Child, options: &RunOptions, signal: &Arc<FatalSignal>, command: &str) -> Self {
        let stdout = child.stdout.take();
        let stdout = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut out) = stdout {
                out.read_to_end(&mut buf).await?;
            }
            Ok(buf)
        });

        let stderr = child.stderr.take();
        let signatures = options.fatal_signatures.clone();
        let signal = Arc::clone(signal);
        let command = command.to_string();
        let stderr = tokio::spawn(async move {
            match stderr {
                Some(err) => monitor_stderr(err, &signatures, &signal, &command).await,
                None => Ok(Vec::new()),
            }
        });

        Self { stdout, stderr }
    }

    fn abort(self) {
        self.stdout.abort();
        self.stderr.abort();
    }

    /// Collect both streams after the child is gone.
    ///
    /// Grandchildren that inherited the pipes can keep them open past the
    /// child's exit; if the readers have not finished within the grace
    /// period, the process group is killed and the readers get one more
    /// grace period before the run is reported as an I/O failure.
    async fn finish(mut self, pgid: Option<u32>, command: &str) -> Result<(Vec<u8>, Vec<u8>), ProcessError> {
        let mut out = None;
        let mut err = None;

        for attempt in 0..2 {
            if out.is_none() {
                out = timeout(DRAIN_GRACE, &mut self.stdout).await.ok();
            }
            if err.is_none() {
                err = timeout(DRAIN_GRACE, &mut self.stderr).await.ok();
            }
            if out.is_some() && err.is_some() {
                break;
            }
            if attempt == 0 {
                warn!(cmd = %command, "output pipes still open after exit; killing process group");
                kill_process_group(pgid);
            }
        }

        let (Some(out), Some(err)) = (out, err) else {
            self.abort();
            return Err(ProcessError::Io {
                command: command.to_string(),
                source: io::Error::new(io::ErrorKind::TimedOut, "output pipes never closed"),
            });
        };

        let flatten = |joined: Result<io::Result<Vec<u8>>, tokio::task::JoinError>| {
            joined
                .map_err(io::Error::other)
                .and_then(|r| r)
                .map_err(|source| ProcessError::Io {
                    command: command.to_string(),
                    source,
                })
        };
        Ok((flatten(out)?, flatten(err)?))
    }
}
