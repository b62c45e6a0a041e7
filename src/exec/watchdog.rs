// src/exec/watchdog.rs

//! Early-fatal-signal watchdog.
//!
//! Some wrapped tools log an unrecoverable exception from a worker thread
//! and then hang forever instead of exiting. The watchdog reads the error
//! stream line by line while the process runs; the first line containing
//! one of the configured signatures trips a [`FatalSignal`], which the
//! runner observes to kill the process long before the deadline.
//!
//! Once tripped, the signal stays tripped: a process that exits with code 0
//! after being killed this way is still reported as a failure.

use std::sync::OnceLock;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::Notify;
use tracing::warn;

/// Set-at-most-once flag shared between the stderr monitor and the waiter.
#[derive(Debug, Default)]
pub struct FatalSignal {
    tripped: OnceLock<String>,
    notify: Notify,
}

impl FatalSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the matching signature and wake the waiter.
    ///
    /// Returns `false` if the signal had already been tripped; the first
    /// signature wins.
    pub fn trip(&self, signature: &str) -> bool {
        if self.tripped.set(signature.to_string()).is_ok() {
            // notify_one stores a permit, so a waiter that has not polled
            // yet still wakes up.
            self.notify.notify_one();
            true
        } else {
            false
        }
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.get().is_some()
    }

    /// The signature that tripped the signal, if any.
    pub fn signature(&self) -> Option<&str> {
        self.tripped.get().map(String::as_str)
    }

    /// Resolve once the signal has been tripped.
    pub async fn wait(&self) {
        if self.is_tripped() {
            return;
        }
        self.notify.notified().await;
    }
}

/// First signature contained in `line`, if any.
pub fn match_signature<'a>(line: &str, signatures: &'a [String]) -> Option<&'a str> {
    signatures
        .iter()
        .find(|sig| !sig.is_empty() && line.contains(sig.as_str()))
        .map(String::as_str)
}

/// Consume an error stream, returning every byte read.
///
/// With a non-empty signature list each line is checked as it arrives; on
/// the first match the signal is tripped and reading stops. The stream is
/// otherwise read to EOF so the child never blocks on a full pipe.
pub(crate) async fn monitor_stderr<R>(
    stream: R,
    signatures: &[String],
    signal: &FatalSignal,
    command: &str,
) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut captured = Vec::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        captured.extend_from_slice(&line);

        if signatures.is_empty() {
            continue;
        }
        let text = String::from_utf8_lossy(&line);
        if let Some(signature) = match_signature(&text, signatures) {
            warn!(
                cmd = %command,
                signature,
                "fatal signature in stderr; process will be terminated"
            );
            signal.trip(signature);
            break;
        }
    }

    Ok(captured)
}
