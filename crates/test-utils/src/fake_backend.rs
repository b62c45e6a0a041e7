use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mergebench::exec::{
    error_excerpt, Captured, CommandSpec, OutputMode, ProcessBackend, ProcessError,
    ProcessFailure, RunFuture, RunOptions, Stdout,
};

#[derive(Debug, Clone)]
enum Kind {
    Success,
    Exit(i32),
    Timeout,
    SpawnFailure,
}

/// Scripted result of one fake run.
#[derive(Debug, Clone)]
pub struct FakeResponse {
    kind: Kind,
    stdout: Vec<u8>,
    stderr: String,
    writes: Vec<(PathBuf, String)>,
}

impl FakeResponse {
    fn with_kind(kind: Kind) -> Self {
        Self {
            kind,
            stdout: Vec::new(),
            stderr: String::new(),
            writes: Vec::new(),
        }
    }

    pub fn success() -> Self {
        Self::with_kind(Kind::Success)
    }

    pub fn exit(code: i32) -> Self {
        Self::with_kind(Kind::Exit(code))
    }

    pub fn timeout() -> Self {
        Self::with_kind(Kind::Timeout)
    }

    pub fn spawn_failure() -> Self {
        Self::with_kind(Kind::SpawnFailure)
    }

    pub fn stdout(mut self, out: &str) -> Self {
        self.stdout = out.as_bytes().to_vec();
        self
    }

    pub fn stderr(mut self, err: &str) -> Self {
        self.stderr = err.to_string();
        self
    }

    /// Simulate the tool writing `contents` to `path` before it "exits".
    pub fn writes(mut self, path: impl Into<PathBuf>, contents: &str) -> Self {
        self.writes.push((path.into(), contents.to_string()));
        self
    }

    fn apply(&self, spec: &CommandSpec, options: &RunOptions) -> Result<Captured, ProcessError> {
        for (path, contents) in &self.writes {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create fake output dir");
            }
            fs::write(path, contents).expect("write fake output");
        }

        let command = spec.display();
        match self.kind {
            Kind::Success => Ok(Captured {
                stdout: match options.output {
                    OutputMode::Bytes => Stdout::Bytes(self.stdout.clone()),
                    OutputMode::Text => Stdout::Text(String::from_utf8_lossy(&self.stdout).into_owned()),
                },
                stderr: self.stderr.clone(),
                elapsed: Duration::from_millis(1),
            }),
            Kind::Exit(code) => Err(ProcessError::Failure(Box::new(ProcessFailure {
                command,
                exit_code: Some(code),
                excerpt: error_excerpt(&self.stderr),
                stderr: self.stderr.clone(),
                stdout: self.stdout.clone(),
                fatal_signature: None,
            }))),
            Kind::Timeout => Err(ProcessError::Timeout {
                command,
                timeout: options.timeout,
            }),
            Kind::SpawnFailure => Err(ProcessError::Spawn {
                command,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "fake: not found"),
            }),
        }
    }
}

/// One call the harness made.
#[derive(Debug, Clone)]
pub struct RecordedRun {
    pub spec: CommandSpec,
    pub options: RunOptions,
}

impl RecordedRun {
    pub fn command(&self) -> String {
        self.spec.display()
    }
}

/// A process backend that:
/// - records every command it is asked to run
/// - answers with the first response whose needle occurs in the command
///   line, or with the fallback (success, no output).
///
/// Clones share the recorded calls.
#[derive(Debug, Clone)]
pub struct FakeProcessBackend {
    rules: Vec<(String, FakeResponse)>,
    fallback: FakeResponse,
    calls: Arc<Mutex<Vec<RecordedRun>>>,
}

impl FakeProcessBackend {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: FakeResponse::success(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn respond_to(mut self, needle: &str, response: FakeResponse) -> Self {
        self.rules.push((needle.to_string(), response));
        self
    }

    pub fn otherwise(mut self, response: FakeResponse) -> Self {
        self.fallback = response;
        self
    }

    pub fn calls(&self) -> Vec<RecordedRun> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().iter().map(RecordedRun::command).collect()
    }
}

impl Default for FakeProcessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessBackend for FakeProcessBackend {
    fn run<'a>(&'a self, spec: &'a CommandSpec, options: &'a RunOptions) -> RunFuture<'a> {
        self.calls.lock().unwrap().push(RecordedRun {
            spec: spec.clone(),
            options: options.clone(),
        });

        let line = spec.display();
        let response = self
            .rules
            .iter()
            .find(|(needle, _)| line.contains(needle.as_str()))
            .map(|(_, r)| r)
            .unwrap_or(&self.fallback);
        let result = response.apply(spec, options);

        Box::pin(async move { result })
    }
}
