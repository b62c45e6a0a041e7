// src/exec/command.rs

//! Immutable description of an external command.
//!
//! A [`CommandSpec`] is built once with the consuming builder methods and
//! then only borrowed by the runner. It can be either:
//!
//! - a shell string, run through `sh -c` (or `cmd /C` on Windows), or
//! - a program plus a discrete argument list (no shell involved).

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::process::Command;

/// How the command line is expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Program {
    /// A single shell-interpretable string.
    Shell(String),
    /// Executable plus ordered arguments.
    Argv { program: OsString, args: Vec<OsString> },
}

/// An external command: program/args, working directory and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: Program,
    cwd: Option<PathBuf>,
    env: BTreeMap<OsString, OsString>,
}

impl CommandSpec {
    /// A command interpreted by the platform shell.
    pub fn shell(line: impl Into<String>) -> Self {
        Self {
            program: Program::Shell(line.into()),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    /// A program invoked directly with an argument list.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: Program::Argv {
                program: program.into(),
                args: Vec::new(),
            },
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    /// Append one argument. Ignored for shell commands.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        if let Program::Argv { ref mut args, .. } = self.program {
            args.push(arg.into());
        }
        self
    }

    /// Append several arguments. Ignored for shell commands.
    pub fn args<I, S>(mut self, more: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        if let Program::Argv { ref mut args, .. } = self.program {
            args.extend(more.into_iter().map(Into::into));
        }
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn envs(&self) -> impl Iterator<Item = (&OsString, &OsString)> {
        self.env.iter()
    }

    /// Human-readable command line for logs and errors.
    ///
    /// Argument lists are joined with spaces without any quoting, so the
    /// result is for locating the invocation, not for pasting into a shell.
    pub fn display(&self) -> String {
        match &self.program {
            Program::Shell(line) => line.clone(),
            Program::Argv { program, args } => {
                let mut out = String::from("(quoting skipped) ");
                out.push_str(&program.to_string_lossy());
                for arg in args {
                    out.push(' ');
                    out.push_str(&arg.to_string_lossy());
                }
                out
            }
        }
    }

    /// Build the Tokio command. Stdio wiring is left to the runner.
    pub(crate) fn to_command(&self) -> Command {
        let mut cmd = match &self.program {
            Program::Shell(line) => {
                if cfg!(windows) {
                    let mut c = Command::new("cmd");
                    c.arg("/C").arg(line);
                    c
                } else {
                    let mut c = Command::new("sh");
                    c.arg("-c").arg(line);
                    c
                }
            }
            Program::Argv { program, args } => {
                let mut c = Command::new(program);
                c.args(args);
                c
            }
        };

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd.envs(self.env.iter());
        cmd
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}
