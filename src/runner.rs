//! External command execution.
//!
//! Every command delegates its real work to collaborators (`python -m venv`,
//! `pip`, the conversion script, `rsync`, `chown`). Each call is described by
//! an [`Invocation`] and handed to a [`CommandRunner`], so tests can swap in a
//! recording fake while the binary uses [`SystemRunner`].
//!
//! Execution is blocking: a call returns only after the child has exited.

use crate::config::SudoMode;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Exit code reported when a collaborator cannot be started at all.
pub const SPAWN_FAILURE_CODE: i32 = 127;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Failed to execute `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Command `{program}` failed with exit code {code}")]
    Failed { program: String, code: i32 },
}

impl RunError {
    /// Exit code this failure should propagate as.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Spawn { .. } => SPAWN_FAILURE_CODE,
            RunError::Failed { code, .. } => *code,
        }
    }
}

/// One collaborator call: program, arguments, and the context it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    /// Extra variables set for this child only.
    pub env: Vec<(OsString, OsString)>,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Wrap in `sudo` when elevation is enabled.
    ///
    /// `sudo` runs the original program with the original arguments; the
    /// extra environment and working directory stay on the outer invocation.
    pub fn elevated(self, mode: SudoMode) -> Self {
        if !mode.is_enabled() {
            return self;
        }
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: OsString::from("sudo"),
            args,
            cwd: self.cwd,
            env: self.env,
        }
    }

    /// Program name for messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Program and arguments as one line, for command tracing.
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the child was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes collaborators. One operation: run to completion.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunError>;
}

/// Trace, run, and turn a non-zero exit into [`RunError::Failed`].
///
/// The collaborator's stdout is echoed to the operator and its stderr is
/// forwarded untouched, successful or not.
pub fn run_checked(
    runner: &dyn CommandRunner,
    invocation: &Invocation,
) -> Result<CommandOutput, RunError> {
    crate::output::print_trace(invocation);
    let output = runner.run(invocation)?;
    crate::output::print_collaborator_output(&output);
    if output.success() {
        Ok(output)
    } else {
        Err(RunError::Failed {
            program: invocation.program_name(),
            // Signal-terminated children have no code; report plain failure.
            code: output.code.unwrap_or(1),
        })
    }
}

/// Runs invocations as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunError> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(dir) = &invocation.cwd {
            command.current_dir(dir);
        }
        for (key, value) in &invocation.env {
            command.env(key, value);
        }

        let output = command.output().map_err(|source| RunError::Spawn {
            program: invocation.program_name(),
            source,
        })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Look a program up on `PATH`. Paths containing a separator are checked as-is.
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

/// Directory holding a virtual environment's executables.
pub fn venv_bin_dir(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts")
    } else {
        venv.join("bin")
    }
}
