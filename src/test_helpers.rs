//! Shared test utilities for the ontology-site test suite.
//!
//! Provides a deployment-directory fixture builder and [`RecordingRunner`],
//! a [`CommandRunner`] that records invocations instead of executing them.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = deployment_fixture(&["a.ttl", "b.owl"], &["docs"]);
//! let runner = RecordingRunner::failing_on("chown", 1);
//!
//! // ... run publish against tmp.path() with &runner ...
//!
//! assert_eq!(runner.command_lines().len(), 2);
//! ```

use std::cell::RefCell;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::runner::{CommandOutput, CommandRunner, Invocation, RunError};

// =========================================================================
// Fixture setup
// =========================================================================

/// Temp directory with the given empty files and empty subdirectories.
pub fn deployment_fixture(files: &[&str], dirs: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for file in files {
        std::fs::write(tmp.path().join(file), format!("contents of {file}")).unwrap();
    }
    for dir in dirs {
        std::fs::create_dir(tmp.path().join(dir)).unwrap();
    }
    tmp
}

// =========================================================================
// Recording runner
// =========================================================================

/// Records every invocation and answers with success, or with a chosen exit
/// code for the first invocation whose command line contains a pattern.
#[derive(Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<Invocation>>,
    failure: Option<(String, i32)>,
    watched: Option<PathBuf>,
    presence_log: RefCell<Vec<bool>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with `code` when the command line contains `pattern`.
    pub fn failing_on(pattern: &str, code: i32) -> Self {
        Self {
            failure: Some((pattern.to_string(), code)),
            ..Self::default()
        }
    }

    /// Record whether `path` exists at the moment of each call.
    pub fn watching(mut self, path: PathBuf) -> Self {
        self.watched = Some(path);
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(Invocation::command_line).collect()
    }

    pub fn presence_log(&self) -> Vec<bool> {
        self.presence_log.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunError> {
        self.calls.borrow_mut().push(invocation.clone());
        if let Some(path) = &self.watched {
            self.presence_log.borrow_mut().push(path.exists());
        }

        let code = match &self.failure {
            Some((pattern, code)) if invocation.command_line().contains(pattern.as_str()) => *code,
            _ => 0,
        };
        Ok(CommandOutput {
            code: Some(code),
            stdout: String::new(),
            stderr: if code == 0 {
                String::new()
            } else {
                format!("{}: simulated failure", invocation.program_name())
            },
        })
    }
}
