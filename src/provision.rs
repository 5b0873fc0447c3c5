//! Python environment provisioning.
//!
//! Builds the interpreter environment the ontology conversion scripts run in:
//!
//! ```text
//! 1. locate    python3.12 on PATH            (missing → abort, nothing run)
//! 2. create    python3.12 -m venv <root>/venv (skipped if the venv exists)
//! 3. upgrade   pip install --upgrade pip
//! 4. install   pip install rdflib jinja2 pyshacl owlrl
//! ```
//!
//! "Activating" the environment means running steps 3 and 4 with the venv's
//! own `pip`, `VIRTUAL_ENV` set and the venv's `bin/` first on `PATH`. Only
//! those child processes see it. The inherited `PATH` is captured once by the
//! caller and carried in [`Venv`].
//!
//! Any failing step aborts the run; nothing is retried or rolled back.

use crate::config::ProvisionConfig;
use crate::output;
use crate::runner::{self, CommandRunner, Invocation, RunError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory name of the environment under the tool root.
pub const VENV_DIR: &str = "venv";

/// File name of the environment's own interpreter.
pub const VENV_PYTHON: &str = if cfg!(windows) { "python.exe" } else { "python" };

/// Packages installed into the environment, in install order.
pub const PACKAGES: [&str; 4] = ["rdflib", "jinja2", "pyshacl", "owlrl"];

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Python interpreter '{0}' not found on PATH")]
    InterpreterNotFound(String),
    #[error(transparent)]
    Command(#[from] RunError),
}

impl ProvisionError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::InterpreterNotFound(_) => 1,
            ProvisionError::Command(e) => e.exit_code(),
        }
    }
}

/// A virtual environment under the tool root, plus the `PATH` its
/// activated children extend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Venv {
    pub dir: PathBuf,
    inherited_path: Option<OsString>,
}

impl Venv {
    /// `<root>/venv`. `inherited_path` is the caller's `PATH`, if any.
    pub fn at(root: &Path, inherited_path: Option<OsString>) -> Self {
        Self {
            dir: root.join(VENV_DIR),
            inherited_path,
        }
    }

    pub fn bin_dir(&self) -> PathBuf {
        runner::venv_bin_dir(&self.dir)
    }

    /// The environment's own interpreter.
    pub fn python(&self) -> PathBuf {
        self.bin_dir().join(VENV_PYTHON)
    }

    /// Invocation of a venv executable with the environment activated.
    pub fn activated(&self, program: &str) -> Invocation {
        Invocation::new(self.bin_dir().join(program))
            .env("VIRTUAL_ENV", &self.dir)
            .env("PATH", self.search_path())
    }

    fn search_path(&self) -> OsString {
        let bin = self.bin_dir();
        let mut paths = vec![bin.clone()];
        if let Some(current) = &self.inherited_path {
            paths.extend(std::env::split_paths(current));
        }
        // Only fails if `bin` itself contains the separator; fall back to it alone
        std::env::join_paths(paths).unwrap_or_else(|_| bin.into_os_string())
    }
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub venv: PathBuf,
    /// `false` when an existing environment was reused.
    pub created: bool,
}

/// Create or reuse `venv` and install [`PACKAGES`] into it.
///
/// `locate` resolves the interpreter name to a path; production passes
/// [`runner::find_on_path`].
pub fn provision(
    config: &ProvisionConfig,
    env: &Venv,
    runner: &dyn CommandRunner,
    locate: &dyn Fn(&str) -> Option<PathBuf>,
) -> Result<ProvisionReport, ProvisionError> {
    let python = locate(&config.python_bin)
        .ok_or_else(|| ProvisionError::InterpreterNotFound(config.python_bin.clone()))?;
    output::print_stage(&format!("Using interpreter {}", python.display()));

    let venv = env.dir.clone();
    // A plain file of that name is not an environment; `-m venv` reports the clash
    let created = if venv.is_dir() {
        output::print_stage(&format!(
            "Reusing virtual environment at {}",
            venv.display()
        ));
        false
    } else {
        output::print_stage(&format!(
            "Creating virtual environment at {}",
            venv.display()
        ));
        runner::run_checked(runner, &create_venv(&python, &venv))?;
        true
    };

    output::print_stage("Upgrading pip");
    runner::run_checked(runner, &upgrade_pip(env))?;

    output::print_stage(&format!("Installing {}", PACKAGES.join(" ")));
    runner::run_checked(runner, &install_packages(env))?;

    output::print_activation_hint(&venv);
    Ok(ProvisionReport { venv, created })
}

// ============================================================================
// Invocations
// ============================================================================

fn create_venv(python: &Path, venv: &Path) -> Invocation {
    Invocation::new(python).args(["-m", "venv"]).arg(venv)
}

fn upgrade_pip(env: &Venv) -> Invocation {
    env.activated("pip").args(["install", "--upgrade", "pip"])
}

fn install_packages(env: &Venv) -> Invocation {
    env.activated("pip").arg("install").args(PACKAGES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn config() -> ProvisionConfig {
        ProvisionConfig::default()
    }

    fn venv_in(tmp: &TempDir) -> Venv {
        Venv::at(tmp.path(), None)
    }

    fn found(name: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/usr/bin").join(name))
    }

    fn missing(_: &str) -> Option<PathBuf> {
        None
    }

    #[test]
    fn missing_interpreter_aborts_before_any_command() {
        let tmp = TempDir::new().unwrap();
        let runner = RecordingRunner::new();

        let err = provision(&config(), &venv_in(&tmp), &runner, &missing).unwrap_err();

        assert!(matches!(err, ProvisionError::InterpreterNotFound(ref n) if n == "python3.12"));
        assert_eq!(err.exit_code(), 1);
        assert!(runner.calls().is_empty());
        assert!(!tmp.path().join("venv").exists());
    }

    #[test]
    fn creates_venv_then_upgrades_and_installs() {
        let tmp = TempDir::new().unwrap();
        let runner = RecordingRunner::new();

        let report = provision(&config(), &venv_in(&tmp), &runner, &found).unwrap();

        assert!(report.created);
        assert_eq!(report.venv, tmp.path().join("venv"));

        let venv = tmp.path().join("venv");
        let bin = runner::venv_bin_dir(&venv);
        let lines = runner.command_lines();
        assert_eq!(
            lines,
            vec![
                format!("/usr/bin/python3.12 -m venv {}", venv.display()),
                format!("{} install --upgrade pip", bin.join("pip").display()),
                format!(
                    "{} install rdflib jinja2 pyshacl owlrl",
                    bin.join("pip").display()
                ),
            ]
        );
    }

    #[test]
    fn existing_venv_is_reused() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("venv")).unwrap();
        let runner = RecordingRunner::new();

        let report = provision(&config(), &venv_in(&tmp), &runner, &found).unwrap();

        assert!(!report.created);
        let lines = runner.command_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| !l.contains("-m venv")));
    }

    #[test]
    fn file_named_venv_is_not_reused() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("venv"), "").unwrap();
        let runner = RecordingRunner::new();

        let report = provision(&config(), &venv_in(&tmp), &runner, &found).unwrap();

        assert!(report.created);
        assert!(runner.command_lines()[0].contains("-m venv"));
    }

    #[test]
    fn pip_runs_with_environment_activated() {
        let tmp = TempDir::new().unwrap();
        let runner = RecordingRunner::new();
        provision(&config(), &venv_in(&tmp), &runner, &found).unwrap();

        let venv = tmp.path().join("venv");
        for call in &runner.calls()[1..] {
            let virtual_env = call
                .env
                .iter()
                .find(|(k, _)| k == "VIRTUAL_ENV")
                .map(|(_, v)| PathBuf::from(v));
            assert_eq!(virtual_env, Some(venv.clone()));

            let path = call.env.iter().find(|(k, _)| k == "PATH").unwrap();
            let first = std::env::split_paths(&path.1).next().unwrap();
            assert_eq!(first, runner::venv_bin_dir(&venv));
        }
    }

    #[test]
    fn activated_path_extends_the_given_path_only() {
        let tmp = TempDir::new().unwrap();
        let inherited = std::env::join_paths(["/opt/tools", "/usr/bin"]).unwrap();
        let env = Venv::at(tmp.path(), Some(inherited));

        let inv = env.activated("pip");
        let path = &inv.env.iter().find(|(k, _)| k == "PATH").unwrap().1;
        let entries: Vec<PathBuf> = std::env::split_paths(path).collect();
        assert_eq!(
            entries,
            vec![env.bin_dir(), PathBuf::from("/opt/tools"), PathBuf::from("/usr/bin")]
        );
    }

    #[test]
    fn activated_without_inherited_path_is_bin_only() {
        let tmp = TempDir::new().unwrap();
        let env = venv_in(&tmp);

        let inv = env.activated("python");
        let path = &inv.env.iter().find(|(k, _)| k == "PATH").unwrap().1;
        assert_eq!(PathBuf::from(path), env.bin_dir());
    }

    #[test]
    fn custom_interpreter_name_is_looked_up() {
        let tmp = TempDir::new().unwrap();
        let runner = RecordingRunner::new();
        let config = ProvisionConfig {
            python_bin: "python3.11".into(),
        };
        let looked_up = std::cell::RefCell::new(Vec::new());
        let locate = |name: &str| {
            looked_up.borrow_mut().push(name.to_string());
            found(name)
        };

        provision(&config, &venv_in(&tmp), &runner, &locate).unwrap();

        assert_eq!(*looked_up.borrow(), vec!["python3.11"]);
        assert!(runner.command_lines()[0].starts_with("/usr/bin/python3.11 -m venv"));
    }

    #[test]
    fn venv_creation_failure_stops_the_run() {
        let tmp = TempDir::new().unwrap();
        let runner = RecordingRunner::failing_on("-m venv", 2);

        let err = provision(&config(), &venv_in(&tmp), &runner, &found).unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn install_failure_propagates_exit_code() {
        let tmp = TempDir::new().unwrap();
        let runner = RecordingRunner::failing_on("rdflib", 1);

        let err = provision(&config(), &venv_in(&tmp), &runner, &found).unwrap_err();

        assert!(matches!(err, ProvisionError::Command(RunError::Failed { code: 1, .. })));
        assert_eq!(runner.calls().len(), 3);
    }
}
