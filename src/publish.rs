//! Site publishing.
//!
//! Regenerates the deployment directory's index page and mirrors the
//! directory to the web root:
//!
//! ```text
//! 1. check     <source> exists                    (missing → abort, nothing written)
//! 2. scan      top-level files and directories
//! 3. render    <source>/index.html                (overwritten)
//! 4. mirror    [sudo] rsync -av --delete <source>/ <target_root>/<site>/
//! 5. chown     [sudo] chown -R <user>:<group> <target_root>/<site>/
//! ```
//!
//! Steps 4 and 5 are traced before they run. The first failing collaborator
//! ends the run with its own exit code.

use crate::config::PublishConfig;
use crate::generate::{self, GenerateError};
use crate::output;
use crate::runner::{self, CommandRunner, Invocation, RunError};
use crate::scan::{self, Listing, ScanError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Deployment directory not found: {0}")]
    MissingSource(PathBuf),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Generate error: {0}")]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Command(#[from] RunError),
}

impl PublishError {
    pub fn exit_code(&self) -> i32 {
        match self {
            PublishError::Command(e) => e.exit_code(),
            _ => 1,
        }
    }
}

/// Inputs of one publish run, resolved from config and the command line.
#[derive(Debug, Clone)]
pub struct PublishJob<'a> {
    pub config: &'a PublishConfig,
    pub source: PathBuf,
    /// Render the page and trace the commands without running them.
    pub dry_run: bool,
}

impl PublishJob<'_> {
    /// `<target_root>/<site>/`, always with the trailing separator.
    pub fn destination(&self) -> OsString {
        with_trailing_slash(&self.config.target_root.join(&self.config.site))
    }

    /// Mirror copy of every entry in the source into the destination.
    pub fn mirror_invocation(&self) -> Invocation {
        Invocation::new(&self.config.rsync_bin)
            .args(["-av", "--delete"])
            .arg(with_trailing_slash(&self.source))
            .arg(self.destination())
            .elevated(self.config.use_sudo)
    }

    /// Recursive ownership change on the destination.
    pub fn chown_invocation(&self) -> Invocation {
        let owner = format!("{}:{}", self.config.web_user, self.config.web_group);
        Invocation::new(&self.config.chown_bin)
            .arg("-R")
            .arg(owner)
            .arg(self.destination())
            .elevated(self.config.use_sudo)
    }
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub listing: Listing,
    pub index: PathBuf,
    pub destination: OsString,
    /// `false` for dry runs.
    pub synced: bool,
}

/// Scan and render only. Shared by `publish` and `render`.
pub fn render(source: &Path) -> Result<(Listing, PathBuf), PublishError> {
    if !source.is_dir() {
        return Err(PublishError::MissingSource(source.to_path_buf()));
    }

    output::print_stage(&format!("Scanning {}", source.display()));
    let listing = scan::scan(source)?;
    output::print_listing(&listing);

    let index = generate::write_index(source, &listing)?;
    output::print_stage(&format!("Wrote {}", index.display()));
    Ok((listing, index))
}

pub fn publish(
    job: &PublishJob,
    runner: &dyn CommandRunner,
) -> Result<PublishReport, PublishError> {
    let (listing, index) = render(&job.source)?;
    let destination = job.destination();

    let mirror = job.mirror_invocation();
    let chown = job.chown_invocation();

    if job.dry_run {
        output::print_stage("Dry run, not executing:");
        output::print_trace(&mirror);
        output::print_trace(&chown);
        return Ok(PublishReport {
            listing,
            index,
            destination,
            synced: false,
        });
    }

    output::print_stage(&format!(
        "Syncing to {}",
        Path::new(&destination).display()
    ));
    runner::run_checked(runner, &mirror)?;
    runner::run_checked(runner, &chown)?;

    output::print_stage("Publish complete");
    Ok(PublishReport {
        listing,
        index,
        destination,
        synced: true,
    })
}

fn with_trailing_slash(path: &Path) -> OsString {
    let mut s = path.as_os_str().to_owned();
    if !s.to_string_lossy().ends_with(['/', std::path::MAIN_SEPARATOR]) {
        s.push("/");
    }
    s
}
