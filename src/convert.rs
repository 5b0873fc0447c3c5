//! Ontology conversion.
//!
//! Runs the conversion script inside the provisioned environment. The script
//! turns every `<source_dir>/**/*.<basis>` into `.ttl`, `.jsonld`, `.owl` and
//! `.html` files in the deployment directory, which `publish` then ships:
//!
//! ```text
//! provision   <root>/venv
//! convert     ../src/**/*.ttl  →  <root>/venv/bin/python <script>  →  ../deployment/
//! publish     ../deployment/   →  /var/www/<site>/
//! ```
//!
//! Everything the script needs is checked before it starts: the venv's
//! interpreter, the script itself, the source tree, and at least one source
//! file. A missing piece aborts with exit code 1 and nothing is run.

use crate::config::ConvertConfig;
use crate::output;
use crate::provision::{VENV_PYTHON, Venv};
use crate::runner::{self, CommandRunner, Invocation, RunError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Virtual environment not found at {0}; run `ontology-site provision` first")]
    MissingVenv(PathBuf),
    #[error("Conversion script not found: {0}")]
    MissingScript(PathBuf),
    #[error("Ontology source directory not found: {0}")]
    MissingSource(PathBuf),
    #[error("No source files matching *.{basis} under {dir}")]
    NoSources { basis: String, dir: PathBuf },
    #[error("Cannot read source directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Command(#[from] RunError),
}

impl ConvertError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::Command(e) => e.exit_code(),
            _ => 1,
        }
    }
}

/// Inputs of one conversion run, with every path resolved against `--root`.
#[derive(Debug, Clone)]
pub struct ConvertJob<'a> {
    pub venv: &'a Venv,
    pub script: PathBuf,
    pub source_dir: PathBuf,
    pub deployment_dir: PathBuf,
    /// Normalized extension, no leading dot.
    pub basis: String,
    pub template: Option<PathBuf>,
}

impl<'a> ConvertJob<'a> {
    pub fn new(
        config: &ConvertConfig,
        root: &Path,
        deployment_dir: PathBuf,
        venv: &'a Venv,
    ) -> Self {
        Self {
            venv,
            script: root.join(&config.script),
            source_dir: root.join(&config.source_dir),
            deployment_dir,
            basis: config.extension(),
            template: config.template.as_ref().map(|t| root.join(t)),
        }
    }

    /// `<venv>/bin/python <script> --source-dir … --deployment-dir … --basis …`
    pub fn invocation(&self) -> Invocation {
        let mut inv = self
            .venv
            .activated(VENV_PYTHON)
            .arg(&self.script)
            .arg("--source-dir")
            .arg(&self.source_dir)
            .arg("--deployment-dir")
            .arg(&self.deployment_dir)
            .arg("--basis")
            .arg(&self.basis);
        if let Some(template) = &self.template {
            inv = inv.arg("--template").arg(template);
        }
        inv
    }
}

/// What a successful run converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertReport {
    /// Source files relative to the source directory, sorted.
    pub sources: Vec<PathBuf>,
    pub deployment_dir: PathBuf,
}

pub fn convert(
    job: &ConvertJob,
    runner: &dyn CommandRunner,
) -> Result<ConvertReport, ConvertError> {
    if !job.venv.python().is_file() {
        return Err(ConvertError::MissingVenv(job.venv.dir.clone()));
    }
    if !job.script.is_file() {
        return Err(ConvertError::MissingScript(job.script.clone()));
    }
    if !job.source_dir.is_dir() {
        return Err(ConvertError::MissingSource(job.source_dir.clone()));
    }

    let sources = find_sources(&job.source_dir, &job.basis)?;
    if sources.is_empty() {
        return Err(ConvertError::NoSources {
            basis: job.basis.clone(),
            dir: job.source_dir.clone(),
        });
    }

    output::print_stage(&format!(
        "Converting {} ontologies from {} using basis '.{}'",
        sources.len(),
        job.source_dir.display(),
        job.basis
    ));
    output::print_sources(&sources);

    runner::run_checked(runner, &job.invocation())?;

    output::print_stage(&format!(
        "Artefacts written to {}",
        job.deployment_dir.display()
    ));
    Ok(ConvertReport {
        sources,
        deployment_dir: job.deployment_dir.clone(),
    })
}

/// Every file under `dir` whose extension is exactly `basis`, relative to
/// `dir` and sorted by path.
pub fn find_sources(dir: &Path, basis: &str) -> Result<Vec<PathBuf>, ConvertError> {
    let mut sources = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().is_some_and(|ext| ext == basis) {
            let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
            sources.push(relative.to_path_buf());
        }
    }
    sources.sort();
    Ok(sources)
}
