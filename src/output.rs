//! Operator-facing output.
//!
//! Progress and status lines are human-readable, not machine-parseable:
//!
//! ```text
//! ==> Converting 1 ontologies from ../src using basis '.ttl'
//!     - hashgraph.ttl
//! + venv/bin/python convert_ontologies.py --source-dir ../src ...
//! ==> Scanning ../deployment
//! Artefacts (3)
//!     hashgraph.jsonld
//!     hashgraph.owl
//!     hashgraph.ttl
//! Additional Directories (1)
//!     docs/
//! ==> Wrote ../deployment/index.html
//! + sudo rsync -av --delete ../deployment/ /var/www/hashgraphontology.xyz/
//! ...
//! ```
//!
//! Stage lines start with `==> `, collaborator traces with `+ ` (the shell's
//! `set -x` convention) and warnings with a `⚠️` glyph. Stage, trace and
//! listing lines go to stdout; warnings and collaborator stderr go to stderr.
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `String` or
//! `Vec<String>`) for testability and a `print_*` wrapper that writes it.
//! Format functions are pure: no I/O, no side effects.

use crate::runner::{CommandOutput, Invocation};
use crate::scan::Listing;
use std::path::{Path, PathBuf};

const WARNING_GLYPH: &str = "⚠️ ";

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// Stages and warnings
// ============================================================================

pub fn format_stage(message: &str) -> String {
    format!("==> {message}")
}

pub fn print_stage(message: &str) {
    println!("{}", format_stage(message));
}

pub fn format_warning(message: &str) -> String {
    format!("{WARNING_GLYPH} {message}")
}

pub fn print_warning(message: &str) {
    eprintln!("{}", format_warning(message));
}

// ============================================================================
// Collaborators
// ============================================================================

/// Trace line echoed before a collaborator runs.
pub fn format_trace(invocation: &Invocation) -> String {
    format!("+ {}", invocation.command_line())
}

pub fn print_trace(invocation: &Invocation) {
    println!("{}", format_trace(invocation));
}

/// Echo what a finished collaborator printed, stream for stream.
pub fn print_collaborator_output(output: &CommandOutput) {
    if !output.stdout.is_empty() {
        print!("{}", ensure_newline(&output.stdout));
    }
    if !output.stderr.is_empty() {
        eprint!("{}", ensure_newline(&output.stderr));
    }
}

fn ensure_newline(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

// ============================================================================
// Publisher
// ============================================================================

/// Format the scanned deployment directory.
///
/// ```text
/// Artefacts (2)
///     a.ttl
///     b.owl
/// Additional Directories (0)
/// ```
pub fn format_listing(listing: &Listing) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("Artefacts ({})", listing.artefacts.len()));
    for name in &listing.artefacts {
        lines.push(format!("{}{}", indent(1), name));
    }
    lines.push(format!(
        "Additional Directories ({})",
        listing.directories.len()
    ));
    for name in &listing.directories {
        lines.push(format!("{}{}", indent(1), name));
    }
    lines
}

pub fn print_listing(listing: &Listing) {
    for line in format_listing(listing) {
        println!("{}", line);
    }
}

// ============================================================================
// Converter
// ============================================================================

/// Source files about to be converted, relative to the source directory.
pub fn format_sources(sources: &[PathBuf]) -> Vec<String> {
    sources
        .iter()
        .map(|source| format!("{}- {}", indent(1), source.display()))
        .collect()
}

pub fn print_sources(sources: &[PathBuf]) {
    for line in format_sources(sources) {
        println!("{}", line);
    }
}

// ============================================================================
// Provisioner
// ============================================================================

/// Closing instructions for activating the environment in a shell.
pub fn format_activation_hint(venv: &Path) -> Vec<String> {
    let activate = crate::runner::venv_bin_dir(venv).join("activate");
    vec![
        format!("Virtual environment ready at {}", venv.display()),
        "Activate it in your shell with:".to_string(),
        format!("{}source {}", indent(1), activate.display()),
    ]
}

pub fn print_activation_hint(venv: &Path) {
    for line in format_activation_hint(venv) {
        println!("{}", line);
    }
}
