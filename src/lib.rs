//! # ontology-site
//!
//! Operator tooling for the Hashgraph Ontology repository. Three commands
//! share one binary:
//!
//! ```text
//! provision   <root>/venv  ←  python3.12 -m venv, pip install rdflib jinja2 pyshacl owlrl
//! convert     ../src/      →  venv/bin/python convert_ontologies.py  →  deployment/
//! publish     deployment/  →  index.html  →  rsync → /var/www/<site>/  →  chown
//! ```
//!
//! No command calls another. Provisioning prepares the Python environment,
//! conversion runs the ontology conversion script inside it, and publishing
//! ships whatever the script left in the deployment directory.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Explicit configuration record: defaults, optional TOML file, environment overrides |
//! | [`provision`] | Environment provisioner: interpreter lookup, venv creation, package install |
//! | [`convert`] | Runs the conversion script with the venv's interpreter |
//! | [`publish`] | Site publisher: render the index page, mirror-copy, ownership change |
//! | [`scan`] | Top-level listing of the deployment directory |
//! | [`generate`] | Renders the listing into `index.html` using Maud |
//! | [`runner`] | `CommandRunner` seam for every external tool invocation |
//! | [`output`] | Operator-facing progress, trace and warning lines |
//!
//! # Design Decisions
//!
//! ## Collaborators Behind a Trait
//!
//! The real work (venv creation, pip, rsync, chown, sudo) is done by external
//! programs. Every call is an [`runner::Invocation`] value passed to a
//! [`runner::CommandRunner`]. Tests substitute a recorder and assert on the
//! exact argument lists; the binary uses [`runner::SystemRunner`].
//!
//! ## Configuration Resolved Once
//!
//! Environment variables are read exactly once, in `main`, and folded into a
//! [`config::Config`]. The inherited `PATH` that activated venv children
//! extend is captured there too, in a [`provision::Venv`]. Command handlers
//! receive these values and never consult the process environment themselves.
//!
//! ## Fail Fast
//!
//! Missing preconditions abort with a warning and exit code 1 before anything
//! is written or run. A failing collaborator aborts the run with that
//! collaborator's exit code and its own diagnostics. Nothing is retried and
//! nothing is rolled back.

pub mod config;
pub mod convert;
pub mod generate;
pub mod output;
pub mod provision;
pub mod publish;
pub mod runner;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
