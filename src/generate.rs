//! Index page generation.
//!
//! Renders the deployment directory's [`Listing`] into a single static
//! `index.html` written back into that directory:
//!
//! ```text
//! Hashgraph Ontology
//! <intro>
//!
//! Artefacts
//!   - hashgraph.jsonld
//!   - hashgraph.owl
//!   - hashgraph.ttl
//!
//! Additional Directories
//!   - docs/                       (or "No additional directories")
//!
//! <note about RDF representations>
//! ```
//!
//! Every entry is a relative link whose `href` and label are the bare name.
//! The page carries no timestamp or build information, so regenerating it
//! from unchanged directory contents gives byte-identical output.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! File names are interpolated, so they are escaped automatically.

use crate::scan::{INDEX_FILE, Listing};
use maud::{DOCTYPE, Markup, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub const PAGE_TITLE: &str = "Hashgraph Ontology Artefacts";
pub const HEADING: &str = "Hashgraph Ontology";
pub const ARTEFACTS_HEADING: &str = "Artefacts";
pub const DIRECTORIES_HEADING: &str = "Additional Directories";
pub const NO_DIRECTORIES: &str = "No additional directories";

const INTRO: &str = "Published artefacts of the Hashgraph Ontology. \
Each file below is served as-is from this directory.";
const RDF_NOTE: &str = "RDF representations of the ontology (TTL, OWL, JSON-LD) \
may be present among the artefacts above.";

const CSS: &str = "body { font-family: system-ui, sans-serif; max-width: 48rem; \
margin: 2rem auto; padding: 0 1rem; line-height: 1.5; } \
li { margin: 0.25rem 0; } \
.note { color: #666666; }";

/// Render the listing and write it to `<source>/index.html`, replacing any
/// previous page. Returns the path written.
pub fn write_index(source: &Path, listing: &Listing) -> Result<PathBuf, GenerateError> {
    let path = source.join(INDEX_FILE);
    fs::write(&path, render_index(listing).into_string())?;
    Ok(path)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (CSS) }
            }
            body {
                (content)
            }
        }
    }
}

/// A list of relative links, one per entry.
fn link_list(entries: &[String]) -> Markup {
    html! {
        @for entry in entries {
            li { a href=(entry) { (entry) } }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the complete index page for a deployment directory.
pub fn render_index(listing: &Listing) -> Markup {
    let content = html! {
        main {
            h1 { (HEADING) }
            p.intro { (INTRO) }
            section.artefacts {
                h2 { (ARTEFACTS_HEADING) }
                ul {
                    (link_list(&listing.artefacts))
                }
            }
            section.directories {
                h2 { (DIRECTORIES_HEADING) }
                ul {
                    @if listing.directories.is_empty() {
                        li { (NO_DIRECTORIES) }
                    } @else {
                        (link_list(&listing.directories))
                    }
                }
            }
            p.note { (RDF_NOTE) }
        }
    };

    base_document(PAGE_TITLE, content)
}

// ============================================================================
// Tests
// ============================================================================
