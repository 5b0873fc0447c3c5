//! Deployment directory scanning.
//!
//! Looks at the immediate children of the deployment directory only. Nothing
//! below the first level is visited.
//!
//! ```text
//! deployment/
//! ├── index.html        # generated page, never listed
//! ├── hashgraph.jsonld  # artefact
//! ├── hashgraph.owl     # artefact
//! ├── hashgraph.ttl     # artefact
//! └── docs/             # additional directory (listed as "docs/")
//!     └── ...           # not visited
//! ```
//!
//! Both lists are sorted by name in byte order, so the same directory
//! contents always produce the same [`Listing`].

use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

/// Name of the generated page. Excluded from the artefact list.
pub const INDEX_FILE: &str = "index.html";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot read deployment directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Top-level contents of a deployment directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Regular files, without [`INDEX_FILE`].
    pub artefacts: Vec<String>,
    /// Subdirectories, each with a trailing `/`.
    pub directories: Vec<String>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.artefacts.is_empty() && self.directories.is_empty()
    }
}

pub fn scan(root: &Path) -> Result<Listing, ScanError> {
    let mut listing = Listing::default();

    let entries = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        // Follows symlinks, like `test -f` / `test -d`
        let path = entry.path();
        if path.is_dir() {
            listing.directories.push(format!("{name}/"));
        } else if path.is_file() && name != INDEX_FILE {
            listing.artefacts.push(name);
        }
    }

    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn lists_files_and_directories_sorted() {
        let tmp = deployment_fixture(&["b.owl", "index.html", "a.ttl"], &["docs"]);
        let listing = scan(tmp.path()).unwrap();

        assert_eq!(listing.artefacts, vec!["a.ttl", "b.owl"]);
        assert_eq!(listing.directories, vec!["docs/"]);
    }

    #[test]
    fn index_html_is_never_listed() {
        let tmp = deployment_fixture(&["index.html"], &[]);
        let listing = scan(tmp.path()).unwrap();
        assert!(listing.artefacts.is_empty());
        assert!(listing.is_empty());
    }

    #[test]
    fn only_exact_index_name_is_excluded() {
        let tmp = deployment_fixture(&["index.html.bak", "INDEX.html", "index.htm"], &[]);
        let listing = scan(tmp.path()).unwrap();
        assert_eq!(listing.artefacts, vec!["INDEX.html", "index.htm", "index.html.bak"]);
    }

    #[test]
    fn directory_named_index_html_is_a_directory() {
        let tmp = deployment_fixture(&[], &["index.html"]);
        let listing = scan(tmp.path()).unwrap();
        assert_eq!(listing.directories, vec!["index.html/"]);
    }

    #[test]
    fn does_not_recurse() {
        let tmp = deployment_fixture(&["top.ttl"], &["docs"]);
        fs::write(tmp.path().join("docs/nested.ttl"), "").unwrap();
        fs::create_dir(tmp.path().join("docs/deeper")).unwrap();

        let listing = scan(tmp.path()).unwrap();
        assert_eq!(listing.artefacts, vec!["top.ttl"]);
        assert_eq!(listing.directories, vec!["docs/"]);
    }

    #[test]
    fn sorting_is_byte_order() {
        let tmp = deployment_fixture(&["b.ttl", "C.ttl", "a.ttl", "_x.ttl"], &["z", "Y", "m"]);
        let listing = scan(tmp.path()).unwrap();
        assert_eq!(listing.artefacts, vec!["C.ttl", "_x.ttl", "a.ttl", "b.ttl"]);
        assert_eq!(listing.directories, vec!["Y/", "m/", "z/"]);
    }

    #[test]
    fn empty_directory_gives_empty_listing() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(scan(tmp.path()).unwrap(), Listing::default());
    }

    #[test]
    fn missing_directory_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(scan(&tmp.path().join("missing")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_classified_by_target() {
        let tmp = deployment_fixture(&["real.ttl"], &["realdir"]);
        std::os::unix::fs::symlink(tmp.path().join("real.ttl"), tmp.path().join("link.ttl"))
            .unwrap();
        std::os::unix::fs::symlink(tmp.path().join("realdir"), tmp.path().join("linkdir"))
            .unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("dangling"))
            .unwrap();

        let listing = scan(tmp.path()).unwrap();
        assert_eq!(listing.artefacts, vec!["link.ttl", "real.ttl"]);
        assert_eq!(listing.directories, vec!["linkdir/", "realdir/"]);
    }
}
