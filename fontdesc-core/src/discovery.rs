//! Font directory enumeration (made by FontLab https://www.fontlab.com/)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::warn;
use walkdir::WalkDir;

/// A file found in a font directory, with symlinks already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSourceRef {
    /// Canonical absolute path of the file (the link target for symlinks).
    pub path: PathBuf,
    /// Whether the directory entry itself was a symbolic link.
    pub via_symlink: bool,
}

impl FontSourceRef {
    pub fn is_collection(&self) -> bool {
        is_collection_path(&self.path)
    }
}

/// `.ttc` files hold several faces. The suffix check is case-sensitive.
pub fn is_collection_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".ttc"))
}

/// Trait for enumerating candidate font files.
pub trait FontDiscovery {
    fn discover(&self) -> Result<Vec<FontSourceRef>>;
}

/// Lists the entries directly inside one directory. Subdirectories are not
/// descended into.
#[derive(Debug, Clone)]
pub struct DirectoryDiscovery {
    root: PathBuf,
}

impl DirectoryDiscovery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FontDiscovery for DirectoryDiscovery {
    fn discover(&self) -> Result<Vec<FontSourceRef>> {
        if !self.root.is_dir() {
            return Err(anyhow!("font directory does not exist: {}", self.root.display()));
        }

        let mut found = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.with_context(|| format!("reading {}", self.root.display()))?;
            let via_symlink = entry.path_is_symlink();

            let resolved = match fs::canonicalize(entry.path()) {
                Ok(path) => path,
                Err(err) => {
                    warn!(path = %entry.path().display(), "cannot resolve font path: {err}");
                    continue;
                }
            };

            match fs::metadata(&resolved) {
                Ok(meta) if meta.is_file() => found.push(FontSourceRef {
                    path: resolved,
                    via_symlink,
                }),
                Ok(_) => {}
                Err(err) => {
                    warn!(path = %resolved.display(), "cannot stat font path: {err}");
                }
            }
        }

        Ok(found)
    }
}
