//! Directory scan pipeline: enumerate, parse, scatter (made by FontLab https://www.fontlab.com/)

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::descriptor::FontDescriptor;
use crate::discovery::{is_collection_path, DirectoryDiscovery, FontDiscovery};
use crate::index::FontIndex;
use crate::parser::FontParser;
use crate::sources::{read_font_path_list, FullNameMap};

/// Counters from one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub files_seen: usize,
    pub files_parsed: usize,
    pub faces_indexed: usize,
    pub failures: usize,
}

/// Rebuilds a [`FontIndex`] from the files in one directory.
#[derive(Clone)]
pub struct DirectoryScanner {
    parser: Arc<dyn FontParser>,
}

impl std::fmt::Debug for DirectoryScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryScanner").finish_non_exhaustive()
    }
}

impl DirectoryScanner {
    pub fn new(parser: Arc<dyn FontParser>) -> Self {
        Self { parser }
    }

    /// Clear `index` and refill it from the files directly inside `dir`.
    ///
    /// An empty or missing `dir` leaves the index untouched. Files that fail
    /// to parse are logged and skipped.
    pub fn scan_directory(&self, dir: &Path, index: &mut FontIndex) -> ScanReport {
        let mut report = ScanReport::default();
        if dir.as_os_str().is_empty() || !dir.exists() {
            warn!(dir = %dir.display(), "font directory missing, nothing to scan");
            return report;
        }

        index.clear();

        let sources = match DirectoryDiscovery::new(dir).discover() {
            Ok(sources) => sources,
            Err(err) => {
                error!(dir = %dir.display(), "cannot read font directory: {err:#}");
                return report;
            }
        };

        for source in sources {
            report.files_seen += 1;
            match self.parse_path(&source.path, source.is_collection()) {
                Ok(descriptors) => {
                    report.files_parsed += 1;
                    for desc in descriptors {
                        if index.scatter(desc).is_some() {
                            report.faces_indexed += 1;
                        }
                    }
                }
                Err(err) => {
                    report.failures += 1;
                    warn!(path = %source.path.display(), "font parse failed: {err:#}");
                }
            }
        }

        if index.is_empty() {
            error!(dir = %dir.display(), "font directory produced no descriptors");
        } else {
            info!(
                dir = %dir.display(),
                files = report.files_seen,
                faces = report.faces_indexed,
                failures = report.failures,
                "font directory scanned"
            );
            index.log_stats();
        }

        report
    }

    /// Parse every file named in a JSON font path list into a full-name map.
    ///
    /// A missing list yields an empty map. An unreadable list, or a listed
    /// file that fails to parse, is logged and skipped.
    pub fn load_font_list(&self, list: &Path) -> FullNameMap {
        let mut map = FullNameMap::new();
        if list.as_os_str().is_empty() || !list.is_file() {
            debug!(list = %list.display(), "font list absent");
            return map;
        }

        let paths = match read_font_path_list(list) {
            Ok(paths) => paths,
            Err(err) => {
                warn!(list = %list.display(), "cannot read font list: {err:#}");
                return map;
            }
        };

        for path in paths {
            match self.parse_path(&path, is_collection_path(&path)) {
                Ok(descriptors) => {
                    for desc in descriptors {
                        map.insert(desc);
                    }
                }
                Err(err) => warn!(path = %path.display(), "font parse failed: {err:#}"),
            }
        }

        debug!(list = %list.display(), names = map.len(), "font list loaded");
        map
    }

    fn parse_path(&self, path: &Path, collection: bool) -> Result<Vec<FontDescriptor>> {
        if collection {
            self.parser.parse_collection(path)
        } else {
            self.parser.parse_file(path).map(|desc| vec![desc])
        }
    }
}
