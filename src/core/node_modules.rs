//! Dependency-directory footprint scanning.
//!
//! [`NodeModulesScanner`] locates `node_modules` directories inside a known
//! repository, sums their disk usage, and stamps the result with the mtime of
//! the root `package.json` so later scans can tell whether the figure is
//! stale without re-walking anything.

use crate::core::types::NodeModulesInfo;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Bound on how deep below the repository root matches are searched for.
/// Covers per-package installs in workspace layouts (`packages/x/node_modules`).
const MAX_SCAN_DEPTH: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct NodeModulesScanner;

impl NodeModulesScanner {
    pub fn new() -> Self {
        Self
    }

    /// Scan a repository for `node_modules` directories.
    ///
    /// Returns `None` when the repository has no `node_modules` directories
    /// at all. Found directories are not searched for nested `node_modules`,
    /// so hoisted or symlinked packages are not double counted.
    pub fn scan(&self, repo_root: &Path) -> Option<NodeModulesInfo> {
        let package_json_modified = package_json_mtime(repo_root);

        let mut paths = Vec::new();
        let mut total_bytes = 0u64;

        let mut walker = WalkDir::new(repo_root)
            .max_depth(MAX_SCAN_DEPTH)
            .follow_links(false)
            .into_iter();
        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::debug!("Skipping {:?}: {}", err.path(), err);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            if entry.file_name() == "node_modules" {
                total_bytes = total_bytes.saturating_add(directory_size(entry.path()));
                paths.push(entry.path().to_string_lossy().to_string());
                walker.skip_current_dir();
            }
        }

        if paths.is_empty() {
            return None;
        }

        Some(NodeModulesInfo {
            total_size_mb: bytes_to_mb(total_bytes),
            count: paths.len() as u32,
            paths,
            last_scanned: Utc::now(),
            package_json_modified,
        })
    }

    /// True when a cached [`NodeModulesInfo`] no longer reflects the on-disk
    /// state: the root `package.json` has been modified (or appeared /
    /// disappeared) since the info was computed.
    pub fn is_stale(&self, repo_root: &Path, cached: &NodeModulesInfo) -> bool {
        package_json_mtime(repo_root) != cached.package_json_modified
    }
}

fn package_json_mtime(repo_root: &Path) -> Option<DateTime<Utc>> {
    let metadata = fs::metadata(repo_root.join("package.json")).ok()?;
    let modified = metadata.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

/// Recursive byte size of a directory tree. Symlinks are counted by their own
/// metadata, never followed; unreadable entries are skipped.
pub fn directory_size(path: &Path) -> u64 {
    let mut total = 0u64;
    let mut walker = WalkDir::new(path).follow_links(false).into_iter();
    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::debug!("Skipping {:?}: {}", err.path(), err);
                continue;
            }
        };
        if entry.file_type().is_file() {
            if let Ok(metadata) = entry.metadata() {
                total = total.saturating_add(metadata.len());
            }
        }
    }
    total
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}
