//! Core data model for discovered repositories and cache bookkeeping.
//!
//! This module defines the records that flow from the scanner into the
//! persistent cache and back out through queries. Everything here is plain
//! serde-serializable data; behavior lives in the scanner, cache and index
//! modules.
//!
//! # Public API
//! - [`GitRepository`]: One discovered repository with all extracted metadata
//! - [`NodeModulesInfo`]: Aggregate dependency-directory footprint of a repository
//! - [`ScanPath`]: A user-configured root directory for discovery
//! - [`Collection`]: A named, colored grouping of repository paths
//! - [`ScanProgress`]: Progress event emitted while a scan is running
//! - [`SearchFilters`]: Optional filter set accepted by the search surface
//! - [`CacheInfo`]: Summary statistics about the persisted cache

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A Git repository discovered on disk, keyed by its absolute path.
///
/// The path is the stable identity: rescans that rediscover the same path
/// update the metadata fields in place while `is_pinned` / `pinned_at` and
/// collection membership survive the merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitRepository {
    pub name: String,
    pub path: String,
    pub size_mb: f64,
    /// Lowercased file extension -> number of files
    pub file_types: HashMap<String, u32>,
    pub last_commit_date: Option<DateTime<Utc>>,
    pub current_branch: Option<String>,
    pub branches: Vec<String>,
    pub remote_url: Option<String>,
    /// Commits reachable from HEAD, saturating at the inspector's ceiling.
    pub commit_count: u32,
    pub last_analyzed: DateTime<Utc>,
    /// False when the `.git` directory became unreadable since the last scan.
    /// Invalid records are kept until an explicit cleanup pass so that pins
    /// and collection membership survive transient I/O failures.
    pub is_valid: bool,
    pub is_pinned: bool,
    pub pinned_at: Option<DateTime<Utc>>,
    pub node_modules_info: Option<NodeModulesInfo>,
}

impl GitRepository {
    /// Placeholder record for a path that could not be inspected.
    ///
    /// Keeps whatever metadata a previous scan produced (if any) and only
    /// flips the validity flag, so user annotations are never lost to a
    /// transient failure.
    pub fn invalid_placeholder(path: &Path, previous: Option<&GitRepository>) -> Self {
        match previous {
            Some(prev) => GitRepository {
                is_valid: false,
                last_analyzed: Utc::now(),
                ..prev.clone()
            },
            None => GitRepository {
                name: display_name(path),
                path: path.to_string_lossy().to_string(),
                size_mb: 0.0,
                file_types: HashMap::new(),
                last_commit_date: None,
                current_branch: None,
                branches: Vec::new(),
                remote_url: None,
                commit_count: 0,
                last_analyzed: Utc::now(),
                is_valid: false,
                is_pinned: false,
                pinned_at: None,
                node_modules_info: None,
            },
        }
    }
}

/// Last path segment, used as the repository display name.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Aggregate disk footprint of `node_modules` directories inside a repository.
///
/// The size figure goes stale when dependencies are reinstalled; staleness is
/// detected by comparing `package_json_modified` against the current mtime of
/// the root `package.json`, never by wall-clock age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeModulesInfo {
    pub total_size_mb: f64,
    pub count: u32,
    pub paths: Vec<String>,
    pub last_scanned: DateTime<Utc>,
    pub package_json_modified: Option<DateTime<Utc>>,
}

/// A root directory the user has opted into scanning.
///
/// `repository_count` is derived data: it is recomputed from the repository
/// set on every listing and persisted only for display continuity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanPath {
    pub path: String,
    pub last_scanned: Option<DateTime<Utc>>,
    pub repository_count: usize,
}

impl ScanPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            last_scanned: None,
            repository_count: 0,
        }
    }
}

/// A user-defined grouping of repository paths. Membership is many-to-many;
/// deleting a collection removes associations only, never repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub color: String,
    pub repository_paths: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Collection {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        let name = name.into();
        let created_at = Utc::now();
        let id = format!(
            "{:x}",
            md5::compute(format!("{name}:{}", created_at.timestamp_nanos_opt().unwrap_or_default()))
        );
        Self {
            id,
            name,
            color: color.into(),
            repository_paths: Vec::new(),
            created_at,
        }
    }
}

/// Progress event emitted while a scan walks the filesystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub current_path: String,
    pub repos_found: u32,
    pub completed: bool,
}

/// Optional filters accepted by the search surface. Absent fields do not
/// constrain the result set; present fields are intersected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    /// Case-insensitive prefix match on the repository display name.
    pub name_prefix: Option<String>,
    /// Inclusive lower bound on `size_mb`.
    pub min_size_mb: Option<f64>,
    /// Inclusive upper bound on `size_mb`.
    pub max_size_mb: Option<f64>,
    /// Repositories whose histogram contains this extension (lowercased).
    pub file_type: Option<String>,
    /// Repositories located under this absolute path.
    pub path_prefix: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.name_prefix.is_none()
            && self.min_size_mb.is_none()
            && self.max_size_mb.is_none()
            && self.file_type.is_none()
            && self.path_prefix.is_none()
    }
}

/// Summary statistics about the persisted cache file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheInfo {
    pub total_repositories: usize,
    pub valid_repositories: usize,
    pub invalid_repositories: usize,
    pub cache_file_size: u64,
    pub last_updated: DateTime<Utc>,
}
