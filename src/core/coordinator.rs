//! Scan orchestration and the library facade.
//!
//! [`ScanCoordinator`] drives a scan run through its states
//! (`Idle → Walking → Inspecting → Merging → Idle`, with a `Cancelled`
//! branch), owns the cache and query index, and is the single entry point
//! the CLI talks to. At most one scan is in flight at a time; a second
//! request is rejected with [`RepoScoutError::AlreadyScanning`] rather than
//! queued.
//!
//! Inspection of discovered roots runs on a bounded rayon pool. Every root
//! independently either yields a full record or degrades to an
//! `is_valid = false` placeholder; a failed inspection never aborts the scan.

use crate::core::cache::{normalize_scan_path, RepositoryCache};
use crate::core::error::{RepoScoutError, Result};
use crate::core::index::QueryIndex;
use crate::core::inspector::RepositoryInspector;
use crate::core::node_modules::NodeModulesScanner;
use crate::core::types::{
    CacheInfo, Collection, GitRepository, ScanPath, ScanProgress, SearchFilters,
};
use crate::core::walker::{CancelToken, DirectoryWalker};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

/// Upper bound on concurrent inspections; keeps descriptor usage sane on
/// machines with many cores.
pub const DEFAULT_WORKER_CAP: usize = 8;

/// Phases of a scan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Walking,
    Inspecting,
    Merging,
    Cancelled,
}

pub struct ScanCoordinator {
    cache: RepositoryCache,
    index: QueryIndex,
    inspector: RepositoryInspector,
    walker: DirectoryWalker,
    state: ScanState,
    cancel: CancelToken,
    workers: usize,
}

impl ScanCoordinator {
    pub fn new(cache: RepositoryCache) -> Self {
        let index = QueryIndex::rebuild(cache.data());
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
            .min(DEFAULT_WORKER_CAP);
        Self {
            cache,
            index,
            inspector: RepositoryInspector::new(),
            walker: DirectoryWalker::new(),
            state: ScanState::Idle,
            cancel: CancelToken::new(),
            workers,
        }
    }

    pub fn with_walker(mut self, walker: DirectoryWalker) -> Self {
        self.walker = walker;
        self
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Clone of the cancellation token for this coordinator. Cancelling it
    /// stops the in-flight scan at the next directory boundary; inspections
    /// already running are allowed to finish.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run a full scan and merge the results.
    ///
    /// `paths: None` scans every configured scan path; `Some` scans exactly
    /// the given roots. With `force_rescan` unset and no explicit paths, a
    /// non-empty cache short-circuits to the cached records without touching
    /// the filesystem. Progress events stream through `progress` while the
    /// walk runs; a final event with `completed = true` follows the merge.
    ///
    /// Returns the full post-merge repository set.
    pub fn scan(
        &mut self,
        paths: Option<Vec<String>>,
        force_rescan: bool,
        progress: Option<Sender<ScanProgress>>,
    ) -> Result<Vec<GitRepository>> {
        if self.state != ScanState::Idle {
            return Err(RepoScoutError::AlreadyScanning);
        }

        let result = self.run_scan(paths, force_rescan, progress);
        self.state = ScanState::Idle;
        result
    }

    fn run_scan(
        &mut self,
        paths: Option<Vec<String>>,
        force_rescan: bool,
        progress: Option<Sender<ScanProgress>>,
    ) -> Result<Vec<GitRepository>> {
        let explicit_paths = paths.is_some();
        let roots: Vec<String> = match paths {
            Some(paths) => paths
                .iter()
                .map(|p| normalize_scan_path(p))
                .collect::<Result<_>>()?,
            None => self
                .cache
                .scan_paths()
                .into_iter()
                .map(|sp| sp.path)
                .collect(),
        };

        if !explicit_paths && !force_rescan && !self.cache.is_empty() {
            log::debug!("Returning cached repositories without rescan");
            return Ok(self.cache.repositories());
        }

        if roots.is_empty() {
            log::warn!("No scan paths configured; nothing to scan");
            return Ok(self.cache.repositories());
        }

        self.cancel.reset();
        self.state = ScanState::Walking;
        log::info!("Scanning {} root(s)", roots.len());

        let root_paths: Vec<PathBuf> = roots.iter().map(PathBuf::from).collect();
        let discovered: Vec<PathBuf> = self
            .walker
            .walk(&root_paths, progress.clone(), self.cancel.clone())
            .collect();
        let cancelled_during_walk = self.cancel.is_cancelled();
        if cancelled_during_walk {
            // Partial results are better than none: already-found roots are
            // still inspected and merged.
            self.state = ScanState::Cancelled;
            log::info!(
                "Scan cancelled during walk; inspecting {} root(s) found so far",
                discovered.len()
            );
        } else {
            self.state = ScanState::Inspecting;
        }

        let inspected = self.inspect_all(&discovered, cancelled_during_walk);

        self.state = ScanState::Merging;
        self.cache.merge(inspected)?;
        self.cache.mark_scanned(&roots)?;
        self.index = QueryIndex::rebuild(self.cache.data());

        if let Some(sender) = &progress {
            let _ = sender.send(ScanProgress {
                current_path: String::new(),
                repos_found: discovered.len() as u32,
                completed: true,
            });
        }

        Ok(self.cache.repositories())
    }

    /// Inspect discovered roots on a bounded worker pool. Roots found before
    /// a mid-walk cancellation are all inspected; a cancellation arriving
    /// during this phase stops scheduling new inspections instead.
    fn inspect_all(&self, discovered: &[PathBuf], inspect_all_found: bool) -> Vec<GitRepository> {
        let cache = &self.cache;
        let inspector = &self.inspector;
        let cancel = &self.cancel;

        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
        {
            Ok(pool) => pool,
            Err(err) => {
                log::warn!("Falling back to serial inspection: {err}");
                return discovered
                    .iter()
                    .map(|root| inspect_one(inspector, cache, root))
                    .collect();
            }
        };

        pool.install(|| {
            discovered
                .par_iter()
                .filter_map(|root| {
                    if !inspect_all_found && cancel.is_cancelled() {
                        return None;
                    }
                    Some(inspect_one(inspector, cache, root))
                })
                .collect()
        })
    }

    // === Query surface ===

    pub fn load_cached(&self) -> Vec<GitRepository> {
        self.cache.repositories()
    }

    pub fn search(&self, filters: &SearchFilters) -> Vec<GitRepository> {
        self.index.search(filters, self.cache.data())
    }

    /// Single-record lookup through the index's recent-lookup LRU.
    pub fn lookup(&mut self, path: &str) -> Option<GitRepository> {
        self.index.recent_lookup(path, self.cache.data())
    }

    pub fn pinned(&self) -> Vec<GitRepository> {
        self.cache.pinned()
    }

    // === Single-repository commands ===

    /// Re-run inspection for one known repository, forcing a fresh
    /// dependency-directory scan. Pin state survives through the merge. A
    /// repository whose `.git` vanished is flagged invalid and the error is
    /// surfaced.
    pub fn refresh_one(&mut self, path: &str) -> Result<GitRepository> {
        if self.cache.get(path).is_none() {
            return Err(RepoScoutError::path_not_found(path));
        }

        match self.inspector.inspect(Path::new(path)) {
            Ok(repo) => {
                self.cache.merge(vec![repo])?;
                self.index = QueryIndex::rebuild(self.cache.data());
                Ok(self
                    .cache
                    .get(path)
                    .cloned()
                    .expect("record present after merge"))
            }
            Err(err) => {
                self.cache.update_repository(path, |repo| {
                    repo.is_valid = false;
                })?;
                self.index = QueryIndex::rebuild(self.cache.data());
                Err(err)
            }
        }
    }

    /// Delete a repository's working tree from disk and drop its cache
    /// record. The only operation that destroys data outside the cache file.
    pub fn delete_one(&mut self, path: &str) -> Result<()> {
        if self.cache.get(path).is_none() {
            return Err(RepoScoutError::path_not_found(path));
        }

        if let Err(err) = fs::remove_dir_all(path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                return Err(RepoScoutError::Io(err));
            }
        }

        self.cache.remove_repository(path)?;
        self.index = QueryIndex::rebuild(self.cache.data());
        log::info!("Deleted repository {path}");
        Ok(())
    }

    /// Remove every `node_modules` directory under a cached repository.
    /// Returns the freed size in megabytes.
    pub fn delete_node_modules(&mut self, path: &str) -> Result<f64> {
        if self.cache.get(path).is_none() {
            return Err(RepoScoutError::path_not_found(path));
        }

        let scanner = NodeModulesScanner::new();
        let Some(info) = scanner.scan(Path::new(path)) else {
            return Ok(0.0);
        };

        for dir in &info.paths {
            if let Err(err) = fs::remove_dir_all(dir) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    return Err(RepoScoutError::Io(err));
                }
            }
        }

        self.cache.update_repository(path, |repo| {
            repo.node_modules_info = None;
        })?;
        self.index = QueryIndex::rebuild(self.cache.data());
        log::info!(
            "Removed {} node_modules director{} under {path} ({:.1} MB)",
            info.count,
            if info.count == 1 { "y" } else { "ies" },
            info.total_size_mb
        );
        Ok(info.total_size_mb)
    }

    pub fn toggle_pin(&mut self, path: &str) -> Result<GitRepository> {
        let repo = self.cache.toggle_pin(path)?;
        self.index = QueryIndex::rebuild(self.cache.data());
        Ok(repo)
    }

    // === Collections ===

    pub fn collections(&self) -> &[Collection] {
        self.cache.collections()
    }

    pub fn create_collection(
        &mut self,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Collection> {
        self.cache.create_collection(name, color)
    }

    pub fn delete_collection(&mut self, id: &str) -> Result<()> {
        self.cache.delete_collection(id)
    }

    pub fn add_to_collection(&mut self, id: &str, path: &str) -> Result<()> {
        self.cache.add_to_collection(id, path)
    }

    pub fn remove_from_collection(&mut self, id: &str, path: &str) -> Result<()> {
        self.cache.remove_from_collection(id, path)
    }

    pub fn repositories_in_collection(&self, id: &str) -> Result<Vec<GitRepository>> {
        self.cache.repositories_in_collection(id)
    }

    // === Scan paths ===

    pub fn scan_paths(&self) -> Vec<ScanPath> {
        self.cache.scan_paths()
    }

    pub fn add_scan_path(&mut self, path: &str) -> Result<()> {
        self.cache.add_scan_path(path)
    }

    pub fn remove_scan_path(&mut self, path: &str) -> Result<()> {
        self.cache.remove_scan_path(path)
    }

    // === Cache maintenance ===

    pub fn cache_info(&self) -> CacheInfo {
        self.cache.cache_info()
    }

    pub fn cache_file_path(&self) -> &Path {
        self.cache.cache_file_path()
    }

    pub fn clear_cache(&mut self) -> Result<()> {
        self.cache.clear()?;
        self.index = QueryIndex::rebuild(self.cache.data());
        Ok(())
    }

    pub fn cleanup_invalid(&mut self) -> Result<usize> {
        let removed = self.cache.cleanup_invalid()?;
        self.index = QueryIndex::rebuild(self.cache.data());
        Ok(removed)
    }
}

/// One root in, one record out: a full inspection on success, an
/// `is_valid = false` placeholder (keeping any previously cached metadata)
/// on failure.
fn inspect_one(
    inspector: &RepositoryInspector,
    cache: &RepositoryCache,
    root: &Path,
) -> GitRepository {
    let previous = cache.get(&root.to_string_lossy());
    match inspector.inspect_cached(root, previous) {
        Ok(repo) => repo,
        Err(err) => {
            log::warn!("Inspection failed for {}: {err}", root.display());
            GitRepository::invalid_placeholder(root, previous)
        }
    }
}
