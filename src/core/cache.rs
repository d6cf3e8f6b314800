//! Durable repository cache: the persistence layer and the merge /
//! annotation logic on top of it.
//!
//! [`CacheStore`] owns the on-disk JSON document; [`RepositoryCache`] owns
//! the in-memory [`CacheData`] container and is the single writer for all
//! mutations. Every mutating operation persists the full container before
//! returning (write-through). When the write fails the error surfaces to the
//! caller while the in-memory mutation is kept, so a later save can retry.
//!
//! # Central invariant
//! A rescan must never silently erase user annotations: [`merge`] preserves
//! pin state on rediscovered paths, leaves paths outside the scanned subtree
//! untouched, and collection membership lives keyed by path inside
//! [`Collection`], out of the merge's reach entirely.
//!
//! [`merge`]: RepositoryCache::merge

use crate::core::dirs::get_data_directory;
use crate::core::error::{RepoScoutError, Result};
use crate::core::types::{CacheInfo, Collection, GitRepository, ScanPath};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CACHE_FILE_NAME: &str = "repositories_cache.json";
const CACHE_VERSION: &str = "1.0";

/// The durable unit: everything repo-scout persists, in one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheData {
    pub repositories: HashMap<String, GitRepository>,
    pub collections: Vec<Collection>,
    pub scan_paths: Vec<ScanPath>,
    pub last_updated: DateTime<Utc>,
    pub cache_version: String,
}

impl Default for CacheData {
    fn default() -> Self {
        Self {
            repositories: HashMap::new(),
            collections: Vec::new(),
            scan_paths: Vec::new(),
            last_updated: Utc::now(),
            cache_version: CACHE_VERSION.to_string(),
        }
    }
}

/// Owns the cache file location and the raw load/save round trip.
#[derive(Debug, Clone)]
pub struct CacheStore {
    cache_file_path: PathBuf,
}

impl CacheStore {
    /// Store under the platform application-data directory, creating it when
    /// missing.
    pub fn new() -> Result<Self> {
        let data_dir = get_data_directory()?;
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)
                .map_err(|e| RepoScoutError::data_directory_creation_failed(&data_dir, e))?;
        }
        Ok(Self {
            cache_file_path: data_dir.join(CACHE_FILE_NAME),
        })
    }

    /// Store backed by an explicit file path. Used by tests.
    pub fn at(cache_file_path: PathBuf) -> Self {
        Self { cache_file_path }
    }

    pub fn cache_file_path(&self) -> &Path {
        &self.cache_file_path
    }

    /// Load the persisted container; a missing file is an empty cache, not an
    /// error.
    pub fn load(&self) -> Result<CacheData> {
        if !self.cache_file_path.exists() {
            log::debug!(
                "No cache file at {}, starting empty",
                self.cache_file_path.display()
            );
            return Ok(CacheData::default());
        }

        let content = fs::read_to_string(&self.cache_file_path).map_err(|e| {
            log::error!(
                "Failed to read cache file '{}': {}",
                self.cache_file_path.display(),
                e
            );
            RepoScoutError::cache_read_failed(&self.cache_file_path, e)
        })?;

        serde_json::from_str(&content).map_err(|e| {
            log::error!(
                "Failed to parse cache file '{}': {}",
                self.cache_file_path.display(),
                e
            );
            RepoScoutError::cache_parse_failed(&self.cache_file_path, e)
        })
    }

    pub fn save(&self, data: &CacheData) -> Result<()> {
        let json = serde_json::to_string_pretty(data).map_err(|e| {
            log::error!("Failed to serialize cache data: {e}");
            RepoScoutError::cache_serialization_failed(e)
        })?;

        fs::write(&self.cache_file_path, json).map_err(|e| {
            log::error!(
                "Failed to write cache file '{}': {}",
                self.cache_file_path.display(),
                e
            );
            RepoScoutError::cache_write_failed(&self.cache_file_path, e)
        })
    }

    fn file_size(&self) -> u64 {
        fs::metadata(&self.cache_file_path)
            .map(|m| m.len())
            .unwrap_or(0)
    }
}

/// In-memory cache container plus its write-through store.
#[derive(Debug)]
pub struct RepositoryCache {
    data: CacheData,
    store: CacheStore,
}

impl RepositoryCache {
    /// Load the persisted state into memory. Called once at startup.
    pub fn open(store: CacheStore) -> Result<Self> {
        let data = store.load()?;
        log::debug!(
            "Loaded cache with {} repositories from {}",
            data.repositories.len(),
            store.cache_file_path().display()
        );
        Ok(Self { data, store })
    }

    pub fn data(&self) -> &CacheData {
        &self.data
    }

    pub fn cache_file_path(&self) -> &Path {
        self.store.cache_file_path()
    }

    pub fn get(&self, path: &str) -> Option<&GitRepository> {
        self.data.repositories.get(path)
    }

    pub fn repositories(&self) -> Vec<GitRepository> {
        self.data.repositories.values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.data.repositories.is_empty()
    }

    /// Reconcile freshly scanned records into the cache.
    ///
    /// Rediscovered paths get their metadata overwritten while `is_pinned` /
    /// `pinned_at` carry over from the existing record. New paths are
    /// inserted. Paths absent from `discovered` are left untouched, so a
    /// partial scan never appears to remove repositories outside its subtree.
    pub fn merge(&mut self, discovered: Vec<GitRepository>) -> Result<()> {
        for mut repo in discovered {
            if let Some(existing) = self.data.repositories.get(&repo.path) {
                repo.is_pinned = existing.is_pinned;
                repo.pinned_at = existing.pinned_at;
            }
            self.data.repositories.insert(repo.path.clone(), repo);
        }
        self.persist()
    }

    /// Apply an in-place edit to a cached record and persist the result.
    pub fn update_repository<F>(&mut self, path: &str, edit: F) -> Result<GitRepository>
    where
        F: FnOnce(&mut GitRepository),
    {
        let repo = self
            .data
            .repositories
            .get_mut(path)
            .ok_or_else(|| RepoScoutError::path_not_found(path))?;
        edit(repo);
        let updated = repo.clone();
        self.persist()?;
        Ok(updated)
    }

    /// Flip the pin flag, stamping or clearing `pinned_at` to match.
    pub fn toggle_pin(&mut self, path: &str) -> Result<GitRepository> {
        self.update_repository(path, |repo| {
            repo.is_pinned = !repo.is_pinned;
            repo.pinned_at = repo.is_pinned.then(Utc::now);
        })
    }

    pub fn pinned(&self) -> Vec<GitRepository> {
        self.data
            .repositories
            .values()
            .filter(|r| r.is_pinned)
            .cloned()
            .collect()
    }

    /// Remove a single record, pruning its collection memberships.
    pub fn remove_repository(&mut self, path: &str) -> Result<GitRepository> {
        let removed = self
            .data
            .repositories
            .remove(path)
            .ok_or_else(|| RepoScoutError::path_not_found(path))?;
        for collection in &mut self.data.collections {
            collection.repository_paths.retain(|p| p != path);
        }
        self.persist()?;
        Ok(removed)
    }

    /// Remove records flagged invalid whose `.git` entry is confirmed gone on
    /// a targeted re-check. Records that recovered are flagged valid again.
    /// Returns the number removed.
    pub fn cleanup_invalid(&mut self) -> Result<usize> {
        let mut to_remove = Vec::new();
        for (path, repo) in &mut self.data.repositories {
            if repo.is_valid {
                continue;
            }
            if Path::new(path).join(".git").exists() {
                repo.is_valid = true;
            } else {
                to_remove.push(path.clone());
            }
        }

        for path in &to_remove {
            self.data.repositories.remove(path);
            for collection in &mut self.data.collections {
                collection.repository_paths.retain(|p| p != path);
            }
        }

        let removed = to_remove.len();
        log::info!("Cleanup removed {removed} invalid repositories");
        self.persist()?;
        Ok(removed)
    }

    /// Drop all repositories, collections and scan timestamps.
    pub fn clear(&mut self) -> Result<()> {
        self.data = CacheData::default();
        self.persist()
    }

    // === Collections ===

    pub fn collections(&self) -> &[Collection] {
        &self.data.collections
    }

    pub fn create_collection(
        &mut self,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Collection> {
        let collection = Collection::new(name, color);
        self.data.collections.push(collection.clone());
        self.persist()?;
        Ok(collection)
    }

    /// Delete a collection. Removes the association only; member repositories
    /// are unaffected.
    pub fn delete_collection(&mut self, id: &str) -> Result<()> {
        let before = self.data.collections.len();
        self.data.collections.retain(|c| c.id != id);
        if self.data.collections.len() == before {
            return Err(RepoScoutError::collection_not_found(id));
        }
        self.persist()
    }

    pub fn add_to_collection(&mut self, id: &str, path: &str) -> Result<()> {
        if !self.data.repositories.contains_key(path) {
            return Err(RepoScoutError::path_not_found(path));
        }
        let collection = self
            .data
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RepoScoutError::collection_not_found(id))?;
        if !collection.repository_paths.iter().any(|p| p == path) {
            collection.repository_paths.push(path.to_string());
        }
        self.persist()
    }

    pub fn remove_from_collection(&mut self, id: &str, path: &str) -> Result<()> {
        let collection = self
            .data
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RepoScoutError::collection_not_found(id))?;
        let before = collection.repository_paths.len();
        collection.repository_paths.retain(|p| p != path);
        if collection.repository_paths.len() == before {
            return Err(RepoScoutError::path_not_found(path));
        }
        self.persist()
    }

    pub fn repositories_in_collection(&self, id: &str) -> Result<Vec<GitRepository>> {
        let collection = self
            .data
            .collections
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| RepoScoutError::collection_not_found(id))?;
        Ok(collection
            .repository_paths
            .iter()
            .filter_map(|path| self.data.repositories.get(path))
            .cloned()
            .collect())
    }

    // === Scan paths ===

    /// Register a scan root. Adding a path that is already configured is a
    /// no-op, not an error.
    pub fn add_scan_path(&mut self, path: &str) -> Result<()> {
        let normalized = normalize_scan_path(path)?;
        if self.data.scan_paths.iter().any(|sp| sp.path == normalized) {
            return Ok(());
        }
        self.data.scan_paths.push(ScanPath::new(normalized));
        self.persist()
    }

    pub fn remove_scan_path(&mut self, path: &str) -> Result<()> {
        let normalized = normalize_scan_path(path)?;
        let before = self.data.scan_paths.len();
        self.data.scan_paths.retain(|sp| sp.path != normalized);
        if self.data.scan_paths.len() == before {
            return Err(RepoScoutError::path_not_found(path));
        }
        self.persist()
    }

    /// Configured scan roots with `repository_count` recomputed from the
    /// current repository set. The stored count is display history only; the
    /// repository map is the single source of truth.
    pub fn scan_paths(&self) -> Vec<ScanPath> {
        self.data
            .scan_paths
            .iter()
            .map(|sp| ScanPath {
                path: sp.path.clone(),
                last_scanned: sp.last_scanned,
                repository_count: self
                    .data
                    .repositories
                    .values()
                    .filter(|repo| is_under(&repo.path, &sp.path))
                    .count(),
            })
            .collect()
    }

    /// Stamp `last_scanned` on the given roots after a completed scan.
    pub fn mark_scanned(&mut self, roots: &[String]) -> Result<()> {
        let now = Utc::now();
        for sp in &mut self.data.scan_paths {
            if roots.iter().any(|root| root == &sp.path) {
                sp.last_scanned = Some(now);
            }
        }
        self.persist()
    }

    pub fn cache_info(&self) -> CacheInfo {
        let valid = self
            .data
            .repositories
            .values()
            .filter(|r| r.is_valid)
            .count();
        CacheInfo {
            total_repositories: self.data.repositories.len(),
            valid_repositories: valid,
            invalid_repositories: self.data.repositories.len() - valid,
            cache_file_size: self.store.file_size(),
            last_updated: self.data.last_updated,
        }
    }

    fn persist(&mut self) -> Result<()> {
        self.data.last_updated = Utc::now();
        self.store.save(&self.data)
    }
}

/// Validate and normalize a scan root: non-empty, absolute, no trailing
/// separator.
pub fn normalize_scan_path(path: &str) -> Result<String> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(RepoScoutError::invalid_scan_path(path, "path is empty"));
    }
    if !Path::new(trimmed).is_absolute() {
        return Err(RepoScoutError::invalid_scan_path(
            path,
            "path must be absolute",
        ));
    }
    let mut normalized = trimmed.to_string();
    while normalized.len() > 1 && normalized.ends_with(std::path::MAIN_SEPARATOR) {
        normalized.pop();
    }
    Ok(normalized)
}

/// Path-prefix test on whole components: `/a/b` is under `/a` but `/ab` is not.
pub fn is_under(path: &str, root: &str) -> bool {
    Path::new(path).starts_with(Path::new(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_cache() -> (TempDir, RepositoryCache) {
        let tmp = TempDir::new().unwrap();
        let store = CacheStore::at(tmp.path().join(CACHE_FILE_NAME));
        let cache = RepositoryCache::open(store).unwrap();
        (tmp, cache)
    }

    fn repo(path: &str) -> GitRepository {
        let mut repo =
            GitRepository::invalid_placeholder(Path::new(path), None);
        repo.is_valid = true;
        repo
    }

    #[test]
    fn test_merge_preserves_pin_state() {
        let (_tmp, mut cache) = test_cache();
        cache.merge(vec![repo("/p/alpha")]).unwrap();
        cache.toggle_pin("/p/alpha").unwrap();

        let mut rescanned = repo("/p/alpha");
        rescanned.commit_count = 7;
        cache.merge(vec![rescanned]).unwrap();

        let merged = cache.get("/p/alpha").unwrap();
        assert!(merged.is_pinned);
        assert!(merged.pinned_at.is_some());
        assert_eq!(merged.commit_count, 7);
    }

    #[test]
    fn test_merge_keeps_unscanned_paths() {
        let (_tmp, mut cache) = test_cache();
        cache
            .merge(vec![repo("/p/alpha"), repo("/q/beta")])
            .unwrap();
        cache.merge(vec![repo("/p/alpha")]).unwrap();
        assert!(cache.get("/q/beta").is_some());
    }

    #[test]
    fn test_toggle_pin_unknown_path() {
        let (_tmp, mut cache) = test_cache();
        let err = cache.toggle_pin("/nope").unwrap_err();
        assert!(matches!(err, RepoScoutError::PathNotFound { .. }));
    }

    #[test]
    fn test_toggle_pin_round_trip() {
        let (_tmp, mut cache) = test_cache();
        cache.merge(vec![repo("/p/alpha")]).unwrap();

        let pinned = cache.toggle_pin("/p/alpha").unwrap();
        assert!(pinned.is_pinned && pinned.pinned_at.is_some());

        let unpinned = cache.toggle_pin("/p/alpha").unwrap();
        assert!(!unpinned.is_pinned && unpinned.pinned_at.is_none());
    }

    #[test]
    fn test_write_through_survives_reload() {
        let tmp = TempDir::new().unwrap();
        let store = CacheStore::at(tmp.path().join(CACHE_FILE_NAME));
        {
            let mut cache = RepositoryCache::open(store.clone()).unwrap();
            cache.merge(vec![repo("/p/alpha")]).unwrap();
        }
        let reloaded = RepositoryCache::open(store).unwrap();
        assert!(reloaded.get("/p/alpha").is_some());
    }

    #[test]
    fn test_collection_lifecycle() {
        let (_tmp, mut cache) = test_cache();
        cache.merge(vec![repo("/p/alpha")]).unwrap();

        let collection = cache.create_collection("work", "#3366ff").unwrap();
        cache.add_to_collection(&collection.id, "/p/alpha").unwrap();
        // Duplicate membership is a no-op
        cache.add_to_collection(&collection.id, "/p/alpha").unwrap();

        let members = cache.repositories_in_collection(&collection.id).unwrap();
        assert_eq!(members.len(), 1);

        cache.delete_collection(&collection.id).unwrap();
        assert!(cache.get("/p/alpha").is_some(), "repo outlives collection");
        assert!(cache.repositories_in_collection(&collection.id).is_err());
    }

    #[test]
    fn test_collection_unknown_targets() {
        let (_tmp, mut cache) = test_cache();
        let collection = cache.create_collection("work", "#fff").unwrap();

        let err = cache.add_to_collection("bogus", "/p/alpha").unwrap_err();
        assert!(matches!(err, RepoScoutError::CollectionNotFound { .. }));

        let err = cache
            .add_to_collection(&collection.id, "/not/cached")
            .unwrap_err();
        assert!(matches!(err, RepoScoutError::PathNotFound { .. }));
    }

    #[test]
    fn test_remove_repository_prunes_memberships() {
        let (_tmp, mut cache) = test_cache();
        cache.merge(vec![repo("/p/alpha")]).unwrap();
        let collection = cache.create_collection("work", "#fff").unwrap();
        cache.add_to_collection(&collection.id, "/p/alpha").unwrap();

        cache.remove_repository("/p/alpha").unwrap();
        assert!(cache
            .repositories_in_collection(&collection.id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_scan_path_validation_and_idempotence() {
        let (_tmp, mut cache) = test_cache();
        assert!(matches!(
            cache.add_scan_path("").unwrap_err(),
            RepoScoutError::InvalidScanPath { .. }
        ));
        assert!(matches!(
            cache.add_scan_path("relative/dir").unwrap_err(),
            RepoScoutError::InvalidScanPath { .. }
        ));

        cache.add_scan_path("/home/user/code/").unwrap();
        cache.add_scan_path("/home/user/code").unwrap();
        assert_eq!(cache.scan_paths().len(), 1);
    }

    #[test]
    fn test_scan_path_counts_are_derived() {
        let (_tmp, mut cache) = test_cache();
        cache.add_scan_path("/p").unwrap();
        cache
            .merge(vec![repo("/p/alpha"), repo("/p/deep/beta"), repo("/q/gamma")])
            .unwrap();

        let paths = cache.scan_paths();
        assert_eq!(paths[0].repository_count, 2);
    }

    #[test]
    fn test_cleanup_invalid_removes_confirmed_dead() {
        let (_tmp, mut cache) = test_cache();
        let mut dead = repo("/definitely/gone");
        dead.is_valid = false;
        cache.merge(vec![dead, repo("/p/alpha")]).unwrap();

        let removed = cache.cleanup_invalid().unwrap();
        assert_eq!(removed, 1);
        assert!(cache.get("/definitely/gone").is_none());
        assert!(cache.get("/p/alpha").is_some());
    }

    #[test]
    fn test_cleanup_revalidates_recovered_repositories() {
        let tmp = TempDir::new().unwrap();
        let repo_dir = tmp.path().join("alive");
        std::fs::create_dir_all(repo_dir.join(".git")).unwrap();

        let store = CacheStore::at(tmp.path().join(CACHE_FILE_NAME));
        let mut cache = RepositoryCache::open(store).unwrap();
        let mut record = repo(repo_dir.to_str().unwrap());
        record.is_valid = false;
        cache.merge(vec![record]).unwrap();

        let removed = cache.cleanup_invalid().unwrap();
        assert_eq!(removed, 0);
        assert!(cache.get(repo_dir.to_str().unwrap()).unwrap().is_valid);
    }

    #[test]
    fn test_is_under_component_boundaries() {
        assert!(is_under("/a/b/c", "/a"));
        assert!(is_under("/a", "/a"));
        assert!(!is_under("/ab/c", "/a"));
    }

    #[test]
    fn test_cache_info_counts() {
        let (_tmp, mut cache) = test_cache();
        let mut invalid = repo("/p/bad");
        invalid.is_valid = false;
        cache.merge(vec![repo("/p/good"), invalid]).unwrap();

        let info = cache.cache_info();
        assert_eq!(info.total_repositories, 2);
        assert_eq!(info.valid_repositories, 1);
        assert_eq!(info.invalid_repositories, 1);
        assert!(info.cache_file_size > 0);
    }
}
