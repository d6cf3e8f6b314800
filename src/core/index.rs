//! Secondary indexes over the cache contents.
//!
//! [`QueryIndex`] is rebuilt wholesale from [`CacheData`] after every cache
//! mutation and swapped in as a unit, so readers only ever observe a
//! pre-mutation or post-mutation snapshot. At the scale this tool operates
//! at (thousands of repositories) a full rebuild is cheaper to reason about
//! than incremental maintenance and fast enough not to matter.
//!
//! Lookup structures:
//! - name prefix: `BTreeMap` keyed by lowercased display name, range-scanned
//! - size: 50 MB buckets, candidates re-checked against exact bounds
//! - file type: extension -> paths map
//! - path prefix: component trie over absolute paths
//! - repeat lookups: bounded LRU over full records

use crate::core::cache::CacheData;
use crate::core::types::{GitRepository, SearchFilters};
use lru::LruCache;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::num::NonZeroUsize;
use std::path::Path;

/// Width of a size bucket, in megabytes.
const SIZE_BUCKET_MB: u64 = 50;

/// Capacity of the recent-lookup cache.
const RECENT_LOOKUP_CAPACITY: usize = 256;

#[derive(Debug, Default, Clone)]
struct TrieNode {
    children: HashMap<String, TrieNode>,
    /// Full repository path terminating at this node, if any.
    repository: Option<String>,
}

/// Component trie over absolute repository paths. Answers "which cached
/// repositories live under this directory" in time proportional to the
/// prefix depth plus the result size.
#[derive(Debug, Default, Clone)]
pub struct PathTrie {
    root: TrieNode,
}

impl PathTrie {
    pub fn insert(&mut self, path: &str) {
        let mut current = &mut self.root;
        for component in components(path) {
            current = current
                .children
                .entry(component.to_string())
                .or_default();
        }
        current.repository = Some(path.to_string());
    }

    pub fn under(&self, prefix: &str) -> Vec<String> {
        let mut current = &self.root;
        for component in components(prefix) {
            match current.children.get(component) {
                Some(node) => current = node,
                None => return Vec::new(),
            }
        }
        let mut result = Vec::new();
        collect(current, &mut result);
        result
    }
}

fn components(path: &str) -> impl Iterator<Item = &str> {
    Path::new(path)
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(os) => os.to_str(),
            _ => None,
        })
}

fn collect(node: &TrieNode, result: &mut Vec<String>) {
    if let Some(path) = &node.repository {
        result.push(path.clone());
    }
    for child in node.children.values() {
        collect(child, result);
    }
}

/// Secondary indexes plus the recent-lookup LRU.
pub struct QueryIndex {
    by_name: BTreeMap<String, Vec<String>>,
    by_size_bucket: HashMap<u64, Vec<String>>,
    by_file_type: HashMap<String, Vec<String>>,
    path_trie: PathTrie,
    recent: LruCache<String, GitRepository>,
}

impl QueryIndex {
    pub fn empty() -> Self {
        Self {
            by_name: BTreeMap::new(),
            by_size_bucket: HashMap::new(),
            by_file_type: HashMap::new(),
            path_trie: PathTrie::default(),
            recent: LruCache::new(NonZeroUsize::new(RECENT_LOOKUP_CAPACITY).unwrap()),
        }
    }

    /// Build a fresh index over the given snapshot. The recent-lookup cache
    /// starts empty: entries cached against the previous snapshot may be
    /// stale.
    pub fn rebuild(data: &CacheData) -> Self {
        let mut index = Self::empty();
        for repo in data.repositories.values() {
            index
                .by_name
                .entry(repo.name.to_lowercase())
                .or_default()
                .push(repo.path.clone());
            index
                .by_size_bucket
                .entry(size_bucket(repo.size_mb))
                .or_default()
                .push(repo.path.clone());
            for ext in repo.file_types.keys() {
                index
                    .by_file_type
                    .entry(ext.clone())
                    .or_default()
                    .push(repo.path.clone());
            }
            index.path_trie.insert(&repo.path);
        }
        log::debug!("Rebuilt query index over {} repositories", data.repositories.len());
        index
    }

    /// Paths of repositories whose display name starts with `prefix`,
    /// case-insensitively. No result ordering is guaranteed.
    pub fn by_name_prefix(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        self.by_name
            .range(prefix.clone()..)
            .take_while(|(name, _)| name.starts_with(&prefix))
            .flat_map(|(_, paths)| paths.iter().cloned())
            .collect()
    }

    /// Paths of repositories with `size_mb` in `[min, max]`, inclusive.
    pub fn by_size_range(&self, min_mb: f64, max_mb: f64, data: &CacheData) -> Vec<String> {
        let min_bucket = size_bucket(min_mb);
        // An open upper bound only needs to reach the largest populated bucket
        let max_bucket = size_bucket(max_mb)
            .min(self.by_size_bucket.keys().copied().max().unwrap_or(0));
        let mut result = Vec::new();
        for bucket in (min_bucket..=max_bucket).step_by(SIZE_BUCKET_MB as usize) {
            let Some(paths) = self.by_size_bucket.get(&bucket) else {
                continue;
            };
            // Buckets are coarse; re-check the exact bounds.
            for path in paths {
                if let Some(repo) = data.repositories.get(path) {
                    if repo.size_mb >= min_mb && repo.size_mb <= max_mb {
                        result.push(path.clone());
                    }
                }
            }
        }
        result
    }

    /// Paths of repositories whose histogram contains `ext` (lowercased).
    pub fn by_file_type(&self, ext: &str) -> Vec<String> {
        self.by_file_type
            .get(&ext.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    /// Paths of cached repositories under the given directory.
    pub fn under_path(&self, prefix: &str) -> Vec<String> {
        self.path_trie.under(prefix)
    }

    /// Full-record lookup through the bounded LRU. Repeat lookups of the same
    /// path within a session skip the main map.
    pub fn recent_lookup(&mut self, path: &str, data: &CacheData) -> Option<GitRepository> {
        if let Some(repo) = self.recent.get(path) {
            return Some(repo.clone());
        }
        let repo = data.repositories.get(path)?.clone();
        self.recent.put(path.to_string(), repo.clone());
        Some(repo)
    }

    /// Intersect all active filters and resolve full records. An empty filter
    /// set returns every cached repository.
    pub fn search(&self, filters: &SearchFilters, data: &CacheData) -> Vec<GitRepository> {
        let mut candidates: Option<HashSet<String>> = None;

        let mut restrict = |paths: Vec<String>| {
            let paths: HashSet<String> = paths.into_iter().collect();
            candidates = Some(match candidates.take() {
                Some(existing) => existing.intersection(&paths).cloned().collect(),
                None => paths,
            });
        };

        if let Some(prefix) = &filters.name_prefix {
            restrict(self.by_name_prefix(prefix));
        }
        if filters.min_size_mb.is_some() || filters.max_size_mb.is_some() {
            let min = filters.min_size_mb.unwrap_or(0.0);
            let max = filters.max_size_mb.unwrap_or(f64::MAX);
            restrict(self.by_size_range(min, max, data));
        }
        if let Some(ext) = &filters.file_type {
            restrict(self.by_file_type(ext));
        }
        if let Some(prefix) = &filters.path_prefix {
            restrict(self.under_path(prefix));
        }

        match candidates {
            Some(paths) => paths
                .iter()
                .filter_map(|path| data.repositories.get(path))
                .cloned()
                .collect(),
            None => data.repositories.values().cloned().collect(),
        }
    }
}

fn size_bucket(size_mb: f64) -> u64 {
    (size_mb.max(0.0) as u64 / SIZE_BUCKET_MB) * SIZE_BUCKET_MB
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn data_with(repos: &[(&str, f64)]) -> CacheData {
        let mut data = CacheData::default();
        for (path, size_mb) in repos {
            let mut repo = GitRepository::invalid_placeholder(Path::new(path), None);
            repo.is_valid = true;
            repo.size_mb = *size_mb;
            repo.file_types.insert("rs".to_string(), 3);
            data.repositories.insert(repo.path.clone(), repo);
        }
        data
    }

    #[test]
    fn test_name_prefix_is_case_insensitive() {
        let data = data_with(&[("/p/Alpha", 1.0), ("/p/alphabet", 1.0), ("/p/beta", 1.0)]);
        let index = QueryIndex::rebuild(&data);
        let mut found = index.by_name_prefix("ALPH");
        found.sort();
        assert_eq!(found, vec!["/p/Alpha", "/p/alphabet"]);
    }

    #[test]
    fn test_size_range_is_inclusive() {
        let data = data_with(&[
            ("/p/a", 50.0),
            ("/p/b", 100.0),
            ("/p/c", 300.0),
            ("/p/d", 500.0),
            ("/p/e", 900.0),
        ]);
        let index = QueryIndex::rebuild(&data);
        let mut found = index.by_size_range(100.0, 500.0, &data);
        found.sort();
        assert_eq!(found, vec!["/p/b", "/p/c", "/p/d"]);
    }

    #[test]
    fn test_by_file_type() {
        let mut data = data_with(&[("/p/a", 1.0)]);
        let mut other = GitRepository::invalid_placeholder(Path::new("/p/b"), None);
        other.file_types.insert("py".to_string(), 1);
        data.repositories.insert(other.path.clone(), other);

        let index = QueryIndex::rebuild(&data);
        assert_eq!(index.by_file_type("rs"), vec!["/p/a"]);
        assert_eq!(index.by_file_type("PY"), vec!["/p/b"]);
        assert!(index.by_file_type("go").is_empty());
    }

    #[test]
    fn test_path_trie_component_boundaries() {
        let data = data_with(&[("/home/user/a", 1.0), ("/home/username/b", 1.0)]);
        let index = QueryIndex::rebuild(&data);
        assert_eq!(index.under_path("/home/user"), vec!["/home/user/a"]);
        let mut all = index.under_path("/home");
        all.sort();
        assert_eq!(all, vec!["/home/user/a", "/home/username/b"]);
        assert!(index.under_path("/elsewhere").is_empty());
    }

    #[test]
    fn test_recent_lookup_caches_and_evicts() {
        let data = data_with(&[("/p/a", 1.0)]);
        let mut index = QueryIndex::rebuild(&data);

        assert!(index.recent_lookup("/p/a", &data).is_some());
        assert!(index.recent.contains("/p/a"));
        assert!(index.recent_lookup("/missing", &data).is_none());

        // Fill past capacity; the oldest entry is evicted first
        for i in 0..RECENT_LOOKUP_CAPACITY {
            index
                .recent
                .put(format!("/fill/{i}"), data.repositories["/p/a"].clone());
        }
        assert!(!index.recent.contains("/p/a"));
    }

    #[test]
    fn test_search_intersects_filters() {
        let data = data_with(&[("/p/alpha", 10.0), ("/p/alphabet", 200.0), ("/q/alpine", 10.0)]);
        let index = QueryIndex::rebuild(&data);

        let filters = SearchFilters {
            name_prefix: Some("alp".to_string()),
            max_size_mb: Some(50.0),
            path_prefix: Some("/p".to_string()),
            ..Default::default()
        };
        let found = index.search(&filters, &data);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "/p/alpha");
    }

    #[test]
    fn test_search_without_filters_returns_everything() {
        let data = data_with(&[("/p/a", 1.0), ("/p/b", 2.0)]);
        let index = QueryIndex::rebuild(&data);
        assert_eq!(index.search(&SearchFilters::default(), &data).len(), 2);
    }
}
