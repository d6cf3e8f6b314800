//! Metadata extraction for a confirmed repository root.
//!
//! [`RepositoryInspector`] turns a repository path into a full
//! [`GitRepository`] record: branch facts and commit counts through `git2`,
//! then a single working-tree walk for byte size and the file-extension
//! histogram. Cheap checks run first; everything past the `.git` check
//! degrades to an absent field instead of failing the inspection.

use crate::core::classifier::{classify, has_git_entry, PathDecision};
use crate::core::error::{RepoScoutError, Result};
use crate::core::node_modules::{bytes_to_mb, NodeModulesScanner};
use crate::core::types::{display_name, GitRepository};
use chrono::{DateTime, Utc};
use git2::{BranchType, Repository};
use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

/// Upper bound on commit counting. Histories longer than this report the
/// ceiling as their count; the figure is an approximation, not a truncation
/// error.
pub const COMMIT_COUNT_CEILING: usize = 100_000;

#[derive(Debug, Clone, Default)]
pub struct RepositoryInspector {
    node_modules: NodeModulesScanner,
}

impl RepositoryInspector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect a repository from scratch. The dependency-directory scan always
    /// runs; use [`inspect_cached`] to reuse a previous record's figures.
    ///
    /// [`inspect_cached`]: RepositoryInspector::inspect_cached
    pub fn inspect(&self, repo_root: &Path) -> Result<GitRepository> {
        self.inspect_inner(repo_root, None)
    }

    /// Inspect a repository, reusing the previous record's [`NodeModulesInfo`]
    /// when the root `package.json` has not changed since it was computed.
    ///
    /// [`NodeModulesInfo`]: crate::core::types::NodeModulesInfo
    pub fn inspect_cached(
        &self,
        repo_root: &Path,
        previous: Option<&GitRepository>,
    ) -> Result<GitRepository> {
        self.inspect_inner(repo_root, previous)
    }

    fn inspect_inner(
        &self,
        repo_root: &Path,
        previous: Option<&GitRepository>,
    ) -> Result<GitRepository> {
        if !has_git_entry(repo_root) {
            return Err(RepoScoutError::not_a_git_directory(repo_root));
        }
        let repo = Repository::open(repo_root)
            .map_err(|_| RepoScoutError::not_a_git_directory(repo_root))?;

        log::debug!("Inspecting {}", repo_root.display());

        let current_branch = current_branch(&repo);
        let branches = local_branches(&repo);
        let remote_url = remote_url(&repo);
        let (commit_count, last_commit_date) = commit_stats(&repo);
        let (size_bytes, file_types) = worktree_stats(repo_root);

        let node_modules_info = match previous.and_then(|p| p.node_modules_info.as_ref()) {
            Some(cached) if !self.node_modules.is_stale(repo_root, cached) => {
                Some(cached.clone())
            }
            _ => self.node_modules.scan(repo_root),
        };

        Ok(GitRepository {
            name: display_name(repo_root),
            path: repo_root.to_string_lossy().to_string(),
            size_mb: bytes_to_mb(size_bytes),
            file_types,
            last_commit_date,
            current_branch,
            branches,
            remote_url,
            commit_count,
            last_analyzed: Utc::now(),
            is_valid: true,
            is_pinned: false,
            pinned_at: None,
            node_modules_info,
        })
    }
}

/// Symbolic HEAD branch name; `None` for detached HEAD or unborn branches.
fn current_branch(repo: &Repository) -> Option<String> {
    let head = repo.head().ok()?;
    if head.is_branch() {
        head.shorthand().map(|s| s.to_string())
    } else {
        None
    }
}

fn local_branches(repo: &Repository) -> Vec<String> {
    let mut branches = Vec::new();
    match repo.branches(Some(BranchType::Local)) {
        Ok(iter) => {
            for branch in iter {
                if let Ok((branch, _)) = branch {
                    if let Some(name) = branch.name().ok().flatten() {
                        branches.push(name.to_string());
                    }
                }
            }
        }
        Err(err) => log::warn!("Could not enumerate branches: {err}"),
    }
    branches
}

/// URL of `origin` when configured, otherwise the first configured remote.
fn remote_url(repo: &Repository) -> Option<String> {
    if let Ok(remote) = repo.find_remote("origin") {
        if let Some(url) = remote.url() {
            return Some(url.to_string());
        }
    }
    let remotes = repo.remotes().ok()?;
    let first = remotes.get(0)?;
    repo.find_remote(first)
        .ok()
        .and_then(|remote| remote.url().map(|s| s.to_string()))
}

/// Commits reachable from HEAD (capped at [`COMMIT_COUNT_CEILING`]) and the
/// timestamp of the most recent one.
fn commit_stats(repo: &Repository) -> (u32, Option<DateTime<Utc>>) {
    let mut revwalk = match repo.revwalk() {
        Ok(revwalk) => revwalk,
        Err(err) => {
            log::warn!("Could not start revwalk: {err}");
            return (0, None);
        }
    };
    if revwalk.push_head().is_err() {
        // Unborn branch: nothing to count
        return (0, None);
    }

    let mut commit_count = 0u32;
    let mut last_commit_date = None;
    for oid in revwalk.take(COMMIT_COUNT_CEILING).flatten() {
        commit_count += 1;
        if last_commit_date.is_none() {
            if let Ok(commit) = repo.find_commit(oid) {
                last_commit_date = DateTime::from_timestamp(commit.time().seconds(), 0);
            }
        }
    }
    (commit_count, last_commit_date)
}

/// Single working-tree pass accumulating total byte size and the per-extension
/// file count. Shares the discovery walk's exclusion semantics: hidden and
/// build/dependency directories are pruned, `.git` included.
fn worktree_stats(repo_root: &Path) -> (u64, HashMap<String, u32>) {
    let mut total = 0u64;
    let mut file_types = HashMap::new();

    let mut walker = WalkDir::new(repo_root).follow_links(false).into_iter();
    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::debug!("Skipping {:?}: {}", err.path(), err);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            if entry.depth() == 0 {
                continue;
            }
            match classify(entry.path()) {
                PathDecision::ExcludedBuildArtifact | PathDecision::SkipHidden => {
                    walker.skip_current_dir();
                }
                // Nested roots (submodules) belong to the parent's footprint
                PathDecision::RepositoryRoot | PathDecision::Descend => {}
            }
            continue;
        }

        if entry.file_type().is_file() {
            if let Ok(metadata) = entry.metadata() {
                total = total.saturating_add(metadata.len());
            }
            if let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) {
                *file_types.entry(ext.to_lowercase()).or_insert(0) += 1;
            }
        }
    }

    (total, file_types)
}
