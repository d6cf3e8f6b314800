//! Test data generation utilities and predefined scenarios
//!
//! Provides functions for building synthetic directory trees, real git
//! repositories (via the git CLI, to stay independent of the code under
//! test), and coordinators backed by throwaway cache files.

#![allow(dead_code)]

use repo_scout::core::{CacheStore, RepositoryCache, ScanCoordinator};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Coordinator whose cache file lives inside the given directory, so every
/// test gets isolated persistent state.
pub fn coordinator_in(dir: &Path) -> ScanCoordinator {
    let store = CacheStore::at(dir.join("repositories_cache.json"));
    let cache = RepositoryCache::open(store).expect("open test cache");
    ScanCoordinator::new(cache)
}

/// Initialize a real git repository at `parent/name` with basic config so
/// commits never prompt.
pub fn init_git_repo(parent: &Path, name: &str) -> PathBuf {
    let repo_path = parent.join(name);
    fs::create_dir_all(&repo_path).expect("create repo dir");

    run_git(&repo_path, &["init", "-b", "main"]);
    run_git(&repo_path, &["config", "user.name", "Test User"]);
    run_git(&repo_path, &["config", "user.email", "test@example.com"]);

    repo_path
}

/// Initialize a git repository and give it one commit containing `file`.
pub fn init_git_repo_with_commit(parent: &Path, name: &str) -> PathBuf {
    let repo_path = init_git_repo(parent, name);
    commit_file(&repo_path, "initial.txt", "initial content\n", "Initial commit");
    repo_path
}

pub fn commit_file(repo_path: &Path, file: &str, content: &str, message: &str) {
    fs::write(repo_path.join(file), content).expect("write file");
    run_git(repo_path, &["add", file]);
    run_git(repo_path, &["commit", "-m", message]);
}

fn run_git(repo_path: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// A bare `.git` directory is enough for discovery-only tests that never
/// inspect repository internals.
pub fn fake_repo(parent: &Path, rel: &str) -> PathBuf {
    let repo_path = parent.join(rel);
    fs::create_dir_all(repo_path.join(".git")).expect("create fake repo");
    repo_path
}

pub fn write_sized_file(path: &Path, size: usize) {
    fs::create_dir_all(path.parent().unwrap()).expect("create parent");
    fs::write(path, vec![b'x'; size]).expect("write sized file");
}

/// The example tree from the discovery contract:
/// `root/{A/.git, B/node_modules/fake_repo/.git, C/sub/.git}`.
pub fn example_tree() -> (TempDir, Vec<PathBuf>) {
    let tmp = TempDir::new().expect("create temp dir");
    let a = fake_repo(tmp.path(), "A");
    fake_repo(tmp.path(), "B/node_modules/fake_repo");
    let c_sub = fake_repo(tmp.path(), "C/sub");
    (tmp, vec![a, c_sub])
}

pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
