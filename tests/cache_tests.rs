//! Cache reconciliation semantics: annotation preservation, merge
//! non-destructiveness, idempotence, cleanup and deletion.

mod common;

use common::fixtures::*;
use std::collections::HashMap;
use tempfile::TempDir;

#[test]
fn rescan_preserves_pins_and_collection_membership() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    let repo_path = init_git_repo_with_commit(tmp.path(), "annotated");

    let state_dir = TempDir::new()?;
    let mut coordinator = coordinator_in(state_dir.path());
    let root = path_str(tmp.path());
    coordinator.scan(Some(vec![root.clone()]), true, None)?;

    let key = path_str(&repo_path);
    coordinator.toggle_pin(&key)?;
    let collection = coordinator.create_collection("work", "#3366ff")?;
    coordinator.add_to_collection(&collection.id, &key)?;

    // Rediscover the same path
    coordinator.scan(Some(vec![root]), true, None)?;

    let repo = coordinator.lookup(&key).expect("still cached");
    assert!(repo.is_pinned);
    assert!(repo.pinned_at.is_some());
    let members = coordinator.repositories_in_collection(&collection.id)?;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].path, key);
    Ok(())
}

#[test]
fn subset_scan_never_removes_other_repositories() -> anyhow::Result<()> {
    let tmp_a = TempDir::new()?;
    let tmp_b = TempDir::new()?;
    let a = init_git_repo_with_commit(tmp_a.path(), "alpha");
    let b = init_git_repo_with_commit(tmp_b.path(), "beta");

    let state_dir = TempDir::new()?;
    let mut coordinator = coordinator_in(state_dir.path());
    coordinator.scan(
        Some(vec![path_str(tmp_a.path()), path_str(tmp_b.path())]),
        true,
        None,
    )?;
    assert_eq!(coordinator.load_cached().len(), 2);

    // A partial scan of only the first tree must not evict the second
    coordinator.scan(Some(vec![path_str(tmp_a.path())]), true, None)?;

    let cached = coordinator.load_cached();
    assert_eq!(cached.len(), 2);
    assert!(cached.iter().any(|r| r.path == path_str(&a)));
    assert!(cached.iter().any(|r| r.path == path_str(&b)));
    Ok(())
}

#[test]
fn scanning_twice_is_idempotent_except_timestamps() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    init_git_repo_with_commit(tmp.path(), "stable");

    let state_dir = TempDir::new()?;
    let mut coordinator = coordinator_in(state_dir.path());
    let root = path_str(tmp.path());

    let first = coordinator.scan(Some(vec![root.clone()]), true, None)?;
    let second = coordinator.scan(Some(vec![root]), true, None)?;

    let index_by_path =
        |repos: &[repo_scout::GitRepository]| -> HashMap<String, repo_scout::GitRepository> {
            repos.iter().map(|r| (r.path.clone(), r.clone())).collect()
        };
    let first = index_by_path(&first);
    let second = index_by_path(&second);
    assert_eq!(first.len(), second.len());

    for (path, before) in &first {
        let after = &second[path];
        assert_eq!(before.name, after.name);
        assert_eq!(before.commit_count, after.commit_count);
        assert_eq!(before.current_branch, after.current_branch);
        assert_eq!(before.branches, after.branches);
        assert_eq!(before.file_types, after.file_types);
        assert_eq!(before.size_mb, after.size_mb);
    }
    Ok(())
}

#[test]
fn cache_persists_across_coordinator_instances() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    init_git_repo_with_commit(tmp.path(), "durable");

    let state_dir = TempDir::new()?;
    {
        let mut coordinator = coordinator_in(state_dir.path());
        coordinator.scan(Some(vec![path_str(tmp.path())]), true, None)?;
    }

    let coordinator = coordinator_in(state_dir.path());
    let cached = coordinator.load_cached();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].name, "durable");
    Ok(())
}

#[test]
fn cleanup_removes_only_confirmed_missing_repositories() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    let doomed = init_git_repo_with_commit(tmp.path(), "doomed");
    init_git_repo_with_commit(tmp.path(), "survivor");

    let state_dir = TempDir::new()?;
    let mut coordinator = coordinator_in(state_dir.path());
    let root = path_str(tmp.path());
    coordinator.scan(Some(vec![root.clone()]), true, None)?;

    // Remove one repository from disk; refreshing it degrades the record
    std::fs::remove_dir_all(&doomed)?;
    let key = path_str(&doomed);
    assert!(coordinator.refresh_one(&key).is_err());
    assert!(!coordinator.lookup(&key).expect("record kept").is_valid);

    let removed = coordinator.cleanup_invalid()?;
    assert_eq!(removed, 1);
    assert!(coordinator.lookup(&key).is_none());
    assert_eq!(coordinator.load_cached().len(), 1);
    Ok(())
}

#[test]
fn delete_one_removes_disk_tree_and_record() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    let repo_path = init_git_repo_with_commit(tmp.path(), "condemned");

    let state_dir = TempDir::new()?;
    let mut coordinator = coordinator_in(state_dir.path());
    coordinator.scan(Some(vec![path_str(tmp.path())]), true, None)?;

    let key = path_str(&repo_path);
    coordinator.delete_one(&key)?;

    assert!(!repo_path.exists());
    assert!(coordinator.load_cached().is_empty());

    // A fresh coordinator over the same cache file agrees
    let coordinator = coordinator_in(state_dir.path());
    assert!(coordinator.load_cached().is_empty());
    Ok(())
}

#[test]
fn refresh_preserves_pin_state() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    let repo_path = init_git_repo_with_commit(tmp.path(), "pinned");

    let state_dir = TempDir::new()?;
    let mut coordinator = coordinator_in(state_dir.path());
    coordinator.scan(Some(vec![path_str(tmp.path())]), true, None)?;

    let key = path_str(&repo_path);
    coordinator.toggle_pin(&key)?;
    commit_file(&repo_path, "more.txt", "content\n", "Another commit");

    let refreshed = coordinator.refresh_one(&key)?;
    assert!(refreshed.is_pinned);
    assert_eq!(refreshed.commit_count, 2);
    Ok(())
}

#[test]
fn scan_path_counts_follow_the_repository_set() -> anyhow::Result<()> {
    let tmp = TempDir::new()?;
    init_git_repo_with_commit(tmp.path(), "one");
    init_git_repo_with_commit(tmp.path(), "two");

    let state_dir = TempDir::new()?;
    let mut coordinator = coordinator_in(state_dir.path());
    let root = path_str(tmp.path());
    coordinator.add_scan_path(&root)?;
    coordinator.scan(None, true, None)?;

    let paths = coordinator.scan_paths();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].repository_count, 2);
    assert!(paths[0].last_scanned.is_some());
    Ok(())
}
