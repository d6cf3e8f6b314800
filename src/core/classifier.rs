//! Directory classification for the discovery walk.
//!
//! Decides, for each directory the walker visits, whether it is a repository
//! root, a build/dependency directory that must never be descended into, a
//! hidden directory, or an ordinary directory to keep walking.

use std::path::Path;

/// Outcome of classifying a single directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathDecision {
    /// Contains a `.git` entry; yielded as a discovery result and not
    /// descended into (nested repositories such as submodules are not
    /// reported separately).
    RepositoryRoot,
    /// Matches the build/dependency deny-list; pruned entirely.
    ExcludedBuildArtifact,
    /// Dot-directory other than `.git`; pruned.
    SkipHidden,
    /// Ordinary directory; traversal continues into children.
    Descend,
}

/// Directory names that are never descended into during discovery.
/// `node_modules` is still visited by the dedicated dependency scanner when
/// sizing an already-identified repository.
pub const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    "out",
    ".next",
    "target",
    "vendor",
    "bower_components",
    "__pycache__",
    ".venv",
    "venv",
    "DerivedData",
    "Pods",
];

/// Classify a directory for the discovery walk.
///
/// Repository-root detection runs first: a repository root containing a
/// directory named like a build artifact is still a repository root, and its
/// internals are never searched for further repositories.
pub fn classify(path: &Path) -> PathDecision {
    if has_git_entry(path) {
        return PathDecision::RepositoryRoot;
    }

    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        // Undecodable names are skipped rather than guessed at
        None => return PathDecision::SkipHidden,
    };

    if EXCLUDED_DIRS.contains(&name) {
        return PathDecision::ExcludedBuildArtifact;
    }

    if name.starts_with('.') {
        return PathDecision::SkipHidden;
    }

    PathDecision::Descend
}

/// True when the directory contains a `.git` entry. Both the usual `.git`
/// directory and the `gitdir:` pointer file used by worktrees and submodules
/// count.
pub fn has_git_entry(path: &Path) -> bool {
    path.join(".git").exists()
}
