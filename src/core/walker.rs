//! Bounded, lazy discovery walk over configured root directories.
//!
//! [`DirectoryWalker`] produces a [`RepoWalk`] iterator that yields repository
//! root paths one at a time. Traversal is depth-bounded, never follows
//! symlinks for descent, absorbs per-directory I/O errors, and stops promptly
//! when the shared [`CancelToken`] fires. Progress events go out through an
//! optional mpsc sender after each directory visit.

use crate::core::classifier::{classify, PathDecision};
use crate::core::types::ScanProgress;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use walkdir::WalkDir;

/// Default bound on directory levels below each scan root.
///
/// A hard safety limit against pathological trees (deeply nested
/// `node_modules`, symlink farms); repositories deeper than this are not
/// discovered.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Cooperative cancellation flag shared between a scan driver and its walker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Re-arm the token for a new scan without invalidating held clones.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Configured discovery walker. Cheap to construct; each call to [`walk`]
/// starts an independent lazy traversal.
///
/// [`walk`]: DirectoryWalker::walk
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    max_depth: usize,
}

impl Default for DirectoryWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryWalker {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Start a lazy walk over `roots`. Roots that do not exist or are not
    /// directories are skipped with a log entry. Dropping the returned
    /// iterator early performs no further filesystem work.
    pub fn walk(
        &self,
        roots: &[PathBuf],
        progress: Option<Sender<ScanProgress>>,
        cancel: CancelToken,
    ) -> RepoWalk {
        let roots = roots
            .iter()
            .filter(|root| {
                let ok = root.is_dir();
                if !ok {
                    log::warn!("Skipping scan root {}: not a directory", root.display());
                }
                ok
            })
            .cloned()
            .collect();

        RepoWalk {
            roots,
            current: None,
            max_depth: self.max_depth,
            progress,
            cancel,
            repos_found: 0,
        }
    }
}

/// Lazy iterator over discovered repository roots.
pub struct RepoWalk {
    roots: VecDeque<PathBuf>,
    current: Option<walkdir::IntoIter>,
    max_depth: usize,
    progress: Option<Sender<ScanProgress>>,
    cancel: CancelToken,
    repos_found: u32,
}

impl RepoWalk {
    pub fn repos_found(&self) -> u32 {
        self.repos_found
    }

    fn emit_progress(&self, path: &Path) {
        if let Some(sender) = &self.progress {
            let _ = sender.send(ScanProgress {
                current_path: path.to_string_lossy().to_string(),
                repos_found: self.repos_found,
                completed: false,
            });
        }
    }
}

impl Iterator for RepoWalk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            // Checked between directory visits so cancellation stops
            // filesystem work promptly without interrupting a single listing.
            if self.cancel.is_cancelled() {
                return None;
            }

            let mut iter = match self.current.take() {
                Some(iter) => iter,
                None => {
                    let root = self.roots.pop_front()?;
                    log::debug!("Walking scan root {}", root.display());
                    WalkDir::new(root)
                        .max_depth(self.max_depth)
                        .follow_links(false)
                        .into_iter()
                }
            };

            let entry = match iter.next() {
                None => continue,
                Some(Err(err)) => {
                    // Permission errors and vanished entries skip the subtree,
                    // never the walk.
                    log::debug!("Skipping {:?}: {}", err.path(), err);
                    self.current = Some(iter);
                    continue;
                }
                Some(Ok(entry)) => entry,
            };

            // Symlinked directories are classified (a link target may be a
            // repository root) but never descended into.
            let is_dir = entry.file_type().is_dir()
                || (entry.path_is_symlink() && entry.path().is_dir());
            if !is_dir {
                self.current = Some(iter);
                continue;
            }

            match classify(entry.path()) {
                PathDecision::RepositoryRoot => {
                    if entry.file_type().is_dir() {
                        iter.skip_current_dir();
                    }
                    self.current = Some(iter);
                    self.repos_found += 1;
                    self.emit_progress(entry.path());
                    return Some(entry.path().to_path_buf());
                }
                PathDecision::ExcludedBuildArtifact | PathDecision::SkipHidden => {
                    // A configured root is walked regardless of its name.
                    if entry.depth() > 0 && entry.file_type().is_dir() {
                        iter.skip_current_dir();
                    }
                    self.current = Some(iter);
                    self.emit_progress(entry.path());
                }
                PathDecision::Descend => {
                    self.current = Some(iter);
                    self.emit_progress(entry.path());
                }
            }
        }
    }
}
