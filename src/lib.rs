//! Repo Scout - discovers, indexes, and caches Git repositories on the local filesystem.
//!
//! This library provides the core functionality for repo-scout: a bounded
//! recursive discovery walk, per-repository metadata inspection, a durable
//! write-through cache with user annotations (pins, collections), and
//! indexed queries over the cached set. It is designed to be fast, type-safe,
//! and safe to point at arbitrary directory trees.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module, which provides:
//! - Repository discovery and classification
//! - Metadata inspection backed by `git2`
//! - The persistent repository cache and its merge semantics
//! - Indexed search and recent-lookup acceleration
//! - Scan orchestration with progress events and cancellation

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    classify,
    print_detail,
    // Output formatting
    print_error,
    print_info,
    print_section_header,
    print_success,

    CacheData,
    CacheInfo,
    CacheStore,
    // Discovery
    CancelToken,
    Collection,
    DirectoryWalker,
    // Data model
    GitRepository,
    NodeModulesInfo,
    NodeModulesScanner,
    PathDecision,
    QueryIndex,
    // Cache and indexes
    RepositoryCache,
    // Inspection
    RepositoryInspector,
    // Error handling
    RepoScoutError,
    Result,
    // Orchestration
    ScanCoordinator,
    ScanPath,
    ScanProgress,
    ScanState,
    SearchFilters,
};
