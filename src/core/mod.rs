//! Core functionality for the repo-scout tool.
//!
//! This module provides the fundamental building blocks for repository
//! discovery, inspection, caching, and indexed queries.

pub mod cache;
pub mod classifier;
pub mod coordinator;
pub mod dirs;
pub mod error;
pub mod index;
pub mod inspector;
pub mod node_modules;
pub mod output;
pub mod types;
pub mod walker;

// === Error handling ===
// Core error types and result type used throughout the application
pub use error::{RepoScoutError, Result};

// === Data model ===
// Records that flow from the scanner into the cache and out through queries
pub use types::{
    CacheInfo, Collection, GitRepository, NodeModulesInfo, ScanPath, ScanProgress, SearchFilters,
};

// === Discovery ===
// Classification and bounded traversal of candidate directories
pub use classifier::{classify, PathDecision, EXCLUDED_DIRS};
pub use walker::{CancelToken, DirectoryWalker, DEFAULT_MAX_DEPTH};

// === Inspection ===
// Metadata extraction for confirmed repository roots
pub use inspector::{RepositoryInspector, COMMIT_COUNT_CEILING};
pub use node_modules::NodeModulesScanner;

// === Cache and indexes ===
// Durable storage, merge semantics, and query acceleration
pub use cache::{CacheData, CacheStore, RepositoryCache};
pub use index::QueryIndex;

// === Orchestration ===
// The scan state machine and library facade
pub use coordinator::{ScanCoordinator, ScanState};

// === Output formatting ===
// Unified output formatting for consistent CLI presentation
pub use output::{print_detail, print_error, print_info, print_section_header, print_success};
