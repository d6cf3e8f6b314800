//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`RepoScoutError`] which provides comprehensive error handling
//! for all repo-scout operations. It uses `thiserror` for ergonomic error definitions
//! and includes specialized error constructors for common failure scenarios.
//!
//! # Public API
//! - [`RepoScoutError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, RepoScoutError>`
//!
//! # Error Categories
//! - **Inspection**: A path that is not (or no longer is) a git repository
//! - **Lookup**: Unknown repository paths or collection ids
//! - **Scanning**: Concurrent scan rejection, invalid scan roots
//! - **Cache persistence**: Serialization, file system, missing cache errors

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for repo-scout
#[derive(Error, Debug)]
pub enum RepoScoutError {
    // Inspection errors
    #[error("Not a git repository: {path}")]
    NotAGitDirectory { path: PathBuf },

    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),

    // Lookup errors
    #[error("Repository is not in the cache: {path}")]
    PathNotFound { path: String },

    #[error("Collection does not exist: {id}")]
    CollectionNotFound { id: String },

    // Scan errors
    #[error("A scan is already in progress")]
    AlreadyScanning,

    #[error("Invalid scan path '{path}': {reason}")]
    InvalidScanPath { path: String, reason: String },

    // Cache persistence errors
    #[error("Could not find application data directory")]
    DataDirectoryNotFound,

    #[error("Failed to create data directory '{path}': {source}")]
    DataDirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize cache data: {source}")]
    CacheSerializationFailed { source: serde_json::Error },

    #[error("Failed to write cache file '{path}': {source}")]
    CacheWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read cache file '{path}': {source}")]
    CacheReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse cache file '{path}': {source}")]
    CacheParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    // Passthrough conversions
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using RepoScoutError
pub type Result<T> = std::result::Result<T, RepoScoutError>;

impl RepoScoutError {
    /// Create a not-a-git-directory error
    pub fn not_a_git_directory(path: impl Into<PathBuf>) -> Self {
        Self::NotAGitDirectory { path: path.into() }
    }

    /// Create a path not found error
    pub fn path_not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    /// Create a collection not found error
    pub fn collection_not_found(id: impl Into<String>) -> Self {
        Self::CollectionNotFound { id: id.into() }
    }

    /// Create an invalid scan path error
    pub fn invalid_scan_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidScanPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a data directory creation failed error
    pub fn data_directory_creation_failed(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::DataDirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache serialization failed error
    pub fn cache_serialization_failed(source: serde_json::Error) -> Self {
        Self::CacheSerializationFailed { source }
    }

    /// Create a cache write failed error
    pub fn cache_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheWriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache read failed error
    pub fn cache_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache parse failed error
    pub fn cache_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CacheParseFailed {
            path: path.into(),
            source,
        }
    }
}
