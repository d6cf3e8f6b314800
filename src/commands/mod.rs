pub mod cache_cmd;
pub mod collections;
pub mod query;
pub mod repo;
pub mod scan;
pub mod scan_paths;

pub use cache_cmd::*;
pub use collections::*;
pub use query::*;
pub use repo::*;
pub use scan::*;
pub use scan_paths::*;

use crate::core::{CacheStore, RepositoryCache, Result, ScanCoordinator};

/// Open the coordinator over the user's persisted cache. Every command goes
/// through this so the cache is loaded exactly once per invocation.
pub(crate) fn open_coordinator() -> Result<ScanCoordinator> {
    let store = CacheStore::new()?;
    let cache = RepositoryCache::open(store)?;
    Ok(ScanCoordinator::new(cache))
}
