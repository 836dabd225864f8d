//! Caching for computed chart datasets
//!
//! The cache layer has a durable SQLite-backed store as the primary, an
//! in-process generic cache as the disaster fallback, and a coordinator that
//! guarantees callers never see a storage error, only "data present" or
//! "data absent".

use md5::{Digest, Md5};

// Re-export sub-modules
pub mod factory;
pub mod fallback;
pub mod memory_cache;
pub mod noop_cache;
pub mod sql_cache;
pub mod traits;

pub use fallback::CacheCoordinator;
pub use memory_cache::MemoryCache;
pub use noop_cache::NoOpCache;
pub use sql_cache::SqliteChartCache;
pub use traits::ChartCache;

/// Namespace for dashboard entries in the generic fallback cache
pub const CACHE_NAMESPACE: &str = "chartdash";

/// Cache store statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStoreStats {
    pub total_entries: u64,
    pub valid_entries: u64,
    pub expired_entries: u64,
    pub avg_size_bytes: u64,
}

/// Build the deterministic cache key for a report/range pair
///
/// Extra parameters are order-insensitive: they are sorted before hashing so
/// equivalent parameter sets share a key.
pub fn generate_cache_key(
    report_key: &str,
    range_token: &str,
    params: Option<&[(String, String)]>,
) -> String {
    let mut key = format!("{CACHE_NAMESPACE}_{report_key}_{range_token}");

    if let Some(params) = params
        && !params.is_empty()
    {
        let mut sorted: Vec<&(String, String)> = params.iter().collect();
        sorted.sort();

        let mut hasher = Md5::new();
        for (name, value) in sorted {
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b";");
        }

        let digest = hasher.finalize();
        key.push('_');
        for byte in digest {
            key.push_str(&format!("{byte:02x}"));
        }
    }

    key
}
