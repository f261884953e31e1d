use serde::Serialize;

/// Response header reporting whether a comparison was served from the result cache.
pub const CACHE_STATUS_HEADER: &str = "X-FaceFind-Cache";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    #[inline]
    pub fn from_hit(hit: bool) -> Self {
        if hit { CacheStatus::Hit } else { CacheStatus::Miss }
    }

    #[inline]
    pub fn as_header_value(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheStatus::Hit)
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_header_value())
    }
}

/// Stored value plus the order it was first inserted in.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub value: V,
    pub insertion_order: u64,
}

/// Current sizes of both comparison caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub embedding_cache_size: usize,
    pub result_cache_size: usize,
    /// Per-cache capacity.
    pub max_size: usize,
}

/// Entries removed by [`ComparisonCaches::clear`](super::ComparisonCaches::clear).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClearedCounts {
    pub result_cache_cleared: usize,
    pub embedding_cache_cleared: usize,
}
