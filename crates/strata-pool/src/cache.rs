//! Index cache keyed by input shape and pooling parameters.
//!
//! [`IndexCache`] builds a single-stage [`PoolIndex`] on first use and
//! hands back the stored copy for every later request with the same
//! `(width, height, method, config)`. Repeated forward/backward passes
//! over one layer shape then pay for index construction once.
//!
//! Entries are kept in insertion order; once the cache is full the
//! oldest entry is evicted to make room.

use indexmap::IndexMap;

use strata_core::{PoolError, PoolMethod};

use crate::config::PoolConfig;
use crate::index::PoolIndex;

/// Default number of cached index arrays.
pub const DEFAULT_CAPACITY: usize = 16;

/// Lookup key: input slice shape plus stage parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    width: usize,
    height: usize,
    method: PoolMethod,
    config: PoolConfig,
}

/// Bounded cache of single-stage index arrays.
///
/// # Examples
///
/// ```
/// use strata_core::PoolMethod;
/// use strata_pool::{IndexCache, PoolConfig};
///
/// let mut cache = IndexCache::default();
/// let cfg = PoolConfig::square(2, 2);
/// let window = cache.get_or_build(8, 8, PoolMethod::Max, &cfg).unwrap().window_size();
/// assert_eq!(window, 4);
/// cache.get_or_build(8, 8, PoolMethod::Max, &cfg).unwrap();
/// assert_eq!((cache.hits(), cache.misses()), (1, 1));
/// ```
#[derive(Debug)]
pub struct IndexCache {
    capacity: usize,
    entries: IndexMap<CacheKey, PoolIndex>,
    hits: u64,
    misses: u64,
}

impl Default for IndexCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl IndexCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: IndexMap::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the index for pooling a `width × height` slice, building
    /// it on a miss.
    ///
    /// Errors from index construction (bad config, empty output) are
    /// returned and nothing is cached.
    pub fn get_or_build(
        &mut self,
        width: usize,
        height: usize,
        method: PoolMethod,
        config: &PoolConfig,
    ) -> Result<&PoolIndex, PoolError> {
        let key = CacheKey {
            width,
            height,
            method,
            config: *config,
        };
        if let Some(i) = self.entries.get_index_of(&key) {
            self.hits += 1;
            log::trace!("index cache hit for {width}x{height} {method}");
            return Ok(&self.entries[i]);
        }

        self.misses += 1;
        let index = PoolIndex::identity(width, height)?.compose(method, config)?;
        if self.entries.len() >= self.capacity {
            if let Some((evicted, _)) = self.entries.shift_remove_index(0) {
                log::debug!(
                    "index cache full ({}), evicting {}x{} {}",
                    self.capacity,
                    evicted.width,
                    evicted.height,
                    evicted.method
                );
            }
        }
        let (i, _) = self.entries.insert_full(key, index);
        Ok(&self.entries[i])
    }

    /// Drop every cached entry. Counters are kept.
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lookups served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that built a new index.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}
