//! Location of the region that owns a point
use crate::traits::SpatialSearch;
use crate::types::{Point, RealScalar};
use log::{debug, trace};

/// The most recent successful lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatorCache<T: RealScalar> {
    /// Id of the query that filled the cache
    pub query_id: T,
    /// The region that was found
    pub region: usize,
    /// The mesh generation the region belongs to
    pub generation: u64,
}

/// Counters of how lookups were resolved
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LocatorStatistics {
    /// Lookups answered from the cache
    pub hits: usize,
    /// Cache hits for the same query id as the cached lookup
    pub repeat_hits: usize,
    /// Lookups that needed a full search
    pub misses: usize,
    /// Cache entries discarded because the mesh changed
    pub stale: usize,
    /// Lookups that found no owned region
    pub not_found: usize,
}

/// Finds the owned region containing a point, remembering the last region found
///
/// A locator is meant to be used by one worker at a time; give each thread its own.
pub struct RegionLocator<'a, S: SpatialSearch> {
    search: &'a S,
    cache: Option<LocatorCache<S::T>>,
    statistics: LocatorStatistics,
}

impl<'a, S: SpatialSearch> RegionLocator<'a, S> {
    /// Create new
    pub fn new(search: &'a S) -> Self {
        Self {
            search,
            cache: None,
            statistics: LocatorStatistics::default(),
        }
    }

    /// Find the owned region containing `point`
    ///
    /// `None` means that no region owned by this process contains the point. The
    /// point may be owned by another process, or lie outside the mesh.
    pub fn locate(&mut self, point: &Point<S::T>, query_id: S::T) -> Option<usize> {
        let generation = self.search.generation();

        if let Some(cache) = self.cache.as_mut() {
            if cache.generation != generation {
                debug!(
                    "Mesh generation changed from {} to {}, discarding cached region {}",
                    cache.generation, generation, cache.region
                );
                self.statistics.stale += 1;
                self.cache = None;
            } else if self.search.contains(cache.region, point) {
                self.statistics.hits += 1;
                if cache.query_id == query_id {
                    self.statistics.repeat_hits += 1;
                }
                trace!("Point {point:?} found in cached region {}", cache.region);
                cache.query_id = query_id;
                return Some(cache.region);
            }
        }

        self.statistics.misses += 1;
        match self.search.find_region_containing(point) {
            Some(region) => {
                self.cache = Some(LocatorCache {
                    query_id,
                    region,
                    generation,
                });
                Some(region)
            }
            None => {
                self.statistics.not_found += 1;
                None
            }
        }
    }

    /// Forget the cached region
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// The cached lookup
    pub fn cache(&self) -> Option<&LocatorCache<S::T>> {
        self.cache.as_ref()
    }

    /// Counters of how lookups were resolved
    pub fn statistics(&self) -> LocatorStatistics {
        self.statistics
    }

    /// The search structure
    pub fn search(&self) -> &'a S {
        self.search
    }
}
