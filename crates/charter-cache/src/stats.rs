use serde::{Deserialize, Serialize};

/// Hit/miss counters for one process
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Entries found on disk with a different fingerprint or format version
    pub invalidations: usize,
    /// Unparseable entries deleted on read
    pub corrupt_removed: usize,
    pub writes: usize,
}

impl CacheStats {
    #[must_use]
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Counters accumulated since an earlier snapshot
    #[must_use]
    pub fn since(&self, earlier: &Self) -> Self {
        Self {
            hits: self.hits.saturating_sub(earlier.hits),
            misses: self.misses.saturating_sub(earlier.misses),
            invalidations: self.invalidations.saturating_sub(earlier.invalidations),
            corrupt_removed: self.corrupt_removed.saturating_sub(earlier.corrupt_removed),
            writes: self.writes.saturating_sub(earlier.writes),
        }
    }
}

/// Emit a structured summary if the cache was consulted at all
pub fn log_cache_stats(stats: &CacheStats) {
    if stats.hits + stats.misses == 0 {
        return;
    }
    tracing::info!(
        hits = stats.hits,
        misses = stats.misses,
        hit_rate = %format!("{:.1}%", stats.hit_ratio() * 100.0),
        invalidations = stats.invalidations,
        corrupt_removed = stats.corrupt_removed,
        writes = stats.writes,
        "Validation cache stats"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio() {
        assert_eq!(CacheStats::default().hit_ratio(), 0.0);
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        assert!((stats.hit_ratio() - 0.75).abs() < f64::EPSILON);
        log_cache_stats(&stats);
    }

    #[test]
    fn test_since_subtracts_snapshot() {
        let earlier = CacheStats {
            hits: 1,
            writes: 2,
            ..CacheStats::default()
        };
        let now = CacheStats {
            hits: 4,
            misses: 1,
            writes: 2,
            ..CacheStats::default()
        };
        let delta = now.since(&earlier);
        assert_eq!((delta.hits, delta.misses, delta.writes), (3, 1, 0));
    }
}
