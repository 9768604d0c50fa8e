use std::num::NonZeroUsize;

use lru::LruCache;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::domain::entities::leaderboard::LeaderboardEntry;
use crate::domain::services::scoring::LeaderboardFilter;

/// Boards kept when no capacity is configured
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Cache performance statistics
#[derive(Clone, Debug, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate hit rate as percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    event_id: i64,
    filter: LeaderboardFilter,
}

/// Outcome of a cache lookup
#[derive(Debug)]
pub enum CacheLookup {
    Hit(Vec<LeaderboardEntry>),
    /// Carries the write generation to hand back to `store`
    Miss { generation: u64 },
}

struct CacheState {
    boards: LruCache<CacheKey, Vec<LeaderboardEntry>>, // LRU cache to prevent unbounded growth
    // bumped by every score write, whatever the event
    generation: u64,
}

/// Computed leaderboards keyed by (event, category, apparatus).
///
/// At most `capacity` boards are kept; the least recently read one is evicted
/// first. Every score write bumps a single generation counter and drops the
/// written event's boards. A board computed under an older generation is
/// never stored, so in-flight reads of any event are discarded after a write.
pub struct LeaderboardCache {
    state: Mutex<CacheState>,
    stats: RwLock<CacheStats>,
}

impl Default for LeaderboardCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// A zero capacity is raised to one board
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        LeaderboardCache {
            state: Mutex::new(CacheState {
                boards: LruCache::new(capacity),
                generation: 0,
            }),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    pub async fn capacity(&self) -> usize {
        self.state.lock().await.boards.cap().get()
    }

    pub async fn lookup(&self, event_id: i64, filter: &LeaderboardFilter) -> CacheLookup {
        let key = CacheKey {
            event_id,
            filter: filter.clone(),
        };

        let outcome = {
            let mut state = self.state.lock().await;
            let generation = state.generation;
            match state.boards.get(&key) {
                Some(board) => CacheLookup::Hit(board.clone()),
                None => CacheLookup::Miss { generation },
            }
        };

        let mut stats = self.stats.write().await;
        match &outcome {
            CacheLookup::Hit(_) => {
                stats.hits += 1;
                debug!(
                    event_id = event_id,
                    cache_hit_rate = format!("{:.2}%", stats.hit_rate()),
                    "Leaderboard cache hit"
                );
            }
            CacheLookup::Miss { generation } => {
                stats.misses += 1;
                debug!(
                    event_id = event_id,
                    generation = generation,
                    "Leaderboard cache miss"
                );
            }
        }

        outcome
    }

    /// Store a board computed after a `Miss { generation }`.
    ///
    /// Returns false and stores nothing when a score was written since.
    pub async fn store(
        &self,
        event_id: i64,
        filter: &LeaderboardFilter,
        generation: u64,
        board: Vec<LeaderboardEntry>,
    ) -> bool {
        let evicted = {
            let mut state = self.state.lock().await;
            if state.generation != generation {
                debug!(
                    event_id = event_id,
                    computed_generation = generation,
                    current_generation = state.generation,
                    "Discarding leaderboard computed before a newer score write"
                );
                return false;
            }

            let key = CacheKey {
                event_id,
                filter: filter.clone(),
            };
            // push reports the displaced entry; a same-key replace is not an eviction
            matches!(state.boards.push(key.clone(), board), Some((old, _)) if old != key)
        };

        if evicted {
            self.stats.write().await.evictions += 1;
            debug!(event_id = event_id, "Evicted least recently used leaderboard");
        }
        true
    }

    pub async fn invalidate_event(&self, event_id: i64) {
        let dropped = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            let stale: Vec<CacheKey> = state
                .boards
                .iter()
                .filter(|(key, _)| key.event_id == event_id)
                .map(|(key, _)| key.clone())
                .collect();
            for key in &stale {
                state.boards.pop(key);
            }
            stale.len()
        };

        self.stats.write().await.invalidations += 1;
        debug!(
            event_id = event_id,
            dropped_boards = dropped,
            "Leaderboard cache invalidated"
        );
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.boards.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn get_cache_stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }
}
