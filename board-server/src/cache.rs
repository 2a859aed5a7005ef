//! Caching layer between the feeds and the engine.
//!
//! Two pieces:
//!
//! - [`FeedSnapshot`] — the last successfully fetched value of one feed.
//!   Refresh ticks overwrite it with the most recently *completed*
//!   response; a failed fetch keeps the previous value, so boards keep
//!   rendering from last-known-good data. Overlapping in-flight fetches
//!   are not sequenced: an older response landing after a newer one is an
//!   accepted inconsistency window bounded by the poll interval.
//! - [`BoardCache`] — resolved boards cached briefly in moka, keyed by
//!   (station, date, kind, time bucket), so a dozen polling surfaces do
//!   not recompute the same board every tick.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use moka::future::Cache as MokaCache;
use tokio::sync::RwLock;

use crate::domain::{DailyPerturbation, PlatformAssignment, PlatformOverride, Schedule};
use crate::engine::{Board, BoardKind};
use crate::feed::{FeedBundle, FeedError};

/// The last-known value of one feed.
pub struct FeedSnapshot<T> {
    inner: Arc<RwLock<SnapshotInner<T>>>,
}

struct SnapshotInner<T> {
    data: Arc<T>,
    last_fetched_at: Option<Instant>,
}

impl<T> Clone for FeedSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> FeedSnapshot<T> {
    /// Create a snapshot with an initial (typically empty) value.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SnapshotInner {
                data: Arc::new(initial),
                last_fetched_at: None,
            })),
        }
    }

    /// The current value.
    pub async fn get(&self) -> Arc<T> {
        let guard = self.inner.read().await;
        Arc::clone(&guard.data)
    }

    /// Overwrite with a freshly fetched value.
    pub async fn store(&self, value: T) {
        let mut guard = self.inner.write().await;
        guard.data = Arc::new(value);
        guard.last_fetched_at = Some(Instant::now());
    }

    /// Apply a fetch result: store on success, keep the previous value
    /// on failure (logged, not propagated — the board must still render).
    pub async fn apply(&self, result: Result<T, FeedError>, feed: &str) {
        match result {
            Ok(value) => self.store(value).await,
            Err(e) => {
                tracing::warn!(feed, error = %e, "feed refresh failed, keeping last-known value");
            }
        }
    }

    /// Time since the last successful fetch, if any.
    pub async fn age(&self) -> Option<Duration> {
        let guard = self.inner.read().await;
        guard.last_fetched_at.map(|t| t.elapsed())
    }
}

impl<T: Default> Default for FeedSnapshot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Snapshots of every feed the engine consumes.
#[derive(Clone, Default)]
pub struct FeedStore {
    pub schedules: FeedSnapshot<Vec<Schedule>>,
    pub perturbations: FeedSnapshot<Vec<DailyPerturbation>>,
    pub platform_overrides: FeedSnapshot<Vec<PlatformOverride>>,
    pub platform_assignments: FeedSnapshot<Vec<PlatformAssignment>>,
}

impl FeedStore {
    /// Store a full bundle (startup fixture or a whole-feed refresh).
    pub async fn store_bundle(&self, bundle: FeedBundle) {
        self.schedules.store(bundle.schedules).await;
        self.perturbations.store(bundle.perturbations).await;
        self.platform_overrides
            .store(bundle.platform_overrides)
            .await;
        self.platform_assignments
            .store(bundle.platform_assignments)
            .await;
    }
}

/// Cache key for resolved boards: (normalized station, date, kind,
/// time bucket). The bucket is minutes from midnight divided by the
/// bucket size, so entries age out as the "remaining" filter moves.
type BoardCacheKey = (String, NaiveDate, BoardKind, u16);

/// Configuration for the board cache.
#[derive(Debug, Clone)]
pub struct BoardCacheConfig {
    /// TTL for cached boards.
    pub ttl: Duration,
    /// Maximum number of cached boards.
    pub max_capacity: u64,
    /// Time bucket size in minutes.
    pub bucket_mins: u16,
}

impl Default for BoardCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            max_capacity: 500,
            bucket_mins: 1,
        }
    }
}

/// Short-lived cache of assembled boards.
pub struct BoardCache {
    boards: MokaCache<BoardCacheKey, Arc<Board>>,
    bucket_mins: u16,
}

impl BoardCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &BoardCacheConfig) -> Self {
        let boards = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            boards,
            bucket_mins: config.bucket_mins.max(1),
        }
    }

    /// The time bucket for a minute of day.
    pub fn bucket(&self, minute_of_day: u16) -> u16 {
        minute_of_day / self.bucket_mins
    }

    /// Get a cached board.
    pub async fn get(&self, key: &BoardCacheKey) -> Option<Arc<Board>> {
        self.boards.get(key).await
    }

    /// Insert an assembled board.
    pub async fn insert(&self, key: BoardCacheKey, board: Arc<Board>) {
        self.boards.insert(key, board).await;
    }

    /// Number of cached boards (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.boards.entry_count()
    }

    /// Drop everything (e.g. after a schedule feed refresh).
    pub fn invalidate_all(&self) {
        self.boards.invalidate_all();
    }
}
