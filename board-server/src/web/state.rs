//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::{BoardCache, BoardCacheConfig, FeedStore};
use crate::engine::BoardConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Last-known feed snapshots.
    pub feeds: FeedStore,

    /// Short-lived cache of assembled boards.
    pub board_cache: Arc<BoardCache>,

    /// Board assembly configuration.
    pub config: Arc<BoardConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(feeds: FeedStore, config: BoardConfig, cache_config: &BoardCacheConfig) -> Self {
        Self {
            feeds,
            board_cache: Arc::new(BoardCache::new(cache_config)),
            config: Arc::new(config),
        }
    }
}
